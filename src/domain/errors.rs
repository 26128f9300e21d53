use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    /// El backend de detección no pudo inicializarse o falló durante la inferencia.
    #[error("Espectrómetro no disponible: {0}")]
    DetectorUnavailable(String),
    /// La salida cruda del detector no tiene la forma esperada.
    #[error("Error al procesar los resultados: {0}")]
    ResultParseFailure(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("No encontrado: {0}")]
    NotFound(String),
}

impl DomainError {
    /// Identificador estable para las respuestas JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::DetectorUnavailable(_) => "detector_unavailable",
            DomainError::ResultParseFailure(_) => "result_parse_failure",
            DomainError::InvalidInput(_) => "invalid_input",
            DomainError::NotFound(_) => "not_found",
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
