use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use crate::adapters::http::state::HttpState;
use crate::application::dto::{ConfigResponse, ErrorResponse, ScanQuery, ThemeResponse};
use crate::domain::{errors::DomainError, scan::CapturedImage};

/// Error de dominio convertido en mensaje visible para el usuario.
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            DomainError::DetectorUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::ResultParseFailure(_) => StatusCode::BAD_GATEWAY,
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    Json(ConfigResponse::new(st.scan.variant(), st.defaults.clone()))
}

pub async fn get_theme(State(st): State<HttpState>) -> impl IntoResponse {
    let theme = st.scan.theme();
    Json(ThemeResponse {
        labels: theme.entries(),
        default_label: theme.default_label().to_string(),
        simulated_vocabulary: st.vocabulary.labels().to_vec(),
    })
}

pub async fn get_status(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.scan.status().await)
}

// Los rechazos de axum (query mal formada, cuerpo demasiado grande) salen en
// texto plano; se reconvierten para que la página siempre reciba JSON.
pub async fn scan(
    State(st): State<HttpState>,
    query: Result<Query<ScanQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| rejected(format!("ajustes inválidos: {}", e.body_text())))?;
    let body = body.map_err(|e| rejected(format!("captura ilegible: {}", e.body_text())))?;

    let params = query.merge_into(&st.defaults);
    let report = st
        .scan
        .scan(CapturedImage::new(body.to_vec()), params)
        .await
        .inspect_err(|e| warn!("Captura rechazada ({}): {}", e.kind(), e))?;
    Ok(Json(report))
}

fn rejected(message: String) -> ApiError {
    warn!("Petición rechazada: {}", message);
    ApiError(DomainError::InvalidInput(message))
}
