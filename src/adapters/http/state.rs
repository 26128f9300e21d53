use std::sync::Arc;
use crate::application::services::ScanService;
use crate::domain::{model::DetectorParams, theme::SimulatedVocabulary};

/// Estado compartido para los manejadores HTTP de Axum.
#[derive(Clone)]
pub struct HttpState {
    /// Caso de uso de captura: detector, mapeo temático y agregación.
    pub scan: Arc<ScanService>,
    /// Valores por defecto de la barra lateral.
    pub defaults: DetectorParams,
    pub vocabulary: SimulatedVocabulary,
}
