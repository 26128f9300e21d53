use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tracing::{info, warn};

use crate::adapters::{
    http::{router, state::HttpState},
    imaging::overlay::JpegOverlayRenderer,
    onnx::model_catalog::OnnxModelCatalog,
    simulated::detector::SimulatedDetector,
};
use crate::application::{ports::DetectorPort, services::ScanService};
use crate::config::AppConfig;
use crate::domain::model::DetectorVariant;

/// Instancia el detector elegido en la configuración.
pub async fn build_detector(cfg: &AppConfig) -> Arc<dyn DetectorPort> {
    match cfg.variant {
        DetectorVariant::Simulated => {
            info!("🎲 Modo simulado: {} etiquetas posibles", cfg.vocabulary.labels().len());
            Arc::new(SimulatedDetector::new(cfg.vocabulary.clone(), cfg.simulation_delay))
        }
        DetectorVariant::Onnx => onnx_detector(cfg).await,
    }
}

#[cfg(feature = "onnx")]
async fn onnx_detector(cfg: &AppConfig) -> Arc<dyn DetectorPort> {
    let detector = crate::adapters::onnx::detector::OnnxDetector::new(cfg.model.clone());
    if cfg.preload {
        match detector.warm_up().await {
            Ok(()) => info!("✅ Modelo {} precargado", cfg.model.name),
            Err(e) => warn!("⚠️ Precarga fallida, se reintentará en la primera captura: {}", e),
        }
    }
    Arc::new(detector)
}

#[cfg(not(feature = "onnx"))]
async fn onnx_detector(_cfg: &AppConfig) -> Arc<dyn DetectorPort> {
    warn!("⚠️ Compilado sin la feature `onnx`: las capturas fallarán");
    Arc::new(disabled::DisabledDetector)
}

#[cfg(not(feature = "onnx"))]
mod disabled {
    use async_trait::async_trait;

    use crate::application::ports::DetectorPort;
    use crate::domain::{
        errors::{DomainError, DomainResult},
        model::{DetectorParams, DetectorVariant},
        scan::{CapturedImage, Sightings},
    };

    pub struct DisabledDetector;

    #[async_trait]
    impl DetectorPort for DisabledDetector {
        fn variant(&self) -> DetectorVariant {
            DetectorVariant::Onnx
        }

        async fn detect(&self, _: &CapturedImage, _: &DetectorParams) -> DomainResult<Sightings> {
            Err(DomainError::DetectorUnavailable("binario compilado sin soporte ONNX".into()))
        }
    }
}

pub fn build_state(cfg: &AppConfig, detector: Arc<dyn DetectorPort>) -> HttpState {
    let scan = ScanService::new(
        detector,
        Arc::new(JpegOverlayRenderer::new()),
        Arc::new(OnnxModelCatalog::new()),
        cfg.model.clone(),
        Arc::new(cfg.theme.clone()),
    );
    HttpState {
        scan: Arc::new(scan),
        defaults: cfg.defaults.clone(),
        vocabulary: cfg.vocabulary.clone(),
    }
}

/// API + archivos estáticos de la interfaz.
pub fn build_app(cfg: &AppConfig, state: HttpState) -> Router {
    router(state).fallback_service(ServeDir::new(&cfg.static_dir))
}
