use std::sync::Arc;
use std::time::Instant;

use base64::{prelude::BASE64_STANDARD, Engine};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::{
    application::ports::{DetectorPort, FrameRendererPort, ModelCatalogPort},
    domain::{
        aggregate::{aggregate, aggregate_simulated},
        errors::{DomainError, DomainResult},
        model::{DetectorParams, DetectorVariant, ModelId},
        scan::{CapturedImage, ScanOutcome, ScanReport, Sightings},
        theme::ThemeTable,
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct DetectorStatus {
    pub variant: DetectorVariant,
    pub model: Option<ModelId>,
    pub ready: bool,
    pub message: String,
}

/// Orquestador de una captura: detector → mapeo temático → agregación → escena.
/// Cada llamada a `scan` es una ejecución completa e independiente.
#[derive(Clone)]
pub struct ScanService {
    detector: Arc<dyn DetectorPort>,
    renderer: Arc<dyn FrameRendererPort>,
    model_catalog: Arc<dyn ModelCatalogPort>,
    model: ModelId,
    theme: Arc<ThemeTable>,
}

impl ScanService {
    pub fn new(
        detector: Arc<dyn DetectorPort>,
        renderer: Arc<dyn FrameRendererPort>,
        model_catalog: Arc<dyn ModelCatalogPort>,
        model: ModelId,
        theme: Arc<ThemeTable>,
    ) -> Self {
        Self {
            detector,
            renderer,
            model_catalog,
            model,
            theme,
        }
    }

    pub fn theme(&self) -> &ThemeTable {
        &self.theme
    }

    pub fn variant(&self) -> DetectorVariant {
        self.detector.variant()
    }

    pub async fn status(&self) -> DetectorStatus {
        match self.detector.variant() {
            DetectorVariant::Simulated => DetectorStatus {
                variant: DetectorVariant::Simulated,
                model: None,
                ready: true,
                message: "Espectrómetro simulado listo".into(),
            },
            DetectorVariant::Onnx => {
                let (ready, message) = match self.model_catalog.validate_model(&self.model).await {
                    Ok(()) => (true, format!("Modelo disponible: {}", self.model.onnx_path)),
                    Err(e) => (false, e.to_string()),
                };
                DetectorStatus {
                    variant: DetectorVariant::Onnx,
                    model: Some(self.model.clone()),
                    ready,
                    message,
                }
            }
        }
    }

    /// Ejecuta una captura completa. Un fallo del detector aborta la ejecución
    /// antes de agregar; cero detecciones es un resultado válido.
    pub async fn scan(&self, image: CapturedImage, params: DetectorParams) -> DomainResult<ScanReport> {
        params.validate()?;
        if image.is_empty() {
            return Err(DomainError::InvalidInput("la imagen capturada está vacía".into()));
        }

        let started = Instant::now();
        let sightings = self.detector.detect(&image, &params).await.map_err(|e| {
            error!("Error durante el rastreo espectral: {}", e);
            e
        })?;

        let (result, width, height, simulated_confidence, scene) = match sightings {
            Sightings::Detected { detections, width, height } => {
                let result = aggregate(&detections, &self.theme);
                let scene = if detections.is_empty() {
                    image.bytes
                } else {
                    let labels: Vec<String> = result.details.iter().map(|d| d.label.clone()).collect();
                    self.render_scene(image, detections, labels).await
                };
                (result, Some(width), Some(height), None, scene)
            }
            Sightings::Simulated { labels, confidence } => {
                (aggregate_simulated(&labels), None, None, Some(confidence), image.bytes)
            }
        };

        let outcome = ScanOutcome::from_result(&result);
        let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;
        info!(
            "👻 Captura procesada en {:.1} ms: {} espectros [{}]",
            elapsed_ms,
            result.total,
            result.summary_line()
        );

        Ok(ScanReport {
            variant: self.detector.variant(),
            outcome,
            headline: outcome.headline(result.total),
            width,
            height,
            elapsed_ms,
            simulated_confidence,
            result,
            image_jpeg_base64: Some(BASE64_STANDARD.encode(scene)),
        })
    }

    /// Si el dibujado falla se devuelve la imagen original: la escena no es crítica.
    async fn render_scene(
        &self,
        image: CapturedImage,
        detections: Vec<crate::domain::detection::Detection>,
        labels: Vec<String>,
    ) -> Vec<u8> {
        let renderer = self.renderer.clone();
        let original = image.bytes.clone();
        let rendered = tokio::task::spawn_blocking(move || renderer.annotate(&image, &detections, &labels)).await;

        match rendered {
            Ok(Ok(jpeg)) => jpeg,
            Ok(Err(e)) => {
                warn!("⚠️ No se pudo dibujar la escena: {}", e);
                original
            }
            Err(e) => {
                warn!("⚠️ Tarea de dibujado abortada: {}", e);
                original
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::{BoundingBox, Detection};
    use async_trait::async_trait;

    struct FixedDetector(DomainResult<Sightings>);

    #[async_trait]
    impl DetectorPort for FixedDetector {
        fn variant(&self) -> DetectorVariant {
            match &self.0 {
                Ok(Sightings::Simulated { .. }) => DetectorVariant::Simulated,
                _ => DetectorVariant::Onnx,
            }
        }

        async fn detect(&self, _: &CapturedImage, _: &DetectorParams) -> DomainResult<Sightings> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(DomainError::DetectorUnavailable(m)) => Err(DomainError::DetectorUnavailable(m.clone())),
                Err(e) => Err(DomainError::ResultParseFailure(e.to_string())),
            }
        }
    }

    struct EchoRenderer {
        fail: bool,
    }

    impl FrameRendererPort for EchoRenderer {
        fn annotate(&self, _: &CapturedImage, detections: &[Detection], _: &[String]) -> DomainResult<Vec<u8>> {
            if self.fail {
                return Err(DomainError::InvalidInput("no es una imagen".into()));
            }
            Ok(vec![detections.len() as u8])
        }
    }

    struct MissingModel;

    #[async_trait]
    impl ModelCatalogPort for MissingModel {
        async fn validate_model(&self, model: &ModelId) -> DomainResult<()> {
            Err(DomainError::NotFound(format!("model file not found: {}", model.onnx_path)))
        }
    }

    fn service(result: DomainResult<Sightings>, fail_render: bool) -> ScanService {
        ScanService::new(
            Arc::new(FixedDetector(result)),
            Arc::new(EchoRenderer { fail: fail_render }),
            Arc::new(MissingModel),
            ModelId { name: "yolov5s".into(), onnx_path: "nope.onnx".into() },
            Arc::new(ThemeTable::builtin()),
        )
    }

    fn cat() -> Detection {
        Detection {
            class_id: 16,
            confidence: 0.77,
            bbox: BoundingBox::new(5, 5, 40, 40),
            original_label: "dog".into(),
        }
    }

    #[tokio::test]
    async fn detections_are_themed_and_rendered() {
        let svc = service(Ok(Sightings::Detected { detections: vec![cat(), cat()], width: 64, height: 48 }), false);
        let report = svc.scan(CapturedImage::new(vec![1, 2, 3]), DetectorParams::default()).await.unwrap();

        assert_eq!(report.outcome, ScanOutcome::GhostsFound);
        assert_eq!(report.result.counts["Minino Espectral (Gato)"], 2);
        assert_eq!(report.width, Some(64));
        assert_eq!(report.image_jpeg_base64.as_deref(), Some(BASE64_STANDARD.encode([2u8]).as_str()));
        assert!(report.headline.contains('2'));
    }

    #[tokio::test]
    async fn renderer_failure_keeps_original_image() {
        let svc = service(Ok(Sightings::Detected { detections: vec![cat()], width: 64, height: 48 }), true);
        let report = svc.scan(CapturedImage::new(vec![9, 9]), DetectorParams::default()).await.unwrap();
        assert_eq!(report.image_jpeg_base64, Some(BASE64_STANDARD.encode([9u8, 9])));
        assert_eq!(report.result.total, 1);
    }

    #[tokio::test]
    async fn no_detections_is_a_clear_zone() {
        let svc = service(Ok(Sightings::Detected { detections: vec![], width: 64, height: 48 }), false);
        let report = svc.scan(CapturedImage::new(vec![1]), DetectorParams::default()).await.unwrap();
        assert_eq!(report.outcome, ScanOutcome::ClearZone);
        assert!(report.result.is_empty());
    }

    #[tokio::test]
    async fn detector_failure_aborts_the_run() {
        let svc = service(Err(DomainError::DetectorUnavailable("sin modelo".into())), false);
        let err = svc.scan(CapturedImage::new(vec![1]), DetectorParams::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::DetectorUnavailable(_)));
    }

    #[tokio::test]
    async fn invalid_params_never_reach_the_detector() {
        let svc = service(Err(DomainError::DetectorUnavailable("no debería llamarse".into())), false);
        let params = DetectorParams { max_detections: 5, ..Default::default() };
        let err = svc.scan(CapturedImage::new(vec![1]), params).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));

        let err = svc.scan(CapturedImage::new(Vec::new()), DetectorParams::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn simulated_runs_carry_run_level_confidence() {
        let labels = vec!["Fantasma Sábana".to_string(), "Fantasma Sábana".to_string()];
        let svc = service(Ok(Sightings::Simulated { labels, confidence: 0.8 }), false);
        let report = svc.scan(CapturedImage::new(vec![7]), DetectorParams::default()).await.unwrap();
        assert_eq!(report.variant, DetectorVariant::Simulated);
        assert_eq!(report.simulated_confidence, Some(0.8));
        assert_eq!(report.result.counts["Fantasma Sábana"], 2);
        assert_eq!(report.width, None);
    }

    #[tokio::test]
    async fn status_reports_missing_model() {
        let svc = service(Ok(Sightings::Detected { detections: vec![], width: 1, height: 1 }), false);
        let status = svc.status().await;
        assert!(!status.ready);
        assert!(status.message.contains("nope.onnx"));
    }
}
