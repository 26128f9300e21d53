use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{error, info};

use crate::adapters::imaging::codec::decode_rgb;
use crate::adapters::onnx::yolo_engine::OnnxYoloEngine;
use crate::application::ports::DetectorPort;
use crate::domain::{
    coco::COCO_CLASSES,
    detection::Detection,
    errors::{DomainError, DomainResult},
    model::{DetectorParams, DetectorVariant, ModelId},
    scan::{CapturedImage, Sightings},
};

/// Detector YOLO con sesión ONNX perezosa: se carga en el primer uso y vive
/// hasta que termina el proceso. Si la carga falla se reintenta en la siguiente captura.
pub struct OnnxDetector {
    model: ModelId,
    engine: Arc<Mutex<Option<OnnxYoloEngine>>>,
}

impl OnnxDetector {
    pub fn new(model: ModelId) -> Self {
        Self {
            model,
            engine: Arc::new(Mutex::new(None)),
        }
    }

    /// Fuerza la carga del modelo (arranque con precarga).
    pub async fn warm_up(&self) -> DomainResult<()> {
        let engine = self.engine.clone();
        let path = self.model.onnx_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&engine)?;
            ensure_loaded(&mut guard, &path)?;
            Ok::<(), DomainError>(())
        })
        .await
        .map_err(|e| DomainError::DetectorUnavailable(format!("tarea de carga abortada: {e}")))?
    }
}

fn lock(engine: &Mutex<Option<OnnxYoloEngine>>) -> DomainResult<std::sync::MutexGuard<'_, Option<OnnxYoloEngine>>> {
    engine
        .lock()
        .map_err(|_| DomainError::DetectorUnavailable("lock del motor envenenado".into()))
}

fn ensure_loaded<'a>(slot: &'a mut Option<OnnxYoloEngine>, path: &str) -> DomainResult<&'a mut OnnxYoloEngine> {
    if slot.is_none() {
        info!("🔮 Activando el espectrómetro de visión: {}", path);
        let engine = OnnxYoloEngine::load(path).map_err(|e| {
            error!("❌ Error cargando modelo YOLO: {:?}", e);
            DomainError::DetectorUnavailable(format!("no se pudo cargar {path}: {e}"))
        })?;
        *slot = Some(engine);
    }
    slot.as_mut()
        .ok_or_else(|| DomainError::DetectorUnavailable("motor no inicializado".into()))
}

fn detect_blocking(
    engine: &Mutex<Option<OnnxYoloEngine>>,
    path: &str,
    bytes: &[u8],
    params: &DetectorParams,
) -> DomainResult<Sightings> {
    let mut guard = lock(engine)?;
    let eng = ensure_loaded(&mut guard, path)?;

    let rgb = decode_rgb(bytes)?;
    let (width, height) = rgb.dimensions();
    let raw = eng.infer(&rgb, params)?;

    let detections = raw
        .iter()
        .map(|r| Detection::from_raw(r, &COCO_CLASSES, width, height))
        .collect::<DomainResult<Vec<_>>>()?;

    Ok(Sightings::Detected { detections, width, height })
}

#[async_trait]
impl DetectorPort for OnnxDetector {
    fn variant(&self) -> DetectorVariant {
        DetectorVariant::Onnx
    }

    async fn detect(&self, image: &CapturedImage, params: &DetectorParams) -> DomainResult<Sightings> {
        let engine = self.engine.clone();
        let path = self.model.onnx_path.clone();
        let bytes = image.bytes.clone();
        let params = params.clone();

        tokio::task::spawn_blocking(move || detect_blocking(&engine, &path, &bytes, &params))
            .await
            .map_err(|e| DomainError::DetectorUnavailable(format!("tarea de inferencia abortada: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_model_is_unavailable_and_retried() {
        let det = OnnxDetector::new(ModelId { name: "yolov5s".into(), onnx_path: "/no/existe/yolov5s.onnx".into() });
        for _ in 0..2 {
            let err = det
                .detect(&CapturedImage::new(vec![0xFF, 0xD8]), &DetectorParams::default())
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::DetectorUnavailable(_)), "{err}");
        }
        assert!(det.warm_up().await.is_err());
    }
}
