use async_trait::async_trait;
use crate::domain::{
    detection::Detection,
    errors::DomainResult,
    model::{DetectorParams, DetectorVariant, ModelId},
    scan::{CapturedImage, Sightings},
};

#[async_trait]
pub trait DetectorPort: Send + Sync {
    fn variant(&self) -> DetectorVariant;
    async fn detect(&self, image: &CapturedImage, params: &DetectorParams) -> DomainResult<Sightings>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

/// Dibuja las cajas sobre la escena capturada y devuelve un JPEG.
pub trait FrameRendererPort: Send + Sync {
    fn annotate(&self, image: &CapturedImage, detections: &[Detection], labels: &[String]) -> DomainResult<Vec<u8>>;
}
