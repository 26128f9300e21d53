use serde::{Deserialize, Serialize};

use super::aggregate::AggregateResult;
use super::detection::Detection;
use super::model::DetectorVariant;

/// Imagen codificada tal como llega de la cámara del navegador.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Lo que devuelve un detector antes del mapeo temático.
#[derive(Debug, Clone, PartialEq)]
pub enum Sightings {
    Detected {
        detections: Vec<Detection>,
        width: u32,
        height: u32,
    },
    /// `confidence` es un valor estético por ejecución, no por detección.
    Simulated {
        labels: Vec<String>,
        confidence: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    GhostsFound,
    ClearZone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub variant: DetectorVariant,
    pub outcome: ScanOutcome,
    pub headline: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub elapsed_ms: f32,
    pub simulated_confidence: Option<f32>,
    pub result: AggregateResult,
    /// JPEG (anotado si hubo cajas) en base64 para el panel de escena.
    pub image_jpeg_base64: Option<String>,
}

impl ScanOutcome {
    pub fn from_result(result: &AggregateResult) -> Self {
        if result.is_empty() {
            ScanOutcome::ClearZone
        } else {
            ScanOutcome::GhostsFound
        }
    }

    pub fn headline(&self, total: usize) -> String {
        match self {
            ScanOutcome::GhostsFound => format!("✨ ¡ÉXITO! {total} Espectros Encontrados"),
            ScanOutcome::ClearZone => "🌫️ Zona Despejada".to_string(),
        }
    }
}
