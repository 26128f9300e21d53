use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

pub const MAX_DET_RANGE: (usize, usize) = (10, 2000);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelId {
    pub name: String,       // logical name, e.g. "yolov5s"
    pub onnx_path: String,  // filesystem path
}

/// Qué detector está detrás del puerto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorVariant {
    Onnx,
    Simulated,
}

impl std::str::FromStr for DetectorVariant {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "onnx" | "model" | "yolo" => Ok(DetectorVariant::Onnx),
            "simulated" | "sim" | "random" => Ok(DetectorVariant::Simulated),
            other => Err(DomainError::InvalidInput(format!("modo de detector desconocido: {other}"))),
        }
    }
}

/// Ajustes espectrales que la interfaz expone al usuario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorParams {
    pub input_size: u32,        // 640 typical
    pub conf_threshold: f32,    // 0..1
    pub iou_threshold: f32,     // 0..1
    pub max_detections: usize,  // 10..2000
    pub agnostic_nms: bool,
    pub multi_label: bool,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            input_size: 640,
            conf_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 1000,
            agnostic_nms: false,
            multi_label: false,
        }
    }
}

impl DetectorParams {
    pub fn validate(&self) -> DomainResult<()> {
        if !(0.0..=1.0).contains(&self.conf_threshold) {
            return Err(DomainError::InvalidInput(format!(
                "umbral de confianza fuera de [0,1]: {}",
                self.conf_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(DomainError::InvalidInput(format!(
                "umbral IoU fuera de [0,1]: {}",
                self.iou_threshold
            )));
        }
        let (lo, hi) = MAX_DET_RANGE;
        if !(lo..=hi).contains(&self.max_detections) {
            return Err(DomainError::InvalidInput(format!(
                "máximo de espectros fuera de [{lo},{hi}]: {}",
                self.max_detections
            )));
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            return Err(DomainError::InvalidInput(format!(
                "input_size debe ser múltiplo de 32: {}",
                self.input_size
            )));
        }
        Ok(())
    }
}
