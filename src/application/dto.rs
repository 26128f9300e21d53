use serde::{Deserialize, Serialize};

use crate::domain::{
    model::{DetectorParams, DetectorVariant, MAX_DET_RANGE},
    theme::ThemeEntry,
};

/// Parámetros de la barra lateral; lo que falte se toma de la configuración.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanQuery {
    pub conf: Option<f32>,
    pub iou: Option<f32>,
    pub max_det: Option<usize>,
    pub agnostic: Option<bool>,
    pub multi_label: Option<bool>,
}

impl ScanQuery {
    pub fn merge_into(self, defaults: &DetectorParams) -> DetectorParams {
        DetectorParams {
            input_size: defaults.input_size,
            conf_threshold: self.conf.unwrap_or(defaults.conf_threshold),
            iou_threshold: self.iou.unwrap_or(defaults.iou_threshold),
            max_detections: self.max_det.unwrap_or(defaults.max_detections),
            agnostic_nms: self.agnostic.unwrap_or(defaults.agnostic_nms),
            multi_label: self.multi_label.unwrap_or(defaults.multi_label),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeDto<T> {
    pub min: T,
    pub max: T,
    pub step: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub variant: DetectorVariant,
    pub defaults: DetectorParams,
    pub conf_range: RangeDto<f32>,
    pub iou_range: RangeDto<f32>,
    pub max_det_range: RangeDto<usize>,
}

impl ConfigResponse {
    pub fn new(variant: DetectorVariant, defaults: DetectorParams) -> Self {
        Self {
            variant,
            defaults,
            conf_range: RangeDto { min: 0.0, max: 1.0, step: 0.01 },
            iou_range: RangeDto { min: 0.0, max: 1.0, step: 0.01 },
            max_det_range: RangeDto { min: MAX_DET_RANGE.0, max: MAX_DET_RANGE.1, step: 10 },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeResponse {
    pub labels: Vec<ThemeEntry>,
    pub default_label: String,
    pub simulated_vocabulary: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_query_fields_fall_back_to_defaults() {
        let defaults = DetectorParams { max_detections: 300, ..Default::default() };
        let merged = ScanQuery { conf: Some(0.6), agnostic: Some(true), ..Default::default() }.merge_into(&defaults);
        assert_eq!(merged.conf_threshold, 0.6);
        assert_eq!(merged.iou_threshold, 0.45);
        assert_eq!(merged.max_detections, 300);
        assert!(merged.agnostic_nms);
        assert!(!merged.multi_label);
    }
}
