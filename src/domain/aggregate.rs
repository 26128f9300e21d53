use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::detection::{BoundingBox, Detection};
use super::theme::ThemeTable;

/// Texto para campos que no existen en el modo simulado.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fila de la tabla de detalles (una por detección, en orden de entrada).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
    pub label: String,
    pub confidence: String,
    pub original_label: String,
    pub location: String,
}

/// Resumen listo para mostrar: conteo por fantasma, detalles y total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub counts: BTreeMap<String, usize>,
    pub details: Vec<DetailRecord>,
    pub total: usize,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// "2 Fantasma Vagabundo (Persona), 1 Minino Espectral (Gato)"
    pub fn summary_line(&self) -> String {
        self.counts
            .iter()
            .map(|(label, count)| format!("{} {}", count, label))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn record(&mut self, detail: DetailRecord) {
        *self.counts.entry(detail.label.clone()).or_insert(0) += 1;
        self.details.push(detail);
        self.total += 1;
    }
}

/// Porcentaje con un decimal. Valores fuera de [0,1] se muestran tal cual;
/// los no finitos se muestran como "N/A".
pub fn format_confidence(confidence: f32) -> String {
    if confidence.is_finite() {
        format!("{:.1}%", confidence as f64 * 100.0)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

pub fn format_location(bbox: &BoundingBox) -> String {
    format!("({},{})-({},{})", bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max)
}

/// Agrega detecciones del modelo aplicando el mapeo temático.
pub fn aggregate(detections: &[Detection], theme: &ThemeTable) -> AggregateResult {
    let mut result = AggregateResult::default();
    for det in detections {
        result.record(DetailRecord {
            label: theme.themed_label(det.class_id).to_string(),
            confidence: format_confidence(det.confidence),
            original_label: det.original_label.clone(),
            location: format_location(&det.bbox),
        });
    }
    result
}

/// Agrega etiquetas del detector simulado. No hay confianza, clase ni caja.
pub fn aggregate_simulated<S: AsRef<str>>(labels: &[S]) -> AggregateResult {
    let mut result = AggregateResult::default();
    for label in labels {
        result.record(DetailRecord {
            label: label.as_ref().to_string(),
            confidence: NOT_AVAILABLE.to_string(),
            original_label: NOT_AVAILABLE.to_string(),
            location: NOT_AVAILABLE.to_string(),
        });
    }
    result
}
