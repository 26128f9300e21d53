use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// Caja en píxeles de la imagen original. Siempre `min <= max` en cada eje.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    pub fn new(x_min: i32, y_min: i32, x_max: i32, y_max: i32) -> Self {
        Self {
            x_min: x_min.min(x_max),
            y_min: y_min.min(y_max),
            x_max: x_min.max(x_max),
            y_max: y_min.max(y_max),
        }
    }

    /// Convierte esquinas flotantes a píxeles enteros dentro de `width x height`.
    /// Trunca igual que un cast a entero; rechaza valores no finitos.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32, width: u32, height: u32) -> DomainResult<Self> {
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(DomainError::ResultParseFailure(format!(
                "coordenadas no finitas: ({x1}, {y1}, {x2}, {y2})"
            )));
        }
        let max_x = width.saturating_sub(1) as f32;
        let max_y = height.saturating_sub(1) as f32;
        let px = |v: f32, hi: f32| v.clamp(0.0, hi) as i32;
        Ok(Self::new(px(x1, max_x), px(y1, max_y), px(x2, max_x), px(y2, max_y)))
    }
}

/// Una presencia espectral localizada por el detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: i64,
    pub confidence: f32,
    pub bbox: BoundingBox,
    /// Nombre de la clase en el vocabulario nativo del detector.
    pub original_label: String,
}

/// Salida del motor antes de pasar por la frontera tipada.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub score: f32,
    pub class_id: usize,
}

impl Detection {
    /// Valida una detección cruda y la fija a las dimensiones de la imagen.
    pub fn from_raw(raw: &RawDetection, names: &[&str], width: u32, height: u32) -> DomainResult<Self> {
        if !raw.score.is_finite() {
            return Err(DomainError::ResultParseFailure(format!(
                "confianza no finita para la clase {}",
                raw.class_id
            )));
        }
        let bbox = BoundingBox::from_corners(raw.x1, raw.y1, raw.x2, raw.y2, width, height)?;
        let original_label = names
            .get(raw.class_id)
            .map(|n| n.to_string())
            .unwrap_or_else(|| format!("clase {}", raw.class_id));

        Ok(Self {
            class_id: raw.class_id as i64,
            confidence: raw.score,
            bbox,
            original_label,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_orders_and_clamps_corners() {
        let b = BoundingBox::from_corners(120.7, -4.0, 10.2, 50.9, 100, 80).unwrap();
        assert_eq!(b, BoundingBox { x_min: 10, y_min: 0, x_max: 99, y_max: 50 });
    }

    #[test]
    fn raw_with_nan_is_a_parse_failure() {
        let raw = RawDetection { x1: f32::NAN, y1: 0.0, x2: 1.0, y2: 1.0, score: 0.5, class_id: 0 };
        let err = Detection::from_raw(&raw, &["person"], 10, 10).unwrap_err();
        assert!(matches!(err, DomainError::ResultParseFailure(_)));
    }

    #[test]
    fn unknown_class_keeps_a_readable_name() {
        let raw = RawDetection { x1: 1.0, y1: 1.0, x2: 5.0, y2: 5.0, score: 0.9, class_id: 3 };
        let det = Detection::from_raw(&raw, &["person"], 10, 10).unwrap();
        assert_eq!(det.class_id, 3);
        assert_eq!(det.original_label, "clase 3");
    }
}
