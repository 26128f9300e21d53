use std::cmp::Ordering;

use crate::domain::{
    detection::RawDetection,
    errors::{DomainError, DomainResult},
    model::DetectorParams,
};

/// Disposición del tensor de salida (sin la dimensión de lote).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputLayout {
    /// YOLOv5: `[candidatos, 5 + clases]`, con columna de objectness.
    RowMajor { candidates: usize, attrs: usize },
    /// YOLOv8/11: `[4 + clases, candidatos]`, sin objectness.
    ChannelMajor { attrs: usize, candidates: usize },
}

impl OutputLayout {
    pub fn from_shape(dims: &[usize]) -> DomainResult<Self> {
        let [batch, a, b] = dims else {
            return Err(DomainError::ResultParseFailure(format!(
                "se esperaba un tensor de 3 dimensiones, llegó {dims:?}"
            )));
        };
        if *batch == 0 {
            return Err(DomainError::ResultParseFailure("lote vacío en la salida del modelo".into()));
        }
        if a > b && *b > 5 {
            Ok(OutputLayout::RowMajor { candidates: *a, attrs: *b })
        } else if a <= b && *a > 4 {
            Ok(OutputLayout::ChannelMajor { attrs: *a, candidates: *b })
        } else {
            Err(DomainError::ResultParseFailure(format!("forma de salida inesperada: {dims:?}")))
        }
    }

    pub fn candidates(&self) -> usize {
        match *self {
            OutputLayout::RowMajor { candidates, .. } | OutputLayout::ChannelMajor { candidates, .. } => candidates,
        }
    }

    pub fn num_classes(&self) -> usize {
        match *self {
            OutputLayout::RowMajor { attrs, .. } => attrs - 5,
            OutputLayout::ChannelMajor { attrs, .. } => attrs - 4,
        }
    }

    fn class_offset(&self) -> usize {
        match self {
            OutputLayout::RowMajor { .. } => 5,
            OutputLayout::ChannelMajor { .. } => 4,
        }
    }

    fn value(&self, data: &[f32], candidate: usize, attr: usize) -> f32 {
        match *self {
            OutputLayout::RowMajor { attrs, .. } => data[candidate * attrs + attr],
            OutputLayout::ChannelMajor { candidates, .. } => data[attr * candidates + candidate],
        }
    }

    fn len(&self) -> usize {
        match *self {
            OutputLayout::RowMajor { candidates, attrs } | OutputLayout::ChannelMajor { attrs, candidates } => {
                candidates * attrs
            }
        }
    }
}

/// Convierte la salida cruda (primer elemento del lote) en detecciones filtradas.
/// `scale` lleva las cajas del tamaño de entrada al de la imagen original.
pub fn decode(data: &[f32], layout: OutputLayout, params: &DetectorParams, scale: (f32, f32)) -> DomainResult<Vec<RawDetection>> {
    if data.len() < layout.len() {
        return Err(DomainError::ResultParseFailure(format!(
            "tensor truncado: {} valores para {:?}",
            data.len(),
            layout
        )));
    }

    let (sx, sy) = scale;
    let offset = layout.class_offset();
    let mut out = Vec::new();

    for i in 0..layout.candidates() {
        let objectness = match layout {
            OutputLayout::RowMajor { .. } => layout.value(data, i, 4),
            OutputLayout::ChannelMajor { .. } => 1.0,
        };
        if objectness <= params.conf_threshold {
            continue;
        }

        let cx = layout.value(data, i, 0);
        let cy = layout.value(data, i, 1);
        let w = layout.value(data, i, 2);
        let h = layout.value(data, i, 3);
        let make = |class_id: usize, score: f32| RawDetection {
            x1: (cx - w / 2.0) * sx,
            y1: (cy - h / 2.0) * sy,
            x2: (cx + w / 2.0) * sx,
            y2: (cy + h / 2.0) * sy,
            score,
            class_id,
        };

        let scores = (0..layout.num_classes()).map(|c| (c, layout.value(data, i, offset + c) * objectness));
        if params.multi_label {
            out.extend(scores.filter(|(_, s)| *s > params.conf_threshold).map(|(c, s)| make(c, s)));
        } else if let Some((c, s)) = scores.max_by(|(_, a), (_, b)| a.total_cmp(b)) {
            if s > params.conf_threshold {
                out.push(make(c, s));
            }
        }
    }

    Ok(non_max_suppression(out, params.iou_threshold, params.agnostic_nms, params.max_detections))
}

pub fn iou(a: &RawDetection, b: &RawDetection) -> f32 {
    let area = |d: &RawDetection| (d.x2 - d.x1).max(0.0) * (d.y2 - d.y1).max(0.0);
    let iw = (a.x2.min(b.x2) - a.x1.max(b.x1)).max(0.0);
    let ih = (a.y2.min(b.y2) - a.y1.max(b.y1)).max(0.0);
    let inter = iw * ih;
    let union = area(a) + area(b) - inter;
    if union > 0.0 {
        inter / union
    } else {
        0.0
    }
}

/// NMS voraz por puntuación. Sin `agnostic` sólo compiten cajas de la misma clase.
pub fn non_max_suppression(mut candidates: Vec<RawDetection>, iou_threshold: f32, agnostic: bool, max_detections: usize) -> Vec<RawDetection> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let mut kept: Vec<RawDetection> = Vec::new();
    for cand in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| (agnostic || k.class_id == cand.class_id) && iou(k, &cand) > iou_threshold);
        if !suppressed {
            kept.push(cand);
        }
    }
    kept
}
