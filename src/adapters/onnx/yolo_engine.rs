use anyhow::Result;
use image::{imageops::FilterType, RgbImage};
use ndarray::Array4;
use ort::session::Session;
use ort::value::Tensor;
use std::fs;

use crate::adapters::onnx::postprocess::{self, OutputLayout};
use crate::domain::detection::RawDetection;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::DetectorParams;

pub struct OnnxYoloEngine {
    session: Session,
}

impl OnnxYoloEngine {
    pub fn load(path: &str) -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = Session::builder()?.with_intra_threads(4)?;

        // CUDA es opcional: si está disponible se registra, si no continuamos en CPU.
        #[cfg(feature = "cuda")]
        {
            let cuda = ort::execution_providers::CUDAExecutionProvider::default().build();
            if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
                builder = builder_with_cuda;
            }
        }

        // El modelo se lee completo y se entrega con commit_from_memory.
        let model_bytes = fs::read(path)?;
        let session = builder.commit_from_memory(&model_bytes)?;

        Ok(Self { session })
    }

    /// Inferencia sobre una imagen RGB. Las cajas salen en píxeles de `rgb`.
    pub fn infer(&mut self, rgb: &RgbImage, params: &DetectorParams) -> DomainResult<Vec<RawDetection>> {
        let imgsz = params.input_size as usize;
        let resized = image::imageops::resize(rgb, imgsz as u32, imgsz as u32, FilterType::Triangle);

        let mut input = Array4::<f32>::zeros((1, 3, imgsz, imgsz));
        for (x, y, pixel) in resized.enumerate_pixels() {
            input[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
            input[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
            input[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
        }

        let unavailable = |e: ort::Error| DomainError::DetectorUnavailable(format!("fallo en la inferencia: {e}"));

        let input_shape = vec![1, 3, imgsz as i64, imgsz as i64];
        let (raw_input, _) = input.into_raw_vec_and_offset();
        let input_tensor = Tensor::from_array((input_shape, raw_input)).map_err(unavailable)?;

        let outputs = self.session.run(ort::inputs![input_tensor]).map_err(unavailable)?;
        let (shape_out, data_out) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| DomainError::ResultParseFailure(format!("salida no numérica: {e}")))?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x.max(0) as usize).collect();
        let layout = OutputLayout::from_shape(&dims)?;

        let sx = rgb.width() as f32 / imgsz as f32;
        let sy = rgb.height() as f32 / imgsz as f32;
        postprocess::decode(data_out, layout, params, (sx, sy))
    }
}
