pub mod model_catalog;

#[cfg(feature = "onnx")]
pub mod detector;
#[cfg(feature = "onnx")]
pub mod postprocess;
#[cfg(feature = "onnx")]
pub mod yolo_engine;
