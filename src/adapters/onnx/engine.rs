use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::Array3;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
use ort::session::Session;
use ort::value::Tensor;
use std::fs;
use tracing::{debug, info};

use crate::adapters::onnx::preprocess::to_input_tensor;
use crate::application::ports::{DetectorFactoryPort, DetectorPort};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::model::InferenceConfig;

/// Owned ONNX Runtime session for one detection model.
pub struct OnnxDetectorEngine {
    session: Session,
    input_size: u32,
    name: String,
}

impl OnnxDetectorEngine {
    pub fn load(path: &str, input_size: u32, intra_threads: usize) -> Result<Self> {
        #[allow(unused_mut)]
        let mut builder = Session::builder()?.with_intra_threads(intra_threads)?;

        // CUDA is optional: registered when the feature is on, otherwise CPU.
        #[cfg(feature = "cuda")]
        {
            let cuda = CUDAExecutionProvider::default().build();
            if let Ok(builder_with_cuda) = builder.clone().with_execution_providers([cuda]) {
                builder = builder_with_cuda;
            }
        }

        let model_bytes = fs::read(path).with_context(|| format!("reading model {path}"))?;
        let session = builder
            .commit_from_memory(&model_bytes)
            .with_context(|| format!("building session for {path}"))?;

        info!("ONNX session loaded from {} (input {}x{})", path, input_size, input_size);
        Ok(Self { session, input_size, name: path.to_string() })
    }

    /// Runs the model and returns output 0 as `(dims, data)`.
    fn run(&mut self, rgb: &RgbImage) -> Result<(Vec<usize>, Vec<f32>)> {
        let size = self.input_size;
        let input = to_input_tensor(rgb, size);

        let input_shape = vec![1, 3, size as i64, size as i64];
        let input_tensor = Tensor::from_array((input_shape, input))?;

        let outputs = self.session.run(ort::inputs![input_tensor])?;
        let (shape_out, data_out) = outputs[0].try_extract_tensor::<f32>()?;

        let dims: Vec<usize> = shape_out.iter().map(|&x| x.max(0) as usize).collect();
        Ok((dims, data_out.to_vec()))
    }
}

impl DetectorPort for OnnxDetectorEngine {
    fn infer(&mut self, image: &RgbImage) -> DomainResult<Array3<f32>> {
        let (dims, data) = self
            .run(image)
            .map_err(|e| DomainError::OperationFailed(format!("inference failed: {e:#}")))?;

        let &[batch, channels, slots] = dims.as_slice() else {
            return Err(DomainError::shape_mismatch("[1, C, D]", &dims));
        };
        Array3::from_shape_vec((batch, channels, slots), data)
            .map_err(|e| DomainError::OperationFailed(format!("output tensor: {e}")))
    }
}

impl Drop for OnnxDetectorEngine {
    fn drop(&mut self) {
        debug!("Releasing ONNX session {}", self.name);
    }
}

pub struct OnnxDetectorFactory;

impl OnnxDetectorFactory {
    pub fn new() -> Self { Self }
}

impl Default for OnnxDetectorFactory {
    fn default() -> Self { Self::new() }
}

impl DetectorFactoryPort for OnnxDetectorFactory {
    fn load(&self, config: &InferenceConfig) -> DomainResult<Box<dyn DetectorPort>> {
        let engine = OnnxDetectorEngine::load(
            &config.model.onnx_path,
            config.params.input_size,
            config.params.intra_threads,
        )
        .map_err(|e| DomainError::OperationFailed(format!("loading model '{}': {e:#}", config.model.name)))?;
        Ok(Box::new(engine))
    }
}
