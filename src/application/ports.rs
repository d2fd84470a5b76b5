use async_trait::async_trait;
use image::RgbImage;
use ndarray::Array3;

use crate::domain::{errors::DomainResult, labels::ClassTable, model::*};

/// A loaded model handle. Dropping it releases the underlying runtime session.
pub trait DetectorPort: Send {
    /// Runs the model on `image` and returns its raw `[1][C][D]` output.
    fn infer(&mut self, image: &RgbImage) -> DomainResult<Array3<f32>>;
}

pub trait DetectorFactoryPort: Send + Sync {
    fn load(&self, config: &InferenceConfig) -> DomainResult<Box<dyn DetectorPort>>;
}

#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    async fn validate_model(&self, model: &ModelId) -> DomainResult<()>;
}

#[async_trait]
pub trait ClassTablePort: Send + Sync {
    async fn load_classes(&self, path: &str) -> DomainResult<ClassTable>;
}
