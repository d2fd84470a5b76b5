use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use capture_detect::application::ports::{ClassTablePort, DetectorFactoryPort, DetectorPort, ModelCatalogPort};
use capture_detect::domain::labels::ClassTable;
use capture_detect::domain::model::{InferenceConfig, ModelId};
use capture_detect::{DomainError, DomainResult};
use image::RgbImage;
use ndarray::Array3;

/// Returns a fixed output tensor and records the size of every image it sees.
pub struct FixedDetector {
    output: Array3<f32>,
    seen: Arc<Mutex<Vec<(u32, u32)>>>,
    dropped: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    delay: Duration,
}

impl DetectorPort for FixedDetector {
    fn infer(&mut self, image: &RgbImage) -> DomainResult<Array3<f32>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.seen.lock().unwrap().push(image.dimensions());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }
}

impl Drop for FixedDetector {
    fn drop(&mut self) {
        self.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct FixedDetectorFactory {
    pub output: Arc<Mutex<Array3<f32>>>,
    pub seen: Arc<Mutex<Vec<(u32, u32)>>>,
    pub loads: Arc<AtomicUsize>,
    pub dropped: Arc<AtomicUsize>,
    /// Highest number of `infer` calls observed running at once.
    pub max_in_flight: Arc<AtomicUsize>,
    pub in_flight: Arc<AtomicUsize>,
    pub delay: Duration,
    pub fail: bool,
}

impl FixedDetectorFactory {
    pub fn new(output: Array3<f32>) -> Self {
        Self {
            output: Arc::new(Mutex::new(output)),
            ..Default::default()
        }
    }

    pub fn set_output(&self, output: Array3<f32>) {
        *self.output.lock().unwrap() = output;
    }
}

impl DetectorFactoryPort for FixedDetectorFactory {
    fn load(&self, _config: &InferenceConfig) -> DomainResult<Box<dyn DetectorPort>> {
        if self.fail {
            return Err(DomainError::OperationFailed("corrupt model".into()));
        }
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FixedDetector {
            output: self.output.lock().unwrap().clone(),
            seen: self.seen.clone(),
            dropped: self.dropped.clone(),
            in_flight: self.in_flight.clone(),
            max_in_flight: self.max_in_flight.clone(),
            delay: self.delay,
        }))
    }
}

/// Accepts every model path.
pub struct AnyModel;

#[async_trait]
impl ModelCatalogPort for AnyModel {
    async fn validate_model(&self, _model: &ModelId) -> DomainResult<()> {
        Ok(())
    }
}

pub struct StaticClasses(pub Vec<&'static str>);

#[async_trait]
impl ClassTablePort for StaticClasses {
    async fn load_classes(&self, _path: &str) -> DomainResult<ClassTable> {
        Ok(self.0.iter().copied().collect())
    }
}
