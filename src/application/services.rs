use std::sync::Arc;
use std::time::Instant;

use image::RgbImage;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    application::ports::{ClassTablePort, DetectorFactoryPort, DetectorPort, ModelCatalogPort},
    domain::{
        decoder::DetectionDecoder,
        errors::{DomainError, DomainResult},
        labels::ClassTable,
        model::InferenceConfig,
        report::{summarize_detections, DetectionReport},
    },
};

/// Everything one detection pass needs, acquired once by `configure`.
struct DetectionSession {
    config: InferenceConfig,
    detector: Box<dyn DetectorPort>,
    classes: ClassTable,
    decoder: DetectionDecoder,
}

impl DetectionSession {
    fn run(&mut self, image: &RgbImage, threshold: f32) -> DomainResult<DetectionReport> {
        let t_infer = Instant::now();
        let output = self.detector.infer(image)?;
        let infer_ms = t_infer.elapsed().as_secs_f32() * 1000.0;

        let t_decode = Instant::now();
        let detections = self.decoder.decode(
            output.view(),
            &self.classes,
            image.width() as f32,
            image.height() as f32,
            threshold,
        )?;
        let decode_ms = t_decode.elapsed().as_secs_f32() * 1000.0;

        Ok(DetectionReport {
            width: image.width(),
            height: image.height(),
            infer_ms,
            decode_ms,
            detections,
        })
    }
}

/// Orchestrates model loading and detection passes.
///
/// Passes are serialized: the session lock is held from inference until the
/// decoded detections are returned, so only one image is in flight.
#[derive(Clone)]
pub struct DetectionService {
    session: Arc<Mutex<Option<DetectionSession>>>,
    factory: Arc<dyn DetectorFactoryPort>,
    model_catalog: Arc<dyn ModelCatalogPort>,
    class_source: Arc<dyn ClassTablePort>,
}

impl DetectionService {
    pub fn new(
        factory: Arc<dyn DetectorFactoryPort>,
        model_catalog: Arc<dyn ModelCatalogPort>,
        class_source: Arc<dyn ClassTablePort>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            factory,
            model_catalog,
            class_source,
        }
    }

    /// Loads the model and class table described by `config`, replacing
    /// (and dropping) any previous session. On error the previous session
    /// stays in place.
    pub async fn configure(&self, config: InferenceConfig) -> DomainResult<()> {
        config.validate()?;
        self.model_catalog.validate_model(&config.model).await?;
        let classes = self.class_source.load_classes(&config.labels_path).await?;

        let factory = self.factory.clone();
        let load_cfg = config.clone();
        let detector = tokio::task::spawn_blocking(move || factory.load(&load_cfg))
            .await
            .map_err(|e| DomainError::OperationFailed(format!("model loader panicked: {e}")))??;

        let mut decoder = DetectionDecoder::new().with_geometry(config.params.geometry);
        if let Some(layout) = config.params.output_layout {
            decoder = decoder.with_layout(layout);
        }

        info!(
            "Detector ready: model '{}' ({}), {} classes, threshold {}",
            config.model.name,
            config.model.onnx_path,
            classes.len(),
            config.params.conf_threshold
        );

        let mut lock = self.session.lock().await;
        *lock = Some(DetectionSession { config, detector, classes, decoder });
        Ok(())
    }

    pub async fn current_config(&self) -> Option<InferenceConfig> {
        self.session.lock().await.as_ref().map(|s| s.config.clone())
    }

    /// Runs one detection pass. `threshold` overrides the configured
    /// confidence threshold for this call only.
    pub async fn detect(&self, image: RgbImage, threshold: Option<f32>) -> DomainResult<DetectionReport> {
        if let Some(t) = threshold {
            if !t.is_finite() {
                return Err(DomainError::InvalidInput("threshold must be finite".into()));
            }
        }

        let mut guard = self.session.clone().lock_owned().await;
        if guard.is_none() {
            return Err(DomainError::NotConfigured);
        }

        let report = tokio::task::spawn_blocking(move || {
            let session = guard.as_mut().ok_or(DomainError::NotConfigured)?;
            let threshold = threshold.unwrap_or(session.config.params.conf_threshold);
            session.run(&image, threshold)
        })
        .await
        .map_err(|e| DomainError::OperationFailed(format!("detection task panicked: {e}")))??;

        debug!(
            "{}x{} infer {:.1} ms, decode {:.2} ms",
            report.width, report.height, report.infer_ms, report.decode_ms
        );
        info!("Detected {} object(s): {}", report.detections.len(), summarize_detections(&report.detections));
        Ok(report)
    }
}
