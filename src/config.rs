use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::application::dto::model_name_from_path;
use crate::domain::model::{DetectorParams, GeometryPolicy, InferenceConfig, ModelId};
use crate::domain::tensor::OutputLayout;

#[derive(Debug, Parser)]
#[command(name = "capture-detect", version, about = "Run an object-detection model on captured images")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the detection HTTP API
    Serve(ServeArgs),
    /// Detect objects in a single image file
    Detect(DetectArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long, env = "CAPTURE_DETECT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "CAPTURE_DETECT_PORT", default_value_t = 8090)]
    pub port: u16,

    /// Directory served for any path outside /api
    #[arg(long, default_value = "static")]
    pub static_dir: PathBuf,

    /// Start without a model; configure later with POST /api/config
    #[arg(long)]
    pub lazy: bool,

    #[command(flatten)]
    pub detector: DetectorArgs,
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// Image to run detection on
    #[arg(long, short)]
    pub image: PathBuf,

    /// Write the image with detection boxes drawn to this path
    #[arg(long)]
    pub overlay: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub detector: DetectorArgs,
}

#[derive(Debug, Clone, Args)]
pub struct DetectorArgs {
    /// ONNX model file
    #[arg(long, env = "CAPTURE_DETECT_MODEL", default_value = "models/best_float32.onnx")]
    pub model: String,

    /// Class label file, one label per line
    #[arg(long, env = "CAPTURE_DETECT_LABELS", default_value = "models/class.txt")]
    pub labels: String,

    /// Square input resolution fed to the model
    #[arg(long, default_value_t = 640)]
    pub input_size: u32,

    /// Candidates at or below this confidence are dropped
    #[arg(long, default_value_t = 0.1)]
    pub threshold: f32,

    /// Expected output shape as C,D (tensor [1][C][D]); any shape when omitted
    #[arg(long, value_parser = parse_layout)]
    pub output_shape: Option<OutputLayout>,

    /// Clamp normalized box coordinates to [0, 1] before rescaling
    #[arg(long)]
    pub clamp_geometry: bool,

    #[arg(long, default_value_t = 4)]
    pub intra_threads: usize,
}

impl DetectorArgs {
    pub fn to_config(&self) -> InferenceConfig {
        InferenceConfig {
            model: ModelId {
                name: model_name_from_path(&self.model),
                onnx_path: self.model.clone(),
            },
            labels_path: self.labels.clone(),
            params: DetectorParams {
                input_size: self.input_size,
                conf_threshold: self.threshold,
                output_layout: self.output_shape,
                geometry: if self.clamp_geometry { GeometryPolicy::Clamp } else { GeometryPolicy::Passthrough },
                intra_threads: self.intra_threads,
            },
        }
    }
}

fn parse_layout(s: &str) -> Result<OutputLayout, String> {
    let (c, d) = s
        .split_once(|ch: char| ch == ',' || ch == 'x')
        .ok_or_else(|| format!("expected C,D, got '{s}'"))?;
    let channels = c.trim().parse().map_err(|e| format!("channels: {e}"))?;
    let slots = d.trim().parse().map_err(|e| format!("slots: {e}"))?;
    let layout = OutputLayout { channels, slots };
    layout.validate().map_err(|e| e.to_string())?;
    Ok(layout)
}
