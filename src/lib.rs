//! Capture-and-detect: runs an object-detection model on an image and
//! decodes its raw output tensor into labelled boxes in image pixel space.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;

pub use domain::decoder::{decode, DetectionDecoder};
pub use domain::detection::{Detection, UNKNOWN_LABEL};
pub use domain::errors::{DomainError, DomainResult};
pub use domain::labels::ClassTable;
pub use domain::tensor::{CandidateRecord, OutputLayout};
