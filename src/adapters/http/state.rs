use std::sync::Arc;
use crate::application::services::DetectionService;

/// Shared state for the axum handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Model lifecycle and serialized detection passes.
    pub detection: Arc<DetectionService>,
}
