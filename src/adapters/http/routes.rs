use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use image::RgbImage;
use tracing::{error, warn};

use crate::adapters::capture::decode_rgb;
use crate::adapters::http::state::HttpState;
use crate::adapters::overlay::render::{draw_detections, encode_jpeg, BOX_COLOR};
use crate::application::dto::{ConfigResponse, ConfigureDetectorRequest, DetectQuery, ErrorResponse, OkResponse};
use crate::domain::errors::DomainError;

/// Maps domain errors onto HTTP status codes.
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self { Self(e) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::InvalidInput(_) | DomainError::ShapeMismatch { .. } => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::NotConfigured => StatusCode::CONFLICT,
            DomainError::OperationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }
        (status, Json(ErrorResponse { error: self.0.to_string() })).into_response()
    }
}

pub async fn health() -> impl IntoResponse {
    Json(OkResponse { ok: true })
}

pub async fn get_config(State(st): State<HttpState>) -> impl IntoResponse {
    let config = st.detection.current_config().await;
    Json(ConfigResponse { configured: config.is_some(), config })
}

pub async fn apply_config(
    State(st): State<HttpState>,
    Json(req): Json<ConfigureDetectorRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    st.detection.configure(req.into()).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Decodes an uploaded image on the blocking pool.
async fn decode_upload(body: Bytes) -> Result<RgbImage, ApiError> {
    let image = tokio::task::spawn_blocking(move || decode_rgb(&body))
        .await
        .map_err(|e| DomainError::OperationFailed(format!("decode task panicked: {e}")))??;
    Ok(image)
}

pub async fn detect(
    State(st): State<HttpState>,
    Query(q): Query<DetectQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let image = decode_upload(body).await?;
    let report = st.detection.detect(image, q.threshold).await?;
    Ok(Json(report))
}

pub async fn detect_overlay(
    State(st): State<HttpState>,
    Query(q): Query<DetectQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let image = decode_upload(body).await?;
    let mut canvas = image.clone();
    let report = st.detection.detect(image, q.threshold).await?;

    let jpeg = tokio::task::spawn_blocking(move || {
        draw_detections(&mut canvas, &report.detections, BOX_COLOR, 2);
        encode_jpeg(&canvas)
    })
    .await
    .map_err(|e| DomainError::OperationFailed(format!("overlay task panicked: {e}")))?
    .map_err(|e| DomainError::OperationFailed(format!("encoding overlay: {e:#}")))?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], jpeg))
}
