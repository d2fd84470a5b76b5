//! Image sources standing in for the camera: files on disk and uploaded bytes.

use anyhow::{Context, Result};
use image::RgbImage;
use std::path::Path;

use crate::domain::errors::{DomainError, DomainResult};

pub fn load_rgb(path: impl AsRef<Path>) -> Result<RgbImage> {
    let path = path.as_ref();
    let img = image::open(path).with_context(|| format!("opening image {}", path.display()))?;
    Ok(img.to_rgb8())
}

/// Decodes an uploaded image (any format `image` can guess) into RGB8.
pub fn decode_rgb(bytes: &[u8]) -> DomainResult<RgbImage> {
    if bytes.is_empty() {
        return Err(DomainError::InvalidInput("empty image body".into()));
    }
    let img = image::load_from_memory(bytes)
        .map_err(|e| DomainError::InvalidInput(format!("undecodable image: {e}")))?;
    Ok(img.to_rgb8())
}
