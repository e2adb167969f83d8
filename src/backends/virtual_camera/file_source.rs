// SPDX-License-Identifier: GPL-3.0-only

//! Still images as luma frames
//!
//! Lets the analyzer run over image files in place of live sensor output.

use crate::app::frame_processor::LumaFrame;
use crate::errors::{AppError, AppResult, FrameError};
use std::path::Path;
use tracing::{debug, info};

/// Image file extensions accepted by [`load_luma_frame`]
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp", "tif", "tiff"];

pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Owned packed 8-bit luma buffer
#[derive(Debug, Clone)]
pub struct OwnedLumaFrame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl OwnedLumaFrame {
    /// Borrow as an analyzable frame
    pub fn as_frame(&self) -> Result<LumaFrame<'_>, FrameError> {
        LumaFrame::packed(&self.data, self.width, self.height)
    }
}

/// Decode an image file and convert it to luma
pub fn load_luma_frame(path: &Path) -> AppResult<OwnedLumaFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if !is_image_extension(&extension) {
        return Err(AppError::Other(format!(
            "Unsupported file format: {}",
            extension
        )));
    }

    info!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        AppError::Io(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let luma = img.to_luma8();
    let width = luma.width();
    let height = luma.height();
    let data = luma.into_raw();

    debug!(width, height, "Image converted to luma");

    Ok(OwnedLumaFrame {
        data,
        width,
        height,
    })
}
