//! Image loading module.
//! Decodes PNG, JPEG, WebP, and other formats into FrameBuffers, and fits
//! them to exact target boxes.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::RgbaImage;

use hexthumb_core::frame::FrameBuffer;
use hexthumb_core::{PixelFormat, ThumbError, ThumbResult};

/// Load an image file and convert it to a FrameBuffer.
pub fn load_image(path: &Path) -> ThumbResult<FrameBuffer> {
    let img = image::open(path).map_err(|e| {
        ThumbError::asset(
            format!("failed to load image '{}': {}", path.display(), e),
            path,
        )
    })?;
    Ok(from_rgba(img.to_rgba8()))
}

/// Load an image from raw bytes (e.g., a downloaded poster).
pub fn load_image_from_bytes(data: &[u8]) -> ThumbResult<FrameBuffer> {
    let img = image::load_from_memory(data)
        .map_err(|e| ThumbError::asset(format!("failed to decode image: {}", e), "<memory>"))?;
    Ok(from_rgba(img.to_rgba8()))
}

fn from_rgba(rgba: RgbaImage) -> FrameBuffer {
    let (width, height) = rgba.dimensions();
    let mut fb = FrameBuffer::new(width, height, PixelFormat::Rgba8);
    fb.data = rgba.into_raw();
    fb
}

fn to_rgba(fb: &FrameBuffer) -> ThumbResult<RgbaImage> {
    if fb.format != PixelFormat::Rgba8 {
        return Err(ThumbError::InvalidArgument("expected an RGBA frame".into()));
    }
    RgbaImage::from_raw(fb.width, fb.height, fb.data.clone())
        .ok_or_else(|| ThumbError::Render("frame data does not match its dimensions".into()))
}

/// Resize to exactly `width` x `height`, ignoring aspect ratio.
pub fn resize_exact(fb: &FrameBuffer, width: u32, height: u32) -> ThumbResult<FrameBuffer> {
    if width == 0 || height == 0 {
        return Err(ThumbError::InvalidArgument(format!(
            "cannot resize to {}x{}",
            width, height
        )));
    }
    if fb.width == width && fb.height == height {
        return Ok(fb.clone());
    }
    let img = to_rgba(fb)?;
    Ok(from_rgba(imageops::resize(&img, width, height, FilterType::Lanczos3)))
}

/// Source rectangle `(x, y, w, h)` with the target's aspect ratio, centered
/// on the source. Wider sources lose their sides, taller ones top and bottom.
pub fn cover_crop_rect(src_w: u32, src_h: u32, target_w: u32, target_h: u32) -> (u32, u32, u32, u32) {
    let src_ratio = src_w as f64 / src_h as f64;
    let target_ratio = target_w as f64 / target_h as f64;
    if src_ratio > target_ratio {
        let w = ((src_h as f64 * target_ratio).round() as u32).clamp(1, src_w);
        ((src_w - w) / 2, 0, w, src_h)
    } else {
        let h = ((src_w as f64 / target_ratio).round() as u32).clamp(1, src_h);
        (0, (src_h - h) / 2, src_w, h)
    }
}

/// Scale and center-crop `fb` so it fills exactly `width` x `height`
/// without distortion.
///
/// The crop is taken in source space before scaling, which is the same
/// image as scaling first but never allocates the oversized intermediate
/// that a degenerate 1xN source would need.
pub fn cover_fit(fb: &FrameBuffer, width: u32, height: u32) -> ThumbResult<FrameBuffer> {
    if width == 0 || height == 0 {
        return Err(ThumbError::InvalidArgument(format!(
            "cannot cover-fit to {}x{}",
            width, height
        )));
    }
    if fb.width == 0 || fb.height == 0 {
        return Err(ThumbError::InvalidArgument("cannot cover-fit an empty image".into()));
    }
    let img = to_rgba(fb)?;
    let (x, y, w, h) = cover_crop_rect(fb.width, fb.height, width, height);
    let cropped = imageops::crop_imm(&img, x, y, w, h).to_image();
    let scaled = if w == width && h == height {
        cropped
    } else {
        imageops::resize(&cropped, width, height, FilterType::Lanczos3)
    };
    Ok(from_rgba(scaled))
}
