//! Canvas background: a pre-rendered override image when one is configured
//! and loadable, else a procedurally drawn hexagon grid.

use hexthumb_core::{FrameBuffer, LayoutConfig, ThumbResult};

use crate::compositor::build_outline_mask;
use crate::image_loader::{load_image, resize_exact};

/// Background at canvas size. Only allocation failure is an error.
pub fn build_background(config: &LayoutConfig) -> ThumbResult<FrameBuffer> {
    if let Some(path) = &config.assets.background {
        match load_image(path).and_then(|fb| resize_exact(&fb, config.width, config.height)) {
            Ok(fb) => {
                tracing::debug!(path = %path.display(), "using background override");
                return Ok(fb);
            }
            Err(e) => {
                tracing::warn!(error = %e, "background override unusable, generating grid");
            }
        }
    }
    generate_hex_background(config)
}

/// Solid fill with the outline of every background lattice cell.
pub fn generate_hex_background(config: &LayoutConfig) -> ThumbResult<FrameBuffer> {
    let mut canvas = FrameBuffer::try_solid(config.width, config.height, &config.palette.background)?;
    let cells = config
        .background
        .lattice
        .cells(config.width as f64, config.height as f64, None);
    let outline = build_outline_mask(config.width, config.height, &cells, config.background.outline_width as f64);
    canvas.paint_mask(&outline, 0, 0, &config.palette.hex_outline);
    Ok(canvas)
}
