//! Stand-in poster used whenever the real one cannot be fetched or decoded.

use hexthumb_core::{FrameBuffer, LayoutConfig, TextMeasure, ThumbResult};

use crate::font::{FontBook, FontRole};
use crate::image_loader::{cover_fit, load_image};
use crate::text::draw_outlined_text;

/// Placeholder for a `width` x `height` poster slot: the configured
/// override image when loadable, else the generated panel.
pub fn resolve_placeholder(
    config: &LayoutConfig,
    fonts: &FontBook,
    width: u32,
    height: u32,
) -> ThumbResult<FrameBuffer> {
    if let Some(path) = &config.assets.placeholder {
        match load_image(path).and_then(|fb| cover_fit(&fb, width, height)) {
            Ok(fb) => return Ok(fb),
            Err(e) => tracing::warn!(error = %e, "placeholder override unusable, generating panel"),
        }
    }
    placeholder_panel(config, fonts, width, height)
}

/// Solid panel with a border and centered outlined label. Deterministic
/// for a given config, font book and size.
pub fn placeholder_panel(
    config: &LayoutConfig,
    fonts: &FontBook,
    width: u32,
    height: u32,
) -> ThumbResult<FrameBuffer> {
    let palette = &config.palette;
    let mut panel = FrameBuffer::try_solid(width, height, &palette.placeholder)?;

    let font = fonts.handle(FontRole::Bold, config.scaled(config.fonts.bold));
    let label = &config.placeholder.label;
    let (text_w, text_h) = font.measure(label);
    let x = (width as i32 - text_w.round() as i32) / 2;
    let y = (height as i32 - text_h.round() as i32) / 2;
    draw_outlined_text(
        &mut panel,
        x,
        y,
        label,
        &font,
        &palette.text,
        &palette.text_outline,
        config.text.body_outline,
    );

    let inset = config.placeholder.border_inset as i32;
    let bw = config.placeholder.border_width;
    let inner_w = (width as i32 - 2 * inset).max(0) as u32;
    let inner_h = (height as i32 - 2 * inset).max(0) as u32;
    let border = &palette.placeholder_border;
    panel.fill_rect(inset, inset, inner_w, bw, border);
    panel.fill_rect(inset, height as i32 - inset - bw as i32, inner_w, bw, border);
    panel.fill_rect(inset, inset, bw, inner_h, border);
    panel.fill_rect(width as i32 - inset - bw as i32, inset, bw, inner_h, border);

    Ok(panel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexthumb_core::hash::hash_frame;
    use hexthumb_core::LayoutPreset;

    fn config() -> LayoutConfig {
        LayoutConfig::preset(LayoutPreset::Classic)
    }

    #[test]
    fn test_panel_is_deterministic() {
        let fonts = FontBook::builtin();
        let a = placeholder_panel(&config(), &fonts, 800, 720).unwrap();
        let b = placeholder_panel(&config(), &fonts, 800, 720).unwrap();
        assert_eq!(hash_frame(&a), hash_frame(&b));
    }

    #[test]
    fn test_panel_layout() {
        let config = config();
        let panel = placeholder_panel(&config, &FontBook::builtin(), 800, 720).unwrap();
        let border = config.palette.placeholder_border.to_rgba8();
        let fill = config.palette.placeholder.to_rgba8();
        assert_eq!(panel.get_pixel(0, 0), Some(fill));
        assert_eq!(panel.get_pixel(4, 100), Some(border));
        assert_eq!(panel.get_pixel(795, 100), Some(border));
        assert_eq!(panel.get_pixel(100, 715), Some(border));
        assert_eq!(panel.get_pixel(100, 100), Some(fill));
    }

    #[test]
    fn test_panel_has_visible_label() {
        let config = config();
        let panel = placeholder_panel(&config, &FontBook::builtin(), 800, 720).unwrap();
        let text = config.palette.text.to_rgba8();
        let center_band = panel.crop(0, 330, 800, 60);
        assert!(center_band.data.chunks_exact(4).any(|p| p == text));
    }

    #[test]
    fn test_missing_override_uses_panel() {
        let mut config = config();
        config.assets.placeholder = Some("/nonexistent/placeholder.png".into());
        let fonts = FontBook::builtin();
        let resolved = resolve_placeholder(&config, &fonts, 300, 200).unwrap();
        let panel = placeholder_panel(&config, &fonts, 300, 200).unwrap();
        assert_eq!(resolved.data, panel.data);
    }
}
