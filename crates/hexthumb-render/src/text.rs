//! Text drawing onto a canvas.
//! A line is rasterized once into a coverage mask; plain and outlined
//! drawing both paint that mask, the outline by stamping it at offsets.

use hexthumb_core::{Color, FrameBuffer, Mask, TextMeasure};

use crate::font::FontHandle;

/// Horizontal alignment relative to the anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Coverage of one line of text, offset from its anchor.
///
/// The anchor is the top-left of the line box; the baseline is at
/// `anchor.y + ascent`.
#[derive(Debug, Clone)]
pub struct LineRaster {
    pub mask: Mask,
    pub offset_x: i32,
    pub offset_y: i32,
    pub advance: f32,
}

/// Rasterize `text` on one line. None when there is nothing to draw.
pub fn rasterize_line(text: &str, font: &FontHandle) -> Option<LineRaster> {
    if text.trim().is_empty() {
        return None;
    }
    let baseline = font.ascent().round() as i32;
    let (placed, advance) = font.layout(text);

    let glyphs: Vec<_> = placed
        .into_iter()
        .filter(|(ch, _)| !ch.is_whitespace())
        .map(|(ch, pen)| (pen.round() as i32, font.rasterize(ch)))
        .filter(|(_, g)| g.width > 0 && g.height > 0)
        .collect();
    if glyphs.is_empty() {
        return None;
    }

    let left = glyphs.iter().map(|(x, g)| x + g.xmin).min()?;
    let right = glyphs.iter().map(|(x, g)| x + g.xmin + g.width as i32).max()?;
    let top = glyphs.iter().map(|(_, g)| baseline + g.top).min()?;
    let bottom = glyphs.iter().map(|(_, g)| baseline + g.top + g.height as i32).max()?;

    let mut mask = Mask::new((right - left) as u32, (bottom - top) as u32);
    for (pen, glyph) in &glyphs {
        let gx = pen + glyph.xmin - left;
        let gy = baseline + glyph.top - top;
        for row in 0..glyph.height {
            for col in 0..glyph.width {
                let value = glyph.coverage[row * glyph.width + col];
                if value > 0 {
                    mask.raise(gx + col as i32, gy + row as i32, value);
                }
            }
        }
    }

    Some(LineRaster {
        mask,
        offset_x: left,
        offset_y: top,
        advance,
    })
}

/// Anchor x for `text` so that it aligns to `x` per `align`.
pub fn aligned_x(text: &str, font: &FontHandle, x: i32, align: TextAlign) -> i32 {
    let width = font.width(text).round() as i32;
    match align {
        TextAlign::Left => x,
        TextAlign::Center => x - width / 2,
        TextAlign::Right => x - width,
    }
}

/// Draw one line of text with its line box's top-left at `(x, y)`.
pub fn draw_text(canvas: &mut FrameBuffer, x: i32, y: i32, text: &str, font: &FontHandle, color: &Color) {
    if let Some(line) = rasterize_line(text, font) {
        canvas.paint_mask(&line.mask, x + line.offset_x, y + line.offset_y, color);
    }
}

/// Draw text with an outline made by stamping it in `outline` at every
/// integer offset within `outline_width` (except the origin), then once in
/// `fill` on top.
pub fn draw_outlined_text(
    canvas: &mut FrameBuffer,
    x: i32,
    y: i32,
    text: &str,
    font: &FontHandle,
    fill: &Color,
    outline: &Color,
    outline_width: u32,
) {
    let Some(line) = rasterize_line(text, font) else {
        return;
    };
    let ox = x + line.offset_x;
    let oy = y + line.offset_y;
    let w = outline_width as i32;
    for dy in -w..=w {
        for dx in -w..=w {
            if dx != 0 || dy != 0 {
                canvas.paint_mask(&line.mask, ox + dx, oy + dy, outline);
            }
        }
    }
    canvas.paint_mask(&line.mask, ox, oy, fill);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::{FontBook, FontRole};
    use hexthumb_core::PixelFormat;

    fn font(px: f32) -> FontHandle {
        FontBook::builtin().handle(FontRole::Regular, px)
    }

    #[test]
    fn test_blank_line_rasterizes_to_nothing() {
        assert!(rasterize_line("", &font(20.0)).is_none());
        assert!(rasterize_line("   ", &font(20.0)).is_none());
    }

    #[test]
    fn test_line_raster_bounds() {
        let line = rasterize_line("HI", &font(20.0)).unwrap();
        // builtin: 12px advance, 10px ink, 14px cap height below 16px ascent
        assert_eq!(line.offset_x, 0);
        assert_eq!(line.offset_y, 2);
        assert_eq!(line.mask.width, 22);
        assert_eq!(line.mask.height, 14);
        assert_eq!(line.advance, 24.0);
    }

    #[test]
    fn test_draw_text_paints_inside_box() {
        let mut canvas = FrameBuffer::new(100, 40, PixelFormat::Rgba8);
        draw_text(&mut canvas, 10, 5, "I", &font(20.0), &Color::WHITE);
        // Vertical stroke of 'I' is column 2 of the bitmap -> x 14..16
        assert_eq!(canvas.get_pixel(14, 10), Some([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_outline_surrounds_fill() {
        let mut canvas = FrameBuffer::solid(100, 40, &Color::WHITE);
        draw_outlined_text(&mut canvas, 10, 5, "I", &font(20.0), &Color::WHITE, &Color::BLACK, 2);
        // Two pixels left of the stroke is outline, the stroke itself is fill.
        assert_eq!(canvas.get_pixel(12, 10), Some([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(14, 10), Some([255, 255, 255, 255]));
    }

    #[test]
    fn test_aligned_x() {
        let f = font(10.0);
        assert_eq!(aligned_x("AB", &f, 100, TextAlign::Left), 100);
        assert_eq!(aligned_x("AB", &f, 100, TextAlign::Center), 94);
        assert_eq!(aligned_x("AB", &f, 100, TextAlign::Right), 88);
    }
}
