use serde::{Deserialize, Serialize};

use crate::error::{ThumbError, ThumbResult};
use crate::mask::Mask;
use crate::Color;

/// Pixel format of a frame buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (4 bytes per pixel).
    Rgba8,
    /// 8-bit RGB (3 bytes per pixel, no alpha).
    Rgb8,
}

impl PixelFormat {
    /// Bytes per pixel for this format.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// A raster surface: the canvas, or a transient layer composited onto it.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Raw pixel data.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel format.
    pub format: PixelFormat,
}

impl FrameBuffer {
    /// Create a new frame buffer filled with zeros (transparent black).
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let size = (width as usize) * (height as usize) * format.bytes_per_pixel();
        Self {
            data: vec![0u8; size],
            width,
            height,
            format,
        }
    }

    /// Like [`FrameBuffer::new`] but reports allocation failure instead of aborting.
    pub fn try_new(width: u32, height: u32, format: PixelFormat) -> ThumbResult<Self> {
        let size = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| {
                ThumbError::Allocation(format!("{}x{} surface overflows usize", width, height))
            })?;
        let mut data = Vec::new();
        data.try_reserve_exact(size).map_err(|e| {
            ThumbError::Allocation(format!("{}x{} surface: {}", width, height, e))
        })?;
        data.resize(size, 0);
        Ok(Self {
            data,
            width,
            height,
            format,
        })
    }

    /// Create a frame buffer filled with a solid color.
    pub fn solid(width: u32, height: u32, color: &Color) -> Self {
        let pixel = color.to_rgba8();
        let pixel_count = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixel_count * 4);
        for _ in 0..pixel_count {
            data.extend_from_slice(&pixel);
        }
        Self {
            data,
            width,
            height,
            format: PixelFormat::Rgba8,
        }
    }

    /// Fallible [`FrameBuffer::solid`].
    pub fn try_solid(width: u32, height: u32, color: &Color) -> ThumbResult<Self> {
        let mut fb = Self::try_new(width, height, PixelFormat::Rgba8)?;
        let pixel = color.to_rgba8();
        for px in fb.data.chunks_exact_mut(4) {
            px.copy_from_slice(&pixel);
        }
        Ok(fb)
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Total byte size of the pixel data.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.format.bytes_per_pixel()
    }

    /// Get the RGBA value at a pixel coordinate. Returns None if out of bounds.
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = self.offset(x, y);
        match self.format {
            PixelFormat::Rgba8 => Some([
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
                self.data[offset + 3],
            ]),
            PixelFormat::Rgb8 => Some([
                self.data[offset],
                self.data[offset + 1],
                self.data[offset + 2],
                255,
            ]),
        }
    }

    /// Set the RGBA value at a pixel coordinate. No-op if out of bounds.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let offset = self.offset(x, y);
        let n = self.format.bytes_per_pixel();
        self.data[offset..offset + n].copy_from_slice(&rgba[..n]);
    }

    /// Source-over blend a single pixel. Signed coordinates; out of bounds is a no-op.
    pub fn blend_pixel(&mut self, x: i32, y: i32, rgba: [u8; 4]) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        if self.format != PixelFormat::Rgba8 {
            return;
        }
        let offset = self.offset(x as u32, y as u32);
        blend_over(&mut self.data[offset..offset + 4], rgba);
    }

    /// Fill an axis-aligned rectangle, blending when the color is translucent.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: &Color) {
        let rgba = color.to_rgba8();
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + width as i32).min(self.width as i32);
        let y1 = (y + height as i32).min(self.height as i32);
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend_pixel(px, py, rgba);
            }
        }
    }

    /// Alpha-composite `src` on top of `self` at position (dx, dy).
    /// Uses SIMD-friendly integer math for auto-vectorization.
    pub fn composite_over(&mut self, src: &FrameBuffer, dx: i32, dy: i32) {
        if self.format != PixelFormat::Rgba8 || src.format != PixelFormat::Rgba8 {
            return;
        }

        let Some((start_x, end_x, start_y, end_y)) = clip_span(self, src.width, src.height, dx, dy)
        else {
            return;
        };

        let src_stride = (src.width * 4) as usize;
        let dst_stride = (self.width * 4) as usize;

        for sy in start_y..end_y {
            let dst_y = dy + sy;
            let src_row_start = (sy as usize * src_stride) + (start_x as usize * 4);
            let dst_row_start = (dst_y as usize * dst_stride) + ((dx + start_x) as usize * 4);
            let len = (end_x - start_x) as usize * 4;

            let src_slice = &src.data[src_row_start..src_row_start + len];
            let dst_slice = &mut self.data[dst_row_start..dst_row_start + len];

            for (s, d) in src_slice.chunks_exact(4).zip(dst_slice.chunks_exact_mut(4)) {
                blend_over(d, [s[0], s[1], s[2], s[3]]);
            }
        }
    }

    /// Composite `src` at (dx, dy) gated by `mask`, which is in `src`
    /// coordinates. Canvas pixels outside the mask are left untouched.
    pub fn composite_masked(&mut self, src: &FrameBuffer, dx: i32, dy: i32, mask: &Mask) {
        if self.format != PixelFormat::Rgba8 || src.format != PixelFormat::Rgba8 {
            return;
        }
        let Some((start_x, end_x, start_y, end_y)) = clip_span(self, src.width, src.height, dx, dy)
        else {
            return;
        };
        for sy in start_y..end_y {
            for sx in start_x..end_x {
                let coverage = mask.get(sx, sy) as u32;
                if coverage == 0 {
                    continue;
                }
                let s = src.offset(sx as u32, sy as u32);
                let a = (src.data[s + 3] as u32 * coverage + 127) / 255;
                let rgba = [src.data[s], src.data[s + 1], src.data[s + 2], a as u8];
                let d = self.offset((dx + sx) as u32, (dy + sy) as u32);
                blend_over(&mut self.data[d..d + 4], rgba);
            }
        }
    }

    /// Paint a solid color through a coverage mask placed at (dx, dy).
    pub fn paint_mask(&mut self, mask: &Mask, dx: i32, dy: i32, color: &Color) {
        if self.format != PixelFormat::Rgba8 {
            return;
        }
        let [r, g, b, a] = color.to_rgba8();
        let Some((start_x, end_x, start_y, end_y)) = clip_span(self, mask.width, mask.height, dx, dy)
        else {
            return;
        };
        for my in start_y..end_y {
            for mx in start_x..end_x {
                let coverage = mask.get(mx, my) as u32;
                if coverage == 0 {
                    continue;
                }
                let alpha = ((a as u32 * coverage + 127) / 255) as u8;
                let d = self.offset((dx + mx) as u32, (dy + my) as u32);
                blend_over(&mut self.data[d..d + 4], [r, g, b, alpha]);
            }
        }
    }

    /// Copy out a sub-rectangle. The rectangle is clamped to the buffer.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> FrameBuffer {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);
        let bpp = self.format.bytes_per_pixel();
        let mut out = FrameBuffer::new(width, height, self.format);
        let row_len = width as usize * bpp;
        for row in 0..height {
            let src = self.offset(x, y + row);
            let dst = row as usize * row_len;
            out.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        out
    }

    /// Flatten onto an opaque backdrop and drop the alpha channel.
    pub fn flatten_rgb(&self, backdrop: &Color) -> ThumbResult<FrameBuffer> {
        if self.format == PixelFormat::Rgb8 {
            return Ok(self.clone());
        }
        let [br, bg, bb, _] = backdrop.to_rgba8();
        let mut out = FrameBuffer::try_new(self.width, self.height, PixelFormat::Rgb8)?;
        for (s, d) in self.data.chunks_exact(4).zip(out.data.chunks_exact_mut(3)) {
            let a = s[3] as u32;
            let inv = 255 - a;
            d[0] = ((s[0] as u32 * a + br as u32 * inv + 127) / 255) as u8;
            d[1] = ((s[1] as u32 * a + bg as u32 * inv + 127) / 255) as u8;
            d[2] = ((s[2] as u32 * a + bb as u32 * inv + 127) / 255) as u8;
        }
        Ok(out)
    }
}

/// Visible source span `(start_x, end_x, start_y, end_y)` for a
/// `w` x `h` source placed at (dx, dy), or None if fully off-canvas.
fn clip_span(dst: &FrameBuffer, w: u32, h: u32, dx: i32, dy: i32) -> Option<(i32, i32, i32, i32)> {
    let start_x = (-dx).max(0);
    let start_y = (-dy).max(0);
    let end_x = (w as i32).min(dst.width as i32 - dx);
    let end_y = (h as i32).min(dst.height as i32 - dy);
    if start_x >= end_x || start_y >= end_y {
        return None;
    }
    Some((start_x, end_x, start_y, end_y))
}

/// Porter-Duff "over" for straight (non-premultiplied) RGBA8.
fn blend_over(d: &mut [u8], s: [u8; 4]) {
    let sa = s[3] as u32;
    if sa == 0 {
        return;
    }
    if sa == 255 {
        d.copy_from_slice(&s);
        return;
    }

    let da = d[3] as u32;
    let inv_sa = 255 - sa;
    let out_a = sa + ((da * inv_sa) / 255);
    if out_a == 0 {
        return;
    }

    for i in 0..3 {
        let c = (s[i] as u32 * sa * 255 + d[i] as u32 * da * inv_sa) / (out_a * 255);
        d[i] = c.min(255) as u8;
    }
    d[3] = out_a as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_buffer_new() {
        let fb = FrameBuffer::new(1280, 720, PixelFormat::Rgba8);
        assert_eq!(fb.byte_size(), 1280 * 720 * 4);
        assert_eq!(fb.pixel_count(), 1280 * 720);
    }

    #[test]
    fn test_try_new_matches_new() {
        let fb = FrameBuffer::try_new(8, 4, PixelFormat::Rgb8).unwrap();
        assert_eq!(fb.byte_size(), 8 * 4 * 3);
        assert!(fb.data.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_try_new_reports_overflow() {
        let err = FrameBuffer::try_new(u32::MAX, u32::MAX, PixelFormat::Rgba8);
        if usize::BITS == 64 {
            // (2^32 - 1)^2 * 4 bytes does not fit in a 64-bit usize
            assert!(matches!(err, Err(ThumbError::Allocation(_))));
        }
    }

    #[test]
    fn test_frame_buffer_get_set_pixel() {
        let mut fb = FrameBuffer::new(10, 10, PixelFormat::Rgba8);
        fb.set_pixel(5, 5, [128, 64, 32, 255]);
        assert_eq!(fb.get_pixel(5, 5), Some([128, 64, 32, 255]));
        assert_eq!(fb.get_pixel(10, 0), None);
    }

    #[test]
    fn test_composite_over_opaque() {
        let blue = Color::rgb(0.0, 0.0, 1.0);
        let red = Color::rgb(1.0, 0.0, 0.0);
        let mut dst = FrameBuffer::solid(4, 4, &blue);
        let src = FrameBuffer::solid(2, 2, &red);
        dst.composite_over(&src, 1, 1);
        assert_eq!(dst.get_pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(dst.get_pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(dst.get_pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_composite_over_negative_offset_clips() {
        let mut dst = FrameBuffer::solid(4, 4, &Color::BLACK);
        let src = FrameBuffer::solid(3, 3, &Color::WHITE);
        dst.composite_over(&src, -2, -2);
        assert_eq!(dst.get_pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(dst.get_pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_composite_over_semi_transparent() {
        let mut dst = FrameBuffer::solid(2, 2, &Color::WHITE);
        let mut src = FrameBuffer::new(1, 1, PixelFormat::Rgba8);
        src.set_pixel(0, 0, [255, 0, 0, 128]);
        dst.composite_over(&src, 0, 0);
        let pixel = dst.get_pixel(0, 0).unwrap();
        assert!(pixel[0] > 200);
        assert!(pixel[1] > 50 && pixel[1] < 200);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_composite_masked_leaves_unmasked_canvas() {
        let mut dst = FrameBuffer::solid(4, 1, &Color::BLACK);
        let src = FrameBuffer::solid(4, 1, &Color::WHITE);
        let mut mask = Mask::new(4, 1);
        mask.set(1, 0, 255);
        mask.set(2, 0, 128);
        dst.composite_masked(&src, 0, 0, &mask);
        assert_eq!(dst.get_pixel(0, 0), Some([0, 0, 0, 255]));
        assert_eq!(dst.get_pixel(1, 0), Some([255, 255, 255, 255]));
        let half = dst.get_pixel(2, 0).unwrap();
        assert!(half[0] > 100 && half[0] < 160);
        assert_eq!(dst.get_pixel(3, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_paint_mask_uses_color() {
        let mut dst = FrameBuffer::solid(3, 3, &Color::BLACK);
        let mut mask = Mask::new(1, 1);
        mask.set(0, 0, 255);
        dst.paint_mask(&mask, 2, 2, &Color::rgb8(10, 20, 30));
        assert_eq!(dst.get_pixel(2, 2), Some([10, 20, 30, 255]));
        assert_eq!(dst.get_pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_crop_clamps() {
        let mut fb = FrameBuffer::new(4, 4, PixelFormat::Rgba8);
        fb.set_pixel(3, 3, [1, 2, 3, 4]);
        let c = fb.crop(2, 2, 10, 10);
        assert_eq!((c.width, c.height), (2, 2));
        assert_eq!(c.get_pixel(1, 1), Some([1, 2, 3, 4]));
    }

    #[test]
    fn test_flatten_rgb_over_backdrop() {
        let mut fb = FrameBuffer::new(2, 1, PixelFormat::Rgba8);
        fb.set_pixel(0, 0, [255, 0, 0, 255]);
        let flat = fb.flatten_rgb(&Color::WHITE).unwrap();
        assert_eq!(flat.format, PixelFormat::Rgb8);
        assert_eq!(flat.byte_size(), 6);
        assert_eq!(flat.get_pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(flat.get_pixel(1, 0), Some([255, 255, 255, 255]));
    }
}
