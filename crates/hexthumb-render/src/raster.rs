//! Anti-aliased shape rasterization into coverage masks.

use hexthumb_core::{Mask, Point2D};

/// Vertical sub-samples per pixel row for polygon fills.
const SUBSAMPLES: usize = 4;

/// Whether a shape adds coverage to a mask or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Fill,
    Cut,
}

fn apply(mask: &mut Mask, x: i32, y: i32, coverage: f32, paint: Paint) {
    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
    if value == 0 {
        return;
    }
    match paint {
        Paint::Fill => mask.raise(x, y, value),
        Paint::Cut => mask.lower(x, y, value),
    }
}

/// Add `weight` of coverage over `[x0, x1)` with fractional end pixels.
fn add_span(acc: &mut [f32], x0: f64, x1: f64, weight: f32) {
    let limit = acc.len() as f64;
    let x0 = x0.clamp(0.0, limit);
    let x1 = x1.clamp(0.0, limit);
    if x1 <= x0 {
        return;
    }
    let i0 = x0.floor() as usize;
    let i1 = x1.floor() as usize;
    if i0 == i1 {
        acc[i0] += (x1 - x0) as f32 * weight;
        return;
    }
    acc[i0] += (i0 as f64 + 1.0 - x0) as f32 * weight;
    for cell in &mut acc[i0 + 1..i1] {
        *cell += weight;
    }
    if i1 < acc.len() {
        acc[i1] += (x1 - i1 as f64) as f32 * weight;
    }
}

/// Scanline-fill a closed polygon (non-zero winding).
pub fn fill_polygon(mask: &mut Mask, points: &[Point2D], paint: Paint) {
    if points.len() < 3 || mask.width == 0 || mask.height == 0 {
        return;
    }
    let min_y = points.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
    let max_y = points.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
    let row_start = (min_y.floor() as i64).max(0);
    let row_end = (max_y.ceil() as i64).min(mask.height as i64);

    let mut acc = vec![0f32; mask.width as usize];
    let mut crossings: Vec<(f64, i32)> = Vec::new();
    let weight = 1.0 / SUBSAMPLES as f32;

    for row in row_start..row_end {
        acc.fill(0.0);
        for s in 0..SUBSAMPLES {
            let sy = row as f64 + (s as f64 + 0.5) / SUBSAMPLES as f64;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = &points[(i + 1) % points.len()];
                if a.y == b.y {
                    continue;
                }
                let (lo, hi) = if a.y < b.y { (a.y, b.y) } else { (b.y, a.y) };
                if sy < lo || sy >= hi {
                    continue;
                }
                let x = a.x + (sy - a.y) * (b.x - a.x) / (b.y - a.y);
                crossings.push((x, if b.y > a.y { 1 } else { -1 }));
            }
            crossings.sort_by(|l, r| l.0.total_cmp(&r.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if winding != 0 {
                    add_span(&mut acc, pair[0].0, pair[1].0, weight);
                }
            }
        }
        for (x, coverage) in acc.iter().enumerate() {
            apply(mask, x as i32, row as i32, *coverage, paint);
        }
    }
}

/// Filled disc.
pub fn fill_disc(mask: &mut Mask, center: Point2D, radius: f64, paint: Paint) {
    if radius <= 0.0 {
        return;
    }
    let x0 = (center.x - radius - 1.0).floor() as i32;
    let x1 = (center.x + radius + 1.0).ceil() as i32;
    let y0 = (center.y - radius - 1.0).floor() as i32;
    let y1 = (center.y + radius + 1.0).ceil() as i32;
    for y in y0.max(0)..y1.min(mask.height as i32) {
        for x in x0.max(0)..x1.min(mask.width as i32) {
            let d = Point2D::new(x as f64 + 0.5, y as f64 + 0.5).distance(&center) - radius;
            apply(mask, x, y, (0.5 - d) as f32, paint);
        }
    }
}

/// Outline of a closed polygon: one quad per edge, disc-capped corners.
pub fn stroke_polygon(mask: &mut Mask, points: &[Point2D], width: f64) {
    if points.len() < 2 || width <= 0.0 {
        return;
    }
    let half = width / 2.0;
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        let len = a.distance(b);
        if len > 0.0 {
            let nx = -(b.y - a.y) / len * half;
            let ny = (b.x - a.x) / len * half;
            let quad = [a.offset(nx, ny), b.offset(nx, ny), b.offset(-nx, -ny), a.offset(-nx, -ny)];
            fill_polygon(mask, &quad, Paint::Fill);
        }
        fill_disc(mask, *a, half, Paint::Fill);
    }
}

/// Signed distance from `(px, py)` to a rounded box; negative inside.
fn rounded_box_distance(px: f64, py: f64, x: f64, y: f64, w: f64, h: f64, radius: f64) -> f64 {
    let r = radius.clamp(0.0, w.min(h) / 2.0);
    let cx = x + w / 2.0;
    let cy = y + h / 2.0;
    let qx = (px - cx).abs() - (w / 2.0 - r);
    let qy = (py - cy).abs() - (h / 2.0 - r);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - r
}

/// Rounded rectangle with its top-left at `(x, y)`.
pub fn fill_rounded_rect(mask: &mut Mask, x: f64, y: f64, w: f64, h: f64, radius: f64, paint: Paint) {
    if w <= 0.0 || h <= 0.0 {
        return;
    }
    let y_start = (y.floor() as i32).max(0);
    let y_end = ((y + h).ceil() as i32).min(mask.height as i32);
    let x_start = (x.floor() as i32).max(0);
    let x_end = ((x + w).ceil() as i32).min(mask.width as i32);
    for py in y_start..y_end {
        for px in x_start..x_end {
            let d = rounded_box_distance(px as f64 + 0.5, py as f64 + 0.5, x, y, w, h, radius);
            apply(mask, px, py, (0.5 - d) as f32, paint);
        }
    }
}

/// Ring of `width` just inside the edge of a rounded rectangle.
pub fn stroke_rounded_rect(mask: &mut Mask, x: f64, y: f64, w: f64, h: f64, radius: f64, width: f64) {
    let mut ring = Mask::new(mask.width, mask.height);
    fill_rounded_rect(&mut ring, x, y, w, h, radius, Paint::Fill);
    fill_rounded_rect(
        &mut ring,
        x + width,
        y + width,
        w - 2.0 * width,
        h - 2.0 * width,
        (radius - width).max(0.0),
        Paint::Cut,
    );
    for (dst, src) in mask.data.iter_mut().zip(&ring.data) {
        *dst = (*dst).max(*src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexthumb_core::geometry::{regular_polygon_vertices, POINTY_TOP_ROTATION};

    fn square(x: f64, y: f64, size: f64) -> Vec<Point2D> {
        vec![
            Point2D::new(x, y),
            Point2D::new(x + size, y),
            Point2D::new(x + size, y + size),
            Point2D::new(x, y + size),
        ]
    }

    #[test]
    fn test_fill_axis_aligned_square_is_exact() {
        let mut mask = Mask::new(10, 10);
        fill_polygon(&mut mask, &square(2.0, 2.0, 4.0), Paint::Fill);
        assert_eq!(mask.covered_pixels(), 16);
        assert_eq!(mask.get(2, 2), 255);
        assert_eq!(mask.get(5, 5), 255);
        assert_eq!(mask.get(6, 6), 0);
    }

    #[test]
    fn test_fill_half_pixel_edge_is_partial() {
        let mut mask = Mask::new(10, 10);
        fill_polygon(&mut mask, &square(2.5, 2.0, 4.0), Paint::Fill);
        assert_eq!(mask.get(2, 3), 128);
        assert_eq!(mask.get(3, 3), 255);
        assert_eq!(mask.get(6, 3), 128);
    }

    #[test]
    fn test_cut_removes_coverage() {
        let mut mask = Mask::filled(10, 10, 255);
        fill_polygon(&mut mask, &square(0.0, 0.0, 5.0), Paint::Cut);
        assert_eq!(mask.get(1, 1), 0);
        assert_eq!(mask.get(7, 7), 255);
    }

    #[test]
    fn test_winding_order_does_not_matter() {
        let mut cw = Mask::new(10, 10);
        let mut ccw = Mask::new(10, 10);
        let pts = square(1.0, 1.0, 6.0);
        let reversed: Vec<_> = pts.iter().rev().copied().collect();
        fill_polygon(&mut cw, &pts, Paint::Fill);
        fill_polygon(&mut ccw, &reversed, Paint::Fill);
        assert_eq!(cw, ccw);
    }

    #[test]
    fn test_hexagon_area_close_to_analytic() {
        let r = 20.0;
        let hex = regular_polygon_vertices(Point2D::new(30.0, 30.0), r, 6, POINTY_TOP_ROTATION);
        let mut mask = Mask::new(60, 60);
        fill_polygon(&mut mask, &hex, Paint::Fill);
        let area: f64 = mask.data.iter().map(|&v| v as f64 / 255.0).sum();
        let expected = 3.0 * 3f64.sqrt() / 2.0 * r * r;
        assert!((area - expected).abs() / expected < 0.01);
    }

    #[test]
    fn test_offscreen_polygon_is_clipped() {
        let mut mask = Mask::new(10, 10);
        fill_polygon(&mut mask, &square(-20.0, -20.0, 25.0), Paint::Fill);
        assert_eq!(mask.get(0, 0), 255);
        assert_eq!(mask.get(4, 4), 255);
        assert_eq!(mask.get(5, 5), 0);
    }

    #[test]
    fn test_stroke_leaves_interior_empty() {
        let mut mask = Mask::new(40, 40);
        stroke_polygon(&mut mask, &square(5.0, 5.0, 30.0), 2.0);
        assert_eq!(mask.get(20, 20), 0);
        assert_eq!(mask.get(5, 20), 255);
        assert_eq!(mask.get(20, 5), 255);
    }

    #[test]
    fn test_rounded_rect_corners_are_clear() {
        let mut mask = Mask::new(100, 60);
        fill_rounded_rect(&mut mask, 0.0, 0.0, 100.0, 60.0, 10.0, Paint::Fill);
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(50, 30), 255);
        assert_eq!(mask.get(50, 0), 255);
        assert_eq!(mask.get(0, 30), 255);
    }

    #[test]
    fn test_rounded_rect_ring() {
        let mut mask = Mask::new(100, 60);
        stroke_rounded_rect(&mut mask, 0.0, 0.0, 100.0, 60.0, 10.0, 4.0);
        assert_eq!(mask.get(50, 1), 255);
        assert_eq!(mask.get(50, 30), 0);
    }

    #[test]
    fn test_disc() {
        let mut mask = Mask::new(21, 21);
        fill_disc(&mut mask, Point2D::new(10.5, 10.5), 5.0, Paint::Fill);
        assert_eq!(mask.get(10, 10), 255);
        assert_eq!(mask.get(0, 0), 0);
        assert_eq!(mask.get(10, 5), 128);
    }
}
