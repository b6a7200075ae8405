//! Mask construction and layer compositing.

use hexthumb_core::{FrameBuffer, HexLattice, Mask, Point2D};

use crate::raster::{self, Paint};

/// A polygon and whether it adds coverage (`true`) or cuts it out.
pub type MaskPolygon = (Vec<Point2D>, bool);

/// Rasterize `polygons` in order into an initially empty mask.
pub fn build_polygon_mask(width: u32, height: u32, polygons: &[MaskPolygon]) -> Mask {
    let mut mask = Mask::new(width, height);
    for (points, fill) in polygons {
        let paint = if *fill { Paint::Fill } else { Paint::Cut };
        raster::fill_polygon(&mut mask, points, paint);
    }
    mask
}

/// Outline coverage of every polygon, `stroke_width` pixels wide.
pub fn build_outline_mask(width: u32, height: u32, polygons: &[Vec<Point2D>], stroke_width: f64) -> Mask {
    let mut mask = Mask::new(width, height);
    for points in polygons {
        raster::stroke_polygon(&mut mask, points, stroke_width);
    }
    mask
}

/// A mask covering the whole `width` x `height` box with rounded corners.
pub fn build_rounded_rect_mask(width: u32, height: u32, radius: f64) -> Mask {
    let mut mask = Mask::new(width, height);
    raster::fill_rounded_rect(&mut mask, 0.0, 0.0, width as f64, height as f64, radius, Paint::Fill);
    mask
}

/// Alpha-blend `layer` onto `canvas` with its top-left at `origin`.
///
/// With a mask (in layer coordinates), canvas pixels where the mask is zero
/// are left untouched.
pub fn composite_layer(canvas: &mut FrameBuffer, layer: &FrameBuffer, origin: (i32, i32), mask: Option<&Mask>) {
    match mask {
        Some(mask) => canvas.composite_masked(layer, origin.0, origin.1, mask),
        None => canvas.composite_over(layer, origin.0, origin.1),
    }
}

/// Hexagon cells of `lattice` in layer-local coordinates.
///
/// Centers are laid out over the whole canvas so the cell pattern lines up
/// with the canvas, then shifted by `-layer_origin`. Only cells whose
/// canvas-space center x exceeds `min_center_x` are kept. Each cell uses
/// the lattice's gap-reduced radius.
pub fn honeycomb_cells(
    lattice: &HexLattice,
    canvas: (u32, u32),
    layer_origin: (i32, i32),
    min_center_x: Option<f64>,
) -> Vec<Vec<Point2D>> {
    let (ox, oy) = (layer_origin.0 as f64, layer_origin.1 as f64);
    lattice
        .cells(canvas.0 as f64, canvas.1 as f64, min_center_x)
        .into_iter()
        .map(|cell| cell.into_iter().map(|p| p.offset(-ox, -oy)).collect())
        .collect()
}
