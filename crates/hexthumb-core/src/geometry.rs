//! Geometry primitives and the hexagon lattice used for backgrounds and
//! poster clipping.

use serde::{Deserialize, Serialize};

/// A 2D point in raster space (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Translate by an offset.
    pub fn offset(&self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::zero()
    }
}

/// An integer pixel rectangle: origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Vertices of a regular polygon.
///
/// Returns `sides` points spaced `360 / sides` degrees apart, the first at
/// `rotation_deg` measured from the positive x axis. With y pointing down a
/// positive angle turns clockwise on screen.
pub fn regular_polygon_vertices(
    center: Point2D,
    radius: f64,
    sides: usize,
    rotation_deg: f64,
) -> Vec<Point2D> {
    let step = 360.0 / sides as f64;
    (0..sides)
        .map(|i| {
            let angle = (rotation_deg + step * i as f64).to_radians();
            Point2D::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Rotation giving pointy-top hexagons, which tile on the brick lattice below.
pub const POINTY_TOP_ROTATION: f64 = 30.0;

/// A brick-offset lattice of pointy-top hexagons.
///
/// Centers sit `sqrt(3) * radius` apart horizontally and `1.5 * radius`
/// vertically; odd rows shift right by half a column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HexLattice {
    /// Circumradius used to space the lattice.
    pub radius: f64,
    /// Amount subtracted from the radius of each emitted cell.
    #[serde(default)]
    pub gap: f64,
}

impl HexLattice {
    pub fn new(radius: f64) -> Self {
        Self { radius, gap: 0.0 }
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Horizontal distance between neighbouring centers in a row.
    pub fn column_spacing(&self) -> f64 {
        3f64.sqrt() * self.radius
    }

    /// Vertical distance between rows.
    pub fn row_spacing(&self) -> f64 {
        1.5 * self.radius
    }

    /// Radius each cell is drawn with.
    pub fn cell_radius(&self) -> f64 {
        (self.radius - self.gap).max(0.0)
    }

    /// Cell centers covering a `width` x `height` area.
    ///
    /// Rows and columns run from -1 to one past the last cell that starts
    /// inside the area, so no cell edge is visible at any boundary.
    pub fn centers(&self, width: f64, height: f64) -> Vec<Point2D> {
        if self.radius <= 0.0 {
            return Vec::new();
        }
        let dx = self.column_spacing();
        let dy = self.row_spacing();
        let cols = (width / dx).ceil() as i64 + 1;
        let rows = (height / dy).ceil() as i64 + 1;

        let mut out = Vec::with_capacity(((cols + 2) * (rows + 2)).max(0) as usize);
        for row in -1..=rows {
            let shift = if row.rem_euclid(2) == 1 { dx / 2.0 } else { 0.0 };
            for col in -1..=cols {
                out.push(Point2D::new(col as f64 * dx + shift, row as f64 * dy));
            }
        }
        out
    }

    /// Hexagon outlines for every center whose x exceeds `min_center_x`.
    pub fn cells(&self, width: f64, height: f64, min_center_x: Option<f64>) -> Vec<Vec<Point2D>> {
        let r = self.cell_radius();
        self.centers(width, height)
            .into_iter()
            .filter(|c| min_center_x.map_or(true, |min| c.x > min))
            .map(|c| regular_polygon_vertices(c, r, 6, POINTY_TOP_ROTATION))
            .collect()
    }
}
