//! Single-channel coverage rasters used to gate compositing.

/// An 8-bit coverage mask. 0 = fully outside, 255 = fully inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Mask {
    /// A zeroed mask.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; width as usize * height as usize],
        }
    }

    /// A mask with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Coverage at (x, y); zero outside the mask.
    pub fn get(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.data[i])
    }

    pub fn set(&mut self, x: i32, y: i32, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = value;
        }
    }

    /// Union: keep the larger of the existing and new coverage.
    pub fn raise(&mut self, x: i32, y: i32, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = self.data[i].max(value);
        }
    }

    /// Cut-out: remove `value` worth of coverage.
    pub fn lower(&mut self, x: i32, y: i32, value: u8) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = self.data[i].saturating_sub(value);
        }
    }

    /// Number of pixels with any coverage.
    pub fn covered_pixels(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_bounds() {
        let mut m = Mask::new(3, 2);
        m.set(2, 1, 200);
        m.set(3, 0, 255);
        m.set(-1, 0, 255);
        assert_eq!(m.get(2, 1), 200);
        assert_eq!(m.get(3, 0), 0);
        assert_eq!(m.covered_pixels(), 1);
    }

    #[test]
    fn test_raise_and_lower() {
        let mut m = Mask::filled(1, 1, 100);
        m.raise(0, 0, 50);
        assert_eq!(m.get(0, 0), 100);
        m.raise(0, 0, 180);
        assert_eq!(m.get(0, 0), 180);
        m.lower(0, 0, 255);
        assert_eq!(m.get(0, 0), 0);
    }
}
