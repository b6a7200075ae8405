//! Minimal 5x7 bitmap face used when no font file is usable.
//!
//! Covers printable ASCII plus the bullet used as a separator. Lowercase
//! letters render as capitals; anything else renders as `?`. Glyphs are
//! defined on a 10-unit em: 7 units of cap height sitting on the baseline,
//! 1 unit of headroom above, 2 units of descent, 6-unit advance.

/// Em size in glyph units.
const EM_UNITS: f32 = 10.0;
const ASCENT_UNITS: f32 = 8.0;
const DESCENT_UNITS: f32 = 2.0;
const ADVANCE_UNITS: f32 = 6.0;
const GLYPH_COLS: usize = 5;
const GLYPH_ROWS: usize = 7;
/// Sub-samples per axis when rasterizing a scaled cell.
const SUPERSAMPLE: usize = 4;

/// Column-major bitmaps for U+0020..=U+0060 then U+007B..=U+007E;
/// bit 0 is the top row.
const ASCII: [[u8; GLYPH_COLS]; 69] = [
    [0x00, 0x00, 0x00, 0x00, 0x00], // ' '
    [0x00, 0x00, 0x5F, 0x00, 0x00], // !
    [0x00, 0x07, 0x00, 0x07, 0x00], // "
    [0x14, 0x7F, 0x14, 0x7F, 0x14], // #
    [0x24, 0x2A, 0x7F, 0x2A, 0x12], // $
    [0x23, 0x13, 0x08, 0x64, 0x62], // %
    [0x36, 0x49, 0x55, 0x22, 0x50], // &
    [0x00, 0x05, 0x03, 0x00, 0x00], // '
    [0x00, 0x1C, 0x22, 0x41, 0x00], // (
    [0x00, 0x41, 0x22, 0x1C, 0x00], // )
    [0x08, 0x2A, 0x1C, 0x2A, 0x08], // *
    [0x08, 0x08, 0x3E, 0x08, 0x08], // +
    [0x00, 0x50, 0x30, 0x00, 0x00], // ,
    [0x08, 0x08, 0x08, 0x08, 0x08], // -
    [0x00, 0x60, 0x60, 0x00, 0x00], // .
    [0x20, 0x10, 0x08, 0x04, 0x02], // /
    [0x3E, 0x51, 0x49, 0x45, 0x3E], // 0
    [0x00, 0x42, 0x7F, 0x40, 0x00], // 1
    [0x42, 0x61, 0x51, 0x49, 0x46], // 2
    [0x21, 0x41, 0x45, 0x4B, 0x31], // 3
    [0x18, 0x14, 0x12, 0x7F, 0x10], // 4
    [0x27, 0x45, 0x45, 0x45, 0x39], // 5
    [0x3C, 0x4A, 0x49, 0x49, 0x30], // 6
    [0x01, 0x71, 0x09, 0x05, 0x03], // 7
    [0x36, 0x49, 0x49, 0x49, 0x36], // 8
    [0x06, 0x49, 0x49, 0x29, 0x1E], // 9
    [0x00, 0x36, 0x36, 0x00, 0x00], // :
    [0x00, 0x56, 0x36, 0x00, 0x00], // ;
    [0x00, 0x08, 0x14, 0x22, 0x41], // <
    [0x14, 0x14, 0x14, 0x14, 0x14], // =
    [0x41, 0x22, 0x14, 0x08, 0x00], // >
    [0x02, 0x01, 0x51, 0x09, 0x06], // ?
    [0x32, 0x49, 0x79, 0x41, 0x3E], // @
    [0x7E, 0x11, 0x11, 0x11, 0x7E], // A
    [0x7F, 0x49, 0x49, 0x49, 0x36], // B
    [0x3E, 0x41, 0x41, 0x41, 0x22], // C
    [0x7F, 0x41, 0x41, 0x22, 0x1C], // D
    [0x7F, 0x49, 0x49, 0x49, 0x41], // E
    [0x7F, 0x09, 0x09, 0x01, 0x01], // F
    [0x3E, 0x41, 0x41, 0x51, 0x32], // G
    [0x7F, 0x08, 0x08, 0x08, 0x7F], // H
    [0x00, 0x41, 0x7F, 0x41, 0x00], // I
    [0x20, 0x40, 0x41, 0x3F, 0x01], // J
    [0x7F, 0x08, 0x14, 0x22, 0x41], // K
    [0x7F, 0x40, 0x40, 0x40, 0x40], // L
    [0x7F, 0x02, 0x04, 0x02, 0x7F], // M
    [0x7F, 0x04, 0x08, 0x10, 0x7F], // N
    [0x3E, 0x41, 0x41, 0x41, 0x3E], // O
    [0x7F, 0x09, 0x09, 0x09, 0x06], // P
    [0x3E, 0x41, 0x51, 0x21, 0x5E], // Q
    [0x7F, 0x09, 0x19, 0x29, 0x46], // R
    [0x46, 0x49, 0x49, 0x49, 0x31], // S
    [0x01, 0x01, 0x7F, 0x01, 0x01], // T
    [0x3F, 0x40, 0x40, 0x40, 0x3F], // U
    [0x1F, 0x20, 0x40, 0x20, 0x1F], // V
    [0x7F, 0x20, 0x18, 0x20, 0x7F], // W
    [0x63, 0x14, 0x08, 0x14, 0x63], // X
    [0x03, 0x04, 0x78, 0x04, 0x03], // Y
    [0x61, 0x51, 0x49, 0x45, 0x43], // Z
    [0x00, 0x00, 0x7F, 0x41, 0x41], // [
    [0x02, 0x04, 0x08, 0x10, 0x20], // backslash
    [0x41, 0x41, 0x7F, 0x00, 0x00], // ]
    [0x04, 0x02, 0x01, 0x02, 0x04], // ^
    [0x40, 0x40, 0x40, 0x40, 0x40], // _
    [0x00, 0x01, 0x02, 0x04, 0x00], // `
    [0x00, 0x08, 0x36, 0x41, 0x00], // {
    [0x00, 0x00, 0x7F, 0x00, 0x00], // |
    [0x00, 0x41, 0x36, 0x08, 0x00], // }
    [0x02, 0x01, 0x02, 0x04, 0x02], // ~
];

const BULLET: [u8; GLYPH_COLS] = [0x00, 0x1C, 0x1C, 0x1C, 0x00];

fn bitmap(ch: char) -> &'static [u8; GLYPH_COLS] {
    match ch {
        '\u{2022}' | '\u{00B7}' => &BULLET,
        ' '..='`' => &ASCII[ch as usize - 0x20],
        'a'..='z' => &ASCII[ch.to_ascii_uppercase() as usize - 0x20],
        '{'..='~' => &ASCII[ch as usize - 0x7B + 65],
        _ => &ASCII['?' as usize - 0x20],
    }
}

fn unit(px: f32) -> f32 {
    px / EM_UNITS
}

pub fn ascent(px: f32) -> f32 {
    ASCENT_UNITS * unit(px)
}

pub fn descent(px: f32) -> f32 {
    DESCENT_UNITS * unit(px)
}

pub fn advance(px: f32) -> f32 {
    ADVANCE_UNITS * unit(px)
}

/// Coverage raster of one glyph, `(width, height, coverage)`.
///
/// The raster's bottom edge sits on the baseline and its left edge on the
/// pen position.
pub fn rasterize(ch: char, px: f32) -> (usize, usize, Vec<u8>) {
    let u = unit(px);
    let width = (GLYPH_COLS as f32 * u).ceil().max(1.0) as usize;
    let height = (GLYPH_ROWS as f32 * u).ceil().max(1.0) as usize;
    let columns = bitmap(ch);
    let lit = |gx: f32, gy: f32| -> bool {
        let col = (gx / u) as usize;
        let row = (gy / u) as usize;
        col < GLYPH_COLS && row < GLYPH_ROWS && columns[col] & (1 << row) != 0
    };

    let step = 1.0 / SUPERSAMPLE as f32;
    let full = (SUPERSAMPLE * SUPERSAMPLE) as u32;
    let mut coverage = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut hits = 0u32;
            for sy in 0..SUPERSAMPLE {
                for sx in 0..SUPERSAMPLE {
                    let gx = x as f32 + (sx as f32 + 0.5) * step;
                    let gy = y as f32 + (sy as f32 + 0.5) * step;
                    if lit(gx, gy) {
                        hits += 1;
                    }
                }
            }
            coverage[y * width + x] = ((hits * 255 + full / 2) / full) as u8;
        }
    }
    (width, height, coverage)
}
