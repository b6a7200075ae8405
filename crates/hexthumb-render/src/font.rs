//! Font resolution: a fonts directory is classified once into a [`FontBook`]
//! that maps each logical role to a face, falling back through related
//! weights and finally to the built-in bitmap face.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fontdue::{Font, FontSettings};
use hexthumb_core::{TextMeasure, ThumbError, ThumbResult};

use crate::builtin_font;

/// What a piece of text is used for on the thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Title,
    Bold,
    Medium,
    Regular,
    Genre,
    Logo,
}

impl FontRole {
    pub const ALL: [FontRole; 6] = [
        FontRole::Title,
        FontRole::Bold,
        FontRole::Medium,
        FontRole::Regular,
        FontRole::Genre,
        FontRole::Logo,
    ];

    /// Categories tried in order when resolving this role.
    pub fn fallback_chain(&self) -> &'static [FontCategory] {
        use FontCategory::*;
        match self {
            FontRole::Title => &[Display, Bold, Medium, Regular],
            FontRole::Bold | FontRole::Genre => &[Bold, Medium, Regular],
            FontRole::Medium | FontRole::Logo => &[Medium, Regular, Bold],
            FontRole::Regular => &[Regular, Light, Medium],
        }
    }
}

impl fmt::Display for FontRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FontRole::Title => "title",
            FontRole::Bold => "bold",
            FontRole::Medium => "medium",
            FontRole::Regular => "regular",
            FontRole::Genre => "genre",
            FontRole::Logo => "logo",
        };
        f.write_str(name)
    }
}

/// Weight/style bucket derived from a font file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontCategory {
    Display,
    Bold,
    Medium,
    Light,
    Regular,
}

impl FontCategory {
    /// Classify a font file by name, e.g. `BebasNeue-Regular.ttf` is Display.
    pub fn classify(file_name: &str) -> Self {
        let name = file_name.to_ascii_lowercase();
        let has = |keys: &[&str]| keys.iter().any(|k| name.contains(k));
        if has(&["bebas", "anton", "oswald", "impact"]) {
            FontCategory::Display
        } else if has(&["bold", "black", "heavy", "semibold"]) {
            FontCategory::Bold
        } else if has(&["medium"]) {
            FontCategory::Medium
        } else if has(&["light", "thin"]) {
            FontCategory::Light
        } else {
            FontCategory::Regular
        }
    }
}

/// Name fragments of faces unsuited to running text: slanted, fixed-pitch
/// and special-purpose fonts.
const SECONDARY_STYLES: &[&str] = &["italic", "oblique", "mono", "math", "symbol", "emoji", "dingbat"];

/// Ordering key within a category: plain faces first, then by file name.
pub fn style_rank(file_name: &str) -> (bool, String) {
    let name = file_name.to_ascii_lowercase();
    let secondary = SECONDARY_STYLES.iter().any(|k| name.contains(k));
    (secondary, name)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// A parsed face: an outline font from disk or the built-in bitmap face.
pub enum Face {
    Outline { font: Font, path: PathBuf },
    Builtin,
}

impl fmt::Debug for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Face::Outline { path, .. } => f.debug_tuple("Outline").field(path).finish(),
            Face::Builtin => f.write_str("Builtin"),
        }
    }
}

impl Face {
    /// Parse an outline font from a file.
    pub fn from_file(path: &Path) -> ThumbResult<Self> {
        let data = std::fs::read(path)
            .map_err(|e| ThumbError::asset(format!("failed to read font file: {}", e), path))?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            ThumbError::Font(format!("failed to parse font {}: {}", path.display(), e))
        })?;
        Ok(Face::Outline {
            font,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Face::Outline { path, .. } => Some(path),
            Face::Builtin => None,
        }
    }
}

/// One rasterized glyph, positioned relative to the pen on the baseline.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    /// Offset from the pen to the bitmap's left edge.
    pub xmin: i32,
    /// Offset from the baseline to the bitmap's top edge (negative is up).
    pub top: i32,
    pub width: usize,
    pub height: usize,
    pub coverage: Vec<u8>,
}

/// A face at one pixel size. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FontHandle {
    face: Arc<Face>,
    px: f32,
}

impl FontHandle {
    pub fn px(&self) -> f32 {
        self.px
    }

    pub fn face(&self) -> &Face {
        &self.face
    }

    pub fn is_builtin(&self) -> bool {
        matches!(*self.face, Face::Builtin)
    }

    /// Distance from the top of the line box to the baseline.
    pub fn ascent(&self) -> f32 {
        match &*self.face {
            Face::Outline { font, .. } => font
                .horizontal_line_metrics(self.px)
                .map(|m| m.ascent)
                .unwrap_or(self.px * 0.8),
            Face::Builtin => builtin_font::ascent(self.px),
        }
    }

    /// Distance from the baseline to the bottom of the line box.
    pub fn descent(&self) -> f32 {
        match &*self.face {
            Face::Outline { font, .. } => font
                .horizontal_line_metrics(self.px)
                .map(|m| -m.descent)
                .unwrap_or(self.px * 0.2),
            Face::Builtin => builtin_font::descent(self.px),
        }
    }

    pub fn line_height(&self) -> f32 {
        self.ascent() + self.descent()
    }

    fn advance(&self, ch: char) -> f32 {
        match &*self.face {
            Face::Outline { font, .. } => font.metrics(ch, self.px).advance_width,
            Face::Builtin => builtin_font::advance(self.px),
        }
    }

    fn kern(&self, left: char, right: char) -> f32 {
        match &*self.face {
            Face::Outline { font, .. } => font.horizontal_kern(left, right, self.px).unwrap_or(0.0),
            Face::Builtin => 0.0,
        }
    }

    /// Pen x position of every character of `text`, plus the final advance.
    pub fn layout(&self, text: &str) -> (Vec<(char, f32)>, f32) {
        let mut pen = 0.0f32;
        let mut placed = Vec::with_capacity(text.len());
        let mut prev: Option<char> = None;
        for ch in text.chars() {
            if let Some(p) = prev {
                pen += self.kern(p, ch);
            }
            placed.push((ch, pen));
            pen += self.advance(ch);
            prev = Some(ch);
        }
        (placed, pen)
    }

    pub fn rasterize(&self, ch: char) -> GlyphBitmap {
        match &*self.face {
            Face::Outline { font, .. } => {
                let (metrics, coverage) = font.rasterize(ch, self.px);
                GlyphBitmap {
                    xmin: metrics.xmin,
                    top: -(metrics.height as i32 + metrics.ymin),
                    width: metrics.width,
                    height: metrics.height,
                    coverage,
                }
            }
            Face::Builtin => {
                let (width, height, coverage) = builtin_font::rasterize(ch, self.px);
                GlyphBitmap {
                    xmin: 0,
                    top: -(height as i32),
                    width,
                    height,
                    coverage,
                }
            }
        }
    }
}

impl TextMeasure for FontHandle {
    fn measure(&self, text: &str) -> (f32, f32) {
        (self.layout(text).1, self.line_height())
    }
}

/// Role -> face mapping, resolved once and shared read-only.
#[derive(Debug, Clone)]
pub struct FontBook {
    faces: HashMap<FontRole, Arc<Face>>,
}

impl FontBook {
    /// Every role served by the built-in bitmap face.
    pub fn builtin() -> Self {
        let face = Arc::new(Face::Builtin);
        Self {
            faces: FontRole::ALL.iter().map(|r| (*r, face.clone())).collect(),
        }
    }

    /// Classify the `.ttf`/`.otf` files directly inside `dir` and resolve
    /// every role. Within a category plain faces are tried before italic,
    /// monospace and special-purpose ones. A missing or unusable directory degrades to the built-in
    /// face; this never fails.
    pub fn load(dir: &Path) -> Self {
        let mut files = match list_font_files(dir) {
            Ok(files) => files,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "fonts directory unavailable, using built-in font");
                return Self::builtin();
            }
        };
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no font files found, using built-in font");
            return Self::builtin();
        }
        files.sort_by_cached_key(|path| style_rank(&file_name(path)));

        let mut by_category: HashMap<FontCategory, Vec<PathBuf>> = HashMap::new();
        for path in files {
            by_category.entry(FontCategory::classify(&file_name(&path))).or_default().push(path);
        }

        // Parse each file at most once; a failure is logged once and remembered.
        let mut parsed: HashMap<PathBuf, Option<Arc<Face>>> = HashMap::new();
        let builtin = Arc::new(Face::Builtin);
        let mut faces = HashMap::new();

        for role in FontRole::ALL {
            let resolved = role
                .fallback_chain()
                .iter()
                .flat_map(|cat| by_category.get(cat).into_iter().flatten())
                .find_map(|path| {
                    parsed
                        .entry(path.clone())
                        .or_insert_with(|| match Face::from_file(path) {
                            Ok(face) => Some(Arc::new(face)),
                            Err(e) => {
                                tracing::warn!(error = %e, "skipping unusable font file");
                                None
                            }
                        })
                        .clone()
                });

            let face = resolved.unwrap_or_else(|| {
                tracing::warn!(%role, "no usable font for role, using built-in font");
                builtin.clone()
            });
            tracing::debug!(%role, source = ?face.path(), "resolved font");
            faces.insert(role, face);
        }

        Self { faces }
    }

    /// Handle for `role` at `px` pixels.
    pub fn handle(&self, role: FontRole, px: f32) -> FontHandle {
        let face = self
            .faces
            .get(&role)
            .cloned()
            .unwrap_or_else(|| Arc::new(Face::Builtin));
        FontHandle {
            face,
            px: px.max(1.0),
        }
    }

    /// File serving `role`, or None for the built-in face.
    pub fn source(&self, role: FontRole) -> Option<&Path> {
        self.faces.get(&role).and_then(|f| f.path())
    }
}

fn list_font_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"));
        if is_font && path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}
