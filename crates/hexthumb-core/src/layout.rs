//! Layout configuration: every position, size, budget and color that
//! parameterizes one visual style of the thumbnail.
//!
//! Named presets cover the supported styles. A TOML file can pick a preset
//! and override any subset of its values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ThumbError, ThumbResult};
use crate::geometry::{HexLattice, Rect};
use crate::text::DescriptionEllipsis;
use crate::Color;

/// The built-in visual styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LayoutPreset {
    /// Honeycomb poster, outlined title, comma-separated genres.
    #[default]
    Classic,
    /// Adds translucent synopsis and character cards and a meta line.
    Cards,
    /// Genres drawn as individual rounded chips.
    Pills,
}

impl LayoutPreset {
    pub const ALL: [LayoutPreset; 3] = [LayoutPreset::Classic, LayoutPreset::Cards, LayoutPreset::Pills];

    pub fn name(&self) -> &'static str {
        match self {
            LayoutPreset::Classic => "classic",
            LayoutPreset::Cards => "cards",
            LayoutPreset::Pills => "pills",
        }
    }
}

impl fmt::Display for LayoutPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutPreset {
    type Err = ThumbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LayoutPreset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| ThumbError::Config(format!("unknown layout preset '{}'", s)))
    }
}

/// How the genre list is presented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenreStyle {
    /// One line of text joined with `separator`.
    Joined { separator: String },
    /// One rounded chip per genre, no separator text.
    Pills,
}

/// Format of the rating label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingStyle {
    /// "8.4+ Rating"
    Plus,
    /// "8.4/10"
    OutOfTen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub background: Color,
    pub hex_outline: Color,
    pub text: Color,
    pub subtext: Color,
    pub genre: Color,
    pub text_outline: Color,
    pub button: Color,
    pub button_text: Color,
    pub logo: Color,
    pub honeycomb_outline: Color,
    pub placeholder: Color,
    pub placeholder_border: Color,
    pub card: Color,
    pub card_border: Color,
    pub chip: Color,
}

/// Pixel sizes per logical font role, before `scale` is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSizes {
    pub title: f32,
    pub bold: f32,
    pub medium: f32,
    pub regular: f32,
    pub genre: f32,
    pub logo: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBudgets {
    pub title_max_chars: usize,
    pub title_max_width: f32,
    pub title_max_lines: usize,
    /// Character budget for the last title line when lines were dropped.
    pub title_overflow_chars: usize,
    pub description_max_words: usize,
    pub description_max_width: f32,
    pub description_max_lines: usize,
    pub description_overflow_chars: usize,
    pub description_ellipsis: DescriptionEllipsis,
    pub genre_count: usize,
}

/// Vertical placement of the left text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub padding: i32,
    pub logo_y: i32,
    pub rating_y: i32,
    /// Season/studio/status line; omitted when None.
    pub meta_y: Option<i32>,
    pub title_y: i32,
    pub title_line_pitch: i32,
    /// Genre line offset below the last title line slot.
    pub genre_gap: i32,
    /// Description offset below the last title line slot.
    pub description_gap: i32,
    pub description_line_pitch: i32,
    pub title_outline: u32,
    pub body_outline: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoConfig {
    pub label: String,
    /// Half-diagonal of each diamond in the mark.
    pub diamond: i32,
    pub stroke: f32,
    pub label_offset_x: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub labels: Vec<String>,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub spacing: i32,
    pub radius: f32,
    pub label_offset_y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosterConfig {
    /// Left edge of the poster slot on the canvas.
    pub start_x: i32,
    /// How far the slot extends past the right canvas edge.
    pub overhang: u32,
    /// Only cells whose canvas-space center lies right of this are kept.
    pub min_center_x: f64,
    pub outline_width: f32,
    pub lattice: HexLattice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    pub outline_width: f32,
    pub lattice: HexLattice,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderConfig {
    pub label: String,
    pub border_width: u32,
    pub border_inset: u32,
}

/// Translucent rounded card behind the description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynopsisCard {
    pub padding: i32,
    pub radius: f32,
}

/// Card with the lead character's name and a short bio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterCard {
    pub radius: f32,
    pub heading: String,
    pub bio_words: usize,
    pub max_lines: usize,
    pub line_pitch: i32,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetOverrides {
    /// Pre-rendered background, resized to the canvas when present.
    pub background: Option<PathBuf>,
    /// Pre-rendered poster placeholder, cover-fit to the poster slot.
    pub placeholder: Option<PathBuf>,
}

/// Every constant of one layout.
///
/// Scalar fields precede nested tables so the struct serializes as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub preset: LayoutPreset,
    pub width: u32,
    pub height: u32,
    pub rating_style: RatingStyle,
    pub fetch_timeout_secs: u64,
    pub palette: Palette,
    pub fonts: FontSizes,
    pub budgets: TextBudgets,
    pub genre_style: GenreStyle,
    pub text: TextPlacement,
    pub logo: LogoConfig,
    pub buttons: ButtonConfig,
    pub poster: PosterConfig,
    pub background: BackgroundConfig,
    pub placeholder: PlaceholderConfig,
    pub synopsis_card: Option<SynopsisCard>,
    pub character_card: Option<CharacterCard>,
    #[serde(default)]
    pub assets: AssetOverrides,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::preset(LayoutPreset::Classic)
    }
}

impl LayoutConfig {
    /// The full configuration for a named preset.
    pub fn preset(preset: LayoutPreset) -> Self {
        match preset {
            LayoutPreset::Classic => classic(),
            LayoutPreset::Cards => cards(),
            LayoutPreset::Pills => pills(),
        }
    }

    /// Width and height of the poster slot.
    pub fn poster_size(&self) -> (u32, u32) {
        let width = (self.width as i64 - self.poster.start_x as i64 + self.poster.overhang as i64)
            .max(1) as u32;
        (width, self.height)
    }

    /// Pixel size for a role after scaling.
    pub fn scaled(&self, size: f32) -> f32 {
        (size * self.fonts.scale).max(1.0)
    }

    /// Reject configurations that cannot produce a sensible image.
    pub fn validate(&self) -> ThumbResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ThumbError::Config("canvas size must be non-zero".into()));
        }
        if self.fonts.scale <= 0.0 || !self.fonts.scale.is_finite() {
            return Err(ThumbError::Config("font scale must be positive".into()));
        }
        if self.budgets.title_max_lines == 0 || self.budgets.description_max_lines == 0 {
            return Err(ThumbError::Config("line caps must be at least 1".into()));
        }
        if self.poster.lattice.radius <= 0.0 || self.background.lattice.radius <= 0.0 {
            return Err(ThumbError::Config("hexagon radius must be positive".into()));
        }
        Ok(())
    }

    /// Load a layout from TOML.
    ///
    /// The optional top-level `preset` key selects the base layout; every
    /// other key overrides the matching value of that preset.
    pub fn load_from_file(path: &Path) -> ThumbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
            .map_err(|e| ThumbError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse a layout from TOML text; see [`LayoutConfig::load_from_file`].
    pub fn from_toml_str(contents: &str) -> ThumbResult<Self> {
        let overrides: toml::Table = toml::from_str(contents)
            .map_err(|e| ThumbError::Config(format!("invalid TOML: {}", e)))?;

        let preset = match overrides.get("preset") {
            Some(toml::Value::String(name)) => name.parse()?,
            Some(_) => return Err(ThumbError::Config("`preset` must be a string".into())),
            None => LayoutPreset::default(),
        };

        let base = toml::Value::try_from(Self::preset(preset))
            .map_err(|e| ThumbError::Config(format!("cannot serialize preset: {}", e)))?;
        let merged = match base {
            toml::Value::Table(mut table) => {
                merge_tables(&mut table, overrides);
                toml::Value::Table(table)
            }
            other => other,
        };

        let config: LayoutConfig = merged
            .try_into()
            .map_err(|e| ThumbError::Config(format!("invalid layout: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the layout as pretty TOML.
    pub fn save_to_file(&self, path: &Path) -> ThumbResult<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn to_toml_string(&self) -> ThumbResult<String> {
        toml::to_string_pretty(self).map_err(|e| ThumbError::Config(e.to_string()))
    }
}

/// Deep-merge `overrides` into `base`; nested tables merge key by key.
fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

fn classic() -> LayoutConfig {
    LayoutConfig {
        preset: LayoutPreset::Classic,
        width: 1280,
        height: 720,
        palette: Palette {
            background: Color::rgb8(15, 25, 45),
            hex_outline: Color::rgb8(35, 50, 80),
            text: Color::WHITE,
            subtext: Color::rgb8(200, 210, 220),
            genre: Color::rgb8(150, 160, 180),
            text_outline: Color::BLACK,
            button: Color::rgb8(35, 55, 95),
            button_text: Color::WHITE,
            logo: Color::WHITE,
            honeycomb_outline: Color::WHITE,
            placeholder: Color::rgb8(25, 35, 60),
            placeholder_border: Color::rgb8(70, 90, 130),
            card: Color::rgba8(10, 18, 34, 190),
            card_border: Color::rgba8(90, 120, 170, 200),
            chip: Color::rgb8(35, 55, 95),
        },
        fonts: FontSizes {
            title: 110.0,
            bold: 40.0,
            medium: 34.0,
            regular: 28.0,
            genre: 36.0,
            logo: 32.0,
            scale: 1.0,
        },
        budgets: TextBudgets {
            title_max_chars: 45,
            title_max_width: 600.0,
            title_max_lines: 2,
            title_overflow_chars: 30,
            description_max_words: 35,
            description_max_width: 550.0,
            description_max_lines: 4,
            description_overflow_chars: 60,
            description_ellipsis: DescriptionEllipsis::WhenTruncated,
            genre_count: 3,
        },
        genre_style: GenreStyle::Joined {
            separator: ", ".into(),
        },
        rating_style: RatingStyle::Plus,
        text: TextPlacement {
            padding: 50,
            logo_y: 40,
            rating_y: 120,
            meta_y: None,
            title_y: 170,
            title_line_pitch: 100,
            genre_gap: 10,
            description_gap: 65,
            description_line_pitch: 38,
            title_outline: 3,
            body_outline: 2,
        },
        logo: LogoConfig {
            label: "ANIME FLICKER".into(),
            diamond: 16,
            stroke: 3.0,
            label_offset_x: 60,
        },
        buttons: ButtonConfig {
            labels: vec!["DOWNLOAD".into(), "JOIN NOW".into()],
            y: 610,
            width: 200,
            height: 60,
            spacing: 30,
            radius: 10.0,
            label_offset_y: 10,
        },
        poster: PosterConfig {
            start_x: 580,
            overhang: 100,
            lattice: HexLattice::new(160.0).with_gap(8.0),
            min_center_x: 650.0,
            outline_width: 6.0,
        },
        background: BackgroundConfig {
            lattice: HexLattice::new(55.0),
            outline_width: 2.0,
        },
        placeholder: PlaceholderConfig {
            label: "NO IMAGE".into(),
            border_width: 4,
            border_inset: 4,
        },
        synopsis_card: None,
        character_card: None,
        assets: AssetOverrides::default(),
        fetch_timeout_secs: 10,
    }
}

fn cards() -> LayoutConfig {
    let mut c = classic();
    c.preset = LayoutPreset::Cards;
    c.fonts.title = 90.0;
    c.fonts.regular = 26.0;
    c.fonts.genre = 30.0;
    c.budgets.title_max_chars = 40;
    c.budgets.title_max_width = 560.0;
    c.budgets.description_max_words = 45;
    c.budgets.description_max_width = 520.0;
    c.budgets.description_max_lines = 5;
    c.budgets.genre_count = 5;
    c.genre_style = GenreStyle::Joined {
        separator: " \u{2022} ".into(),
    };
    c.rating_style = RatingStyle::OutOfTen;
    c.text.rating_y = 100;
    c.text.meta_y = Some(135);
    c.text.title_y = 175;
    c.text.title_line_pitch = 85;
    c.text.genre_gap = 5;
    c.text.description_gap = 60;
    c.text.description_line_pitch = 34;
    c.synopsis_card = Some(SynopsisCard {
        padding: 16,
        radius: 14.0,
    });
    c.character_card = Some(CharacterCard {
        rect: Rect::new(880, 480, 370, 210),
        radius: 16.0,
        heading: "CHARACTER".into(),
        bio_words: 28,
        max_lines: 3,
        line_pitch: 30,
    });
    c
}

fn pills() -> LayoutConfig {
    let mut c = classic();
    c.preset = LayoutPreset::Pills;
    c.fonts.genre = 24.0;
    c.budgets.genre_count = 4;
    c.budgets.description_max_words = 30;
    c.budgets.description_max_lines = 3;
    c.genre_style = GenreStyle::Pills;
    c.rating_style = RatingStyle::OutOfTen;
    c.text.genre_gap = 14;
    c.text.description_gap = 75;
    c
}
