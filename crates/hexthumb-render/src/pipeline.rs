//! The thumbnail pipeline: normalized metadata in, encoded PNG out.

use hexthumb_core::hash::{hash_frame, ContentHash};
use hexthumb_core::layout::{GenreStyle, LayoutConfig};
use hexthumb_core::normalize::{normalize, CharacterBlurb, DisplayMetadata};
use hexthumb_core::text::{cap_lines, wrap_to_width};
use hexthumb_core::{Color, FrameBuffer, Mask, MediaRecord, Point2D, Rect, TextMeasure, ThumbResult};

use crate::background::build_background;
use crate::compositor::{
    build_outline_mask, build_polygon_mask, build_rounded_rect_mask, composite_layer, honeycomb_cells,
};
use crate::encode::PngEncoder;
use crate::fetch::ImageFetcher;
use crate::font::{FontBook, FontHandle, FontRole};
use crate::image_loader::{cover_fit, load_image_from_bytes};
use crate::placeholder::resolve_placeholder;
use crate::raster;
use crate::text::{aligned_x, draw_outlined_text, draw_text, TextAlign};

/// Horizontal padding inside a genre chip.
const CHIP_PADDING_X: i32 = 14;
/// Vertical padding inside a genre chip.
const CHIP_PADDING_Y: i32 = 6;
const CHIP_SPACING: i32 = 10;
const CARD_BORDER_WIDTH: f64 = 2.0;

/// Result of a complete render.
#[derive(Debug, Clone)]
pub struct RenderedThumbnail {
    /// Encoded PNG (RGB, 8-bit).
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Content hash of the flattened RGB raster.
    pub hash: ContentHash,
}

/// Where the poster layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSource {
    Fetched,
    Placeholder,
}

/// Renders thumbnails for one layout with shared fonts and fetcher.
///
/// Holds only shared read-only state; every render allocates its own
/// canvas and layers.
pub struct ThumbnailRenderer<'a> {
    config: &'a LayoutConfig,
    fonts: &'a FontBook,
    fetcher: &'a dyn ImageFetcher,
}

impl<'a> ThumbnailRenderer<'a> {
    pub fn new(config: &'a LayoutConfig, fonts: &'a FontBook, fetcher: &'a dyn ImageFetcher) -> Self {
        Self {
            config,
            fonts,
            fetcher,
        }
    }

    /// Render and encode. Fails only for allocation or encoder failure.
    pub fn render(&self, record: &MediaRecord) -> ThumbResult<RenderedThumbnail> {
        let frame = self.render_frame(record)?;
        let hash = hash_frame(&frame);
        let png = PngEncoder::encode(&frame)?;
        tracing::info!(
            width = frame.width,
            height = frame.height,
            bytes = png.len(),
            hash = %hash.short(),
            "rendered thumbnail"
        );
        Ok(RenderedThumbnail {
            png,
            width: frame.width,
            height: frame.height,
            hash,
        })
    }

    /// Render to an opaque RGB frame without encoding.
    pub fn render_frame(&self, record: &MediaRecord) -> ThumbResult<FrameBuffer> {
        let config = self.config;
        let meta = normalize(record, config);
        tracing::debug!(title = %meta.title, poster = ?meta.poster_url, "normalized metadata");

        let mut canvas = build_background(config)?;

        self.draw_logo(&mut canvas);
        if let Some(rating) = &meta.rating {
            let font = self.font(FontRole::Regular, config.fonts.regular);
            self.outlined(&mut canvas, config.text.padding, config.text.rating_y, rating, &font, &config.palette.subtext);
        }
        if let (Some(y), Some(line)) = (config.text.meta_y, &meta.meta_line) {
            let font = self.font(FontRole::Medium, config.fonts.regular);
            self.outlined(&mut canvas, config.text.padding, y, line, &font, &config.palette.genre);
        }

        let below_title = self.draw_title(&mut canvas, &meta);
        self.draw_genres(&mut canvas, &meta, below_title + config.text.genre_gap);
        self.draw_description(&mut canvas, &meta, below_title + config.text.description_gap)?;
        self.draw_buttons(&mut canvas);

        let (poster, _) = self.poster_layer(meta.poster_url.as_deref())?;
        self.composite_poster(&mut canvas, &poster);

        if let Some(character) = &meta.character {
            self.draw_character_card(&mut canvas, character)?;
        }

        canvas.flatten_rgb(&config.palette.background)
    }

    /// Fetch, decode and cover-fit the poster, or the placeholder on any
    /// failure along the way.
    pub fn poster_layer(&self, url: Option<&str>) -> ThumbResult<(FrameBuffer, PosterSource)> {
        let (width, height) = self.config.poster_size();
        match url {
            Some(url) => match self.fetch_poster(url, width, height) {
                Ok(poster) => return Ok((poster, PosterSource::Fetched)),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => tracing::warn!(%url, error = %e, "poster unavailable, using placeholder"),
            },
            None => tracing::debug!("record has no poster, using placeholder"),
        }
        let placeholder = resolve_placeholder(self.config, self.fonts, width, height)?;
        Ok((placeholder, PosterSource::Placeholder))
    }

    fn fetch_poster(&self, url: &str, width: u32, height: u32) -> ThumbResult<FrameBuffer> {
        let bytes = self.fetcher.fetch(url)?;
        let image = load_image_from_bytes(&bytes)?;
        cover_fit(&image, width, height)
    }

    fn font(&self, role: FontRole, size: f32) -> FontHandle {
        self.fonts.handle(role, self.config.scaled(size))
    }

    fn outlined(&self, canvas: &mut FrameBuffer, x: i32, y: i32, text: &str, font: &FontHandle, fill: &Color) {
        draw_outlined_text(
            canvas,
            x,
            y,
            text,
            font,
            fill,
            &self.config.palette.text_outline,
            self.config.text.body_outline,
        );
    }

    fn draw_logo(&self, canvas: &mut FrameBuffer) {
        let config = self.config;
        let x = config.text.padding as f64;
        let y = config.text.logo_y as f64;
        let sz = config.logo.diamond as f64;
        let diamond = |shift: f64| {
            vec![
                Point2D::new(x + shift, y + sz),
                Point2D::new(x + sz + shift, y),
                Point2D::new(x + 2.0 * sz + shift, y + sz),
                Point2D::new(x + sz + shift, y + 2.0 * sz),
            ]
        };
        let outline = build_outline_mask(
            canvas.width,
            canvas.height,
            &[diamond(0.0), diamond(10.0)],
            config.logo.stroke as f64,
        );
        canvas.paint_mask(&outline, 0, 0, &config.palette.logo);

        let font = self.font(FontRole::Logo, config.fonts.logo);
        self.outlined(
            canvas,
            config.text.padding + config.logo.label_offset_x,
            config.text.logo_y,
            &config.logo.label,
            &font,
            &config.palette.logo,
        );
    }

    /// Draw the wrapped title; returns the y just below the last line slot.
    fn draw_title(&self, canvas: &mut FrameBuffer, meta: &DisplayMetadata) -> i32 {
        let config = self.config;
        let font = self.font(FontRole::Title, config.fonts.title);
        let lines = cap_lines(
            wrap_to_width(&meta.title, &font, config.budgets.title_max_width),
            config.budgets.title_max_lines,
            config.budgets.title_overflow_chars,
        );
        let mut y = config.text.title_y;
        for line in &lines {
            draw_outlined_text(
                canvas,
                config.text.padding,
                y,
                line,
                &font,
                &config.palette.text,
                &config.palette.text_outline,
                config.text.title_outline,
            );
            y += config.text.title_line_pitch;
        }
        y
    }

    fn draw_genres(&self, canvas: &mut FrameBuffer, meta: &DisplayMetadata, y: i32) {
        let config = self.config;
        let font = self.font(FontRole::Genre, config.fonts.genre);
        match &config.genre_style {
            GenreStyle::Joined { .. } => {
                if !meta.genre_line.is_empty() {
                    self.outlined(canvas, config.text.padding, y, &meta.genre_line, &font, &config.palette.genre);
                }
            }
            GenreStyle::Pills => {
                let limit = config.poster.start_x;
                let height = font.line_height().round() as i32 + 2 * CHIP_PADDING_Y;
                let mut x = config.text.padding;
                for genre in &meta.genres {
                    let width = font.width(genre).round() as i32 + 2 * CHIP_PADDING_X;
                    if x + width > limit {
                        break;
                    }
                    let chip = Rect::new(x, y, width as u32, height as u32);
                    fill_rounded_box(canvas, chip, height as f64 / 2.0, &config.palette.chip);
                    draw_text(canvas, x + CHIP_PADDING_X, y + CHIP_PADDING_Y, genre, &font, &config.palette.text);
                    x += width + CHIP_SPACING;
                }
            }
        }
    }

    fn draw_description(&self, canvas: &mut FrameBuffer, meta: &DisplayMetadata, y: i32) -> ThumbResult<()> {
        let config = self.config;
        if meta.description.is_empty() {
            return Ok(());
        }
        let font = self.font(FontRole::Regular, config.fonts.regular);
        let lines = cap_lines(
            wrap_to_width(&meta.description, &font, config.budgets.description_max_width),
            config.budgets.description_max_lines,
            config.budgets.description_overflow_chars,
        );
        let pitch = config.text.description_line_pitch;

        if let Some(card) = &config.synopsis_card {
            let height = pitch * (lines.len() as i32 - 1) + font.line_height().round() as i32;
            let area = Rect::new(
                config.text.padding - card.padding,
                y - card.padding,
                (config.budgets.description_max_width.round() as i32 + 2 * card.padding).max(0) as u32,
                (height + 2 * card.padding).max(0) as u32,
            );
            self.draw_card(canvas, area, card.radius as f64)?;
        }

        for (i, line) in lines.iter().enumerate() {
            self.outlined(canvas, config.text.padding, y + i as i32 * pitch, line, &font, &config.palette.subtext);
        }
        Ok(())
    }

    fn draw_buttons(&self, canvas: &mut FrameBuffer) {
        let config = self.config;
        let buttons = &config.buttons;
        let font = self.font(FontRole::Bold, config.fonts.bold);
        for (i, label) in buttons.labels.iter().enumerate() {
            let x = config.text.padding + i as i32 * (buttons.width as i32 + buttons.spacing);
            let shape = Rect::new(x, buttons.y, buttons.width, buttons.height);
            fill_rounded_box(canvas, shape, buttons.radius as f64, &config.palette.button);

            let center = x + buttons.width as i32 / 2;
            let tx = aligned_x(label, &font, center, TextAlign::Center);
            draw_text(canvas, tx, buttons.y + buttons.label_offset_y, label, &font, &config.palette.button_text);
        }
    }

    /// Honeycomb-mask the poster onto the canvas and draw the cell outlines.
    fn composite_poster(&self, canvas: &mut FrameBuffer, poster: &FrameBuffer) {
        let config = self.config;
        let origin = (config.poster.start_x, 0);
        let cells = honeycomb_cells(
            &config.poster.lattice,
            (config.width, config.height),
            origin,
            Some(config.poster.min_center_x),
        );
        let filled: Vec<_> = cells.iter().map(|c| (c.clone(), true)).collect();
        let mask = build_polygon_mask(poster.width, poster.height, &filled);
        let outline = build_outline_mask(poster.width, poster.height, &cells, config.poster.outline_width as f64);

        composite_layer(canvas, poster, origin, Some(&mask));
        canvas.paint_mask(&outline, origin.0, origin.1, &config.palette.honeycomb_outline);
    }

    fn draw_character_card(&self, canvas: &mut FrameBuffer, character: &CharacterBlurb) -> ThumbResult<()> {
        let config = self.config;
        let Some(card) = &config.character_card else {
            return Ok(());
        };
        let rect = card.rect;
        self.draw_card(canvas, rect, card.radius as f64)?;

        let inset = 18;
        let x = rect.x + inset;
        let mut y = rect.y + inset - 4;
        let heading = self.font(FontRole::Genre, config.fonts.genre * 0.6);
        draw_text(canvas, x, y, &card.heading, &heading, &config.palette.genre);
        y += heading.line_height().round() as i32 + 4;

        let name = self.font(FontRole::Bold, config.fonts.bold * 0.8);
        self.outlined(canvas, x, y, &character.name, &name, &config.palette.text);
        y += name.line_height().round() as i32 + 6;

        let body = self.font(FontRole::Regular, config.fonts.regular * 0.85);
        let lines = cap_lines(
            wrap_to_width(&character.bio, &body, (rect.width as i32 - 2 * inset) as f32),
            card.max_lines,
            config.budgets.description_overflow_chars,
        );
        for line in &lines {
            draw_text(canvas, x, y, line, &body, &config.palette.subtext);
            y += card.line_pitch;
        }
        Ok(())
    }

    /// Translucent rounded card with a thin border ring.
    fn draw_card(&self, canvas: &mut FrameBuffer, area: Rect, radius: f64) -> ThumbResult<()> {
        if area.width == 0 || area.height == 0 {
            return Ok(());
        }
        let palette = &self.config.palette;
        let layer = FrameBuffer::try_solid(area.width, area.height, &palette.card)?;
        let shape = build_rounded_rect_mask(area.width, area.height, radius);
        composite_layer(canvas, &layer, (area.x, area.y), Some(&shape));

        let mut ring = Mask::new(area.width, area.height);
        raster::stroke_rounded_rect(
            &mut ring,
            0.0,
            0.0,
            area.width as f64,
            area.height as f64,
            radius,
            CARD_BORDER_WIDTH,
        );
        canvas.paint_mask(&ring, area.x, area.y, &palette.card_border);
        Ok(())
    }
}

/// Paint a solid rounded box. The coverage mask spans only the box.
fn fill_rounded_box(canvas: &mut FrameBuffer, area: Rect, radius: f64, color: &Color) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let shape = build_rounded_rect_mask(area.width, area.height, radius);
    canvas.paint_mask(&shape, area.x, area.y, color);
}

/// Render `record` with `config`: the whole pipeline as one call.
pub fn render_thumbnail(
    record: &MediaRecord,
    config: &LayoutConfig,
    fonts: &FontBook,
    fetcher: &dyn ImageFetcher,
) -> ThumbResult<RenderedThumbnail> {
    ThumbnailRenderer::new(config, fonts, fetcher).render(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{HttpFetcher, OfflineFetcher};
    use crate::placeholder::placeholder_panel;
    use hexthumb_core::{LayoutPreset, ThumbError};

    #[test]
    fn test_render_frame_is_canvas_sized_rgb() {
        let config = LayoutConfig::preset(LayoutPreset::Classic);
        let fonts = FontBook::builtin();
        let renderer = ThumbnailRenderer::new(&config, &fonts, &OfflineFetcher);
        let frame = renderer.render_frame(&MediaRecord::titled("Frieren")).unwrap();
        assert_eq!((frame.width, frame.height), (1280, 720));
        assert_eq!(frame.format, hexthumb_core::PixelFormat::Rgb8);
    }

    #[test]
    fn test_poster_layer_without_url_is_placeholder() {
        let config = LayoutConfig::preset(LayoutPreset::Classic);
        let fonts = FontBook::builtin();
        let renderer = ThumbnailRenderer::new(&config, &fonts, &OfflineFetcher);
        let (layer, source) = renderer.poster_layer(None).unwrap();
        assert_eq!(source, PosterSource::Placeholder);
        let expected = placeholder_panel(&config, &fonts, 800, 720).unwrap();
        assert_eq!(hash_frame(&layer), hash_frame(&expected));
    }

    #[test]
    fn test_fetch_failure_is_not_an_error() {
        let config = LayoutConfig::preset(LayoutPreset::Classic);
        let fonts = FontBook::builtin();
        let renderer = ThumbnailRenderer::new(&config, &fonts, &OfflineFetcher);
        let (_, source) = renderer.poster_layer(Some("https://img.example/missing.jpg")).unwrap();
        assert_eq!(source, PosterSource::Placeholder);
    }

    #[test]
    fn test_catalog_poster_path_is_not_read_from_disk() {
        let path = std::env::temp_dir().join("hexthumb_private_poster.png");
        image::RgbaImage::from_pixel(8, 8, image::Rgba([9, 9, 9, 255]))
            .save(&path)
            .unwrap();
        let config = LayoutConfig::preset(LayoutPreset::Classic);
        let fonts = FontBook::builtin();
        let url = path.to_str().unwrap();

        let http = HttpFetcher::new(std::time::Duration::from_secs(1)).unwrap();
        let renderer = ThumbnailRenderer::new(&config, &fonts, &http);
        let (_, source) = renderer.poster_layer(Some(url)).unwrap();
        assert_eq!(source, PosterSource::Placeholder);

        let trusted = HttpFetcher::new(std::time::Duration::from_secs(1))
            .unwrap()
            .with_local_files(true);
        let renderer = ThumbnailRenderer::new(&config, &fonts, &trusted);
        let (_, source) = renderer.poster_layer(Some(url)).unwrap();
        assert_eq!(source, PosterSource::Fetched);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_allocation_failure_propagates() {
        let mut config = LayoutConfig::preset(LayoutPreset::Classic);
        config.width = u32::MAX;
        config.height = u32::MAX;
        let fonts = FontBook::builtin();
        let result = render_thumbnail(&MediaRecord::default(), &config, &fonts, &OfflineFetcher);
        assert!(matches!(result, Err(ThumbError::Allocation(_))));
    }

    #[test]
    fn test_rounded_box_paints_only_its_area() {
        let mut canvas = FrameBuffer::solid(40, 20, &Color::BLACK);
        fill_rounded_box(&mut canvas, Rect::new(10, 5, 20, 10), 3.0, &Color::WHITE);
        assert_eq!(canvas.get_pixel(20, 10), Some([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(5, 10), Some([0, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(20, 16), Some([0, 0, 0, 255]));
        // Rounded corner leaves the extreme corner pixel mostly uncovered.
        assert!(canvas.get_pixel(10, 5).unwrap()[0] < 128);

        // Clipped at the canvas edge.
        let mut canvas = FrameBuffer::solid(8, 8, &Color::BLACK);
        fill_rounded_box(&mut canvas, Rect::new(-5, -5, 10, 10), 2.0, &Color::WHITE);
        assert_eq!(canvas.get_pixel(0, 0), Some([255, 255, 255, 255]));
        assert_eq!(canvas.get_pixel(6, 6), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_oversized_card_reports_allocation_failure() {
        let mut config = LayoutConfig::preset(LayoutPreset::Cards);
        if let Some(card) = config.character_card.as_mut() {
            card.rect = Rect::new(0, 0, u32::MAX, u32::MAX);
        }
        let fonts = FontBook::builtin();
        let record = MediaRecord::titled("Frieren").with_character("Frieren", "An elf mage.", None);
        let result = render_thumbnail(&record, &config, &fonts, &OfflineFetcher);
        assert!(matches!(result, Err(ThumbError::Allocation(_))));
    }

    #[test]
    fn test_every_preset_renders() {
        let fonts = FontBook::builtin();
        let record = MediaRecord::titled("Jujutsu Kaisen")
            .with_score(86)
            .with_genres(["Action", "Drama", "Supernatural"])
            .with_description("A boy swallows a cursed talisman.")
            .with_season("FALL", 2020)
            .with_studio("MAPPA")
            .with_character("Yuji Itadori", "Tough and kind.", None);
        for preset in LayoutPreset::ALL {
            let config = LayoutConfig::preset(preset);
            let out = render_thumbnail(&record, &config, &fonts, &OfflineFetcher).unwrap();
            assert_eq!((out.width, out.height), (1280, 720), "{}", preset);
        }
    }
}
