//! Reduce a loosely-populated [`MediaRecord`] to the display strings a layout
//! draws. Nothing here fails: every absent field has a documented default.

use serde::Serialize;

use crate::layout::{GenreStyle, LayoutConfig, RatingStyle};
use crate::media::{MediaRecord, UNKNOWN};
use crate::text::{collapse_whitespace, limit_words, strip_markup, truncate_to_chars};

/// Separator between the parts of the season/studio/status line.
pub const META_SEPARATOR: &str = " \u{2022} ";

/// Lead character shown on the character card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterBlurb {
    pub name: String,
    pub bio: String,
    pub image_url: Option<String>,
}

/// Sanitized, budgeted display fields for one thumbnail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayMetadata {
    /// Uppercased and cut to the title character budget. Never empty.
    pub title: String,
    pub description: String,
    /// Uppercased, at most the configured count.
    pub genres: Vec<String>,
    /// Genres joined with the layout separator; empty for chip layouts.
    pub genre_line: String,
    /// Score clamped to 0..=100.
    pub score: Option<u8>,
    pub rating: Option<String>,
    pub studio: String,
    pub status: String,
    pub season: Option<String>,
    pub meta_line: Option<String>,
    pub poster_url: Option<String>,
    pub character: Option<CharacterBlurb>,
}

/// Extract the display fields of `record` under the budgets of `config`.
pub fn normalize(record: &MediaRecord, config: &LayoutConfig) -> DisplayMetadata {
    let budgets = &config.budgets;

    let title = truncate_to_chars(&record.resolved_title().to_uppercase(), budgets.title_max_chars);

    let description = clean_text(
        record.description.as_deref().unwrap_or_default(),
        budgets.description_max_words,
        config,
    );

    let genres: Vec<String> = record
        .genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .take(budgets.genre_count)
        .map(str::to_uppercase)
        .collect();
    let genre_line = match &config.genre_style {
        GenreStyle::Joined { separator } => genres.join(separator),
        GenreStyle::Pills => String::new(),
    };

    let score = record.average_score.map(|s| s.clamp(0, 100) as u8);
    let rating = score.map(|s| format_rating(s, config.rating_style));

    let studio = record.studio().unwrap_or(UNKNOWN).to_string();
    let status = record
        .status
        .as_deref()
        .map(prettify_status)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string());
    let season = record.season_label();
    let meta_line = meta_line(season.as_deref(), &studio, &status);

    let character = config.character_card.as_ref().and_then(|card| {
        let lead = record.lead_character()?;
        Some(CharacterBlurb {
            name: lead.name()?.trim().to_string(),
            bio: clean_text(lead.bio().unwrap_or_default(), card.bio_words, config),
            image_url: lead.image_url().map(str::to_string),
        })
    });

    DisplayMetadata {
        title,
        description,
        genres,
        genre_line,
        score,
        rating,
        studio,
        status,
        season,
        meta_line,
        poster_url: record.poster_url().map(str::to_string),
        character,
    }
}

/// "8.4+ Rating" or "8.4/10" for a 0..=100 score.
pub fn format_rating(score: u8, style: RatingStyle) -> String {
    let out_of_ten = f32::from(score) / 10.0;
    match style {
        RatingStyle::Plus => format!("{:.1}+ Rating", out_of_ten),
        RatingStyle::OutOfTen => format!("{:.1}/10", out_of_ten),
    }
}

/// `NOT_YET_RELEASED` -> `NOT YET RELEASED`.
pub fn prettify_status(status: &str) -> String {
    collapse_whitespace(&status.replace('_', " ")).to_uppercase()
}

fn clean_text(raw: &str, max_words: usize, config: &LayoutConfig) -> String {
    let plain = collapse_whitespace(&strip_markup(raw));
    limit_words(&plain, max_words, config.budgets.description_ellipsis)
}

fn meta_line(season: Option<&str>, studio: &str, status: &str) -> Option<String> {
    let parts: Vec<&str> = season
        .into_iter()
        .chain([studio, status])
        .filter(|p| !p.is_empty() && *p != UNKNOWN)
        .collect();
    (!parts.is_empty()).then(|| parts.join(META_SEPARATOR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutPreset;
    use crate::text::{DescriptionEllipsis, ELLIPSIS};

    fn classic() -> LayoutConfig {
        LayoutConfig::preset(LayoutPreset::Classic)
    }

    #[test]
    fn test_title_uppercased() {
        let meta = normalize(&MediaRecord::titled("Attack on Titan"), &classic());
        assert_eq!(meta.title, "ATTACK ON TITAN");
    }

    #[test]
    fn test_long_title_truncated() {
        let title = "My Very Long Anime Title That Should Be Properly Truncated With Ellipsis For Better Display";
        let meta = normalize(&MediaRecord::titled(title), &classic());
        assert!(meta.title.chars().count() <= 45);
        assert!(meta.title.ends_with(ELLIPSIS));
        assert!(meta.title.starts_with("MY VERY LONG ANIME TITLE"));
    }

    #[test]
    fn test_missing_title_falls_back() {
        let meta = normalize(&MediaRecord::default(), &classic());
        assert_eq!(meta.title, UNKNOWN);

        let romaji = MediaRecord::default().with_romaji("Shingeki no Kyojin");
        assert_eq!(normalize(&romaji, &classic()).title, "SHINGEKI NO KYOJIN");
    }

    #[test]
    fn test_rating_styles() {
        let record = MediaRecord::titled("x").with_score(84);
        assert_eq!(normalize(&record, &classic()).rating.as_deref(), Some("8.4+ Rating"));

        let cards = LayoutConfig::preset(LayoutPreset::Cards);
        assert_eq!(normalize(&record, &cards).rating.as_deref(), Some("8.4/10"));
    }

    #[test]
    fn test_rating_edges() {
        assert_eq!(format_rating(0, RatingStyle::Plus), "0.0+ Rating");
        assert_eq!(format_rating(100, RatingStyle::OutOfTen), "10.0/10");

        let meta = normalize(&MediaRecord::titled("x").with_score(250), &classic());
        assert_eq!(meta.score, Some(100));
        let meta = normalize(&MediaRecord::titled("x").with_score(-5), &classic());
        assert_eq!(meta.score, Some(0));
        assert_eq!(normalize(&MediaRecord::titled("x"), &classic()).rating, None);
    }

    #[test]
    fn test_genres_limited_and_joined() {
        let record = MediaRecord::titled("x").with_genres(["Action", " ", "Drama", "Fantasy", "Mystery"]);
        let meta = normalize(&record, &classic());
        assert_eq!(meta.genres, vec!["ACTION", "DRAMA", "FANTASY"]);
        assert_eq!(meta.genre_line, "ACTION, DRAMA, FANTASY");

        let meta = normalize(&record, &LayoutConfig::preset(LayoutPreset::Cards));
        assert_eq!(meta.genre_line, "ACTION \u{2022} DRAMA \u{2022} FANTASY \u{2022} MYSTERY");

        let meta = normalize(&record, &LayoutConfig::preset(LayoutPreset::Pills));
        assert_eq!(meta.genres.len(), 4);
        assert_eq!(meta.genre_line, "");
    }

    #[test]
    fn test_empty_genres_give_empty_line() {
        let meta = normalize(&MediaRecord::titled("x").with_genres(Vec::<String>::new()), &classic());
        assert!(meta.genres.is_empty());
        assert_eq!(meta.genre_line, "");
    }

    #[test]
    fn test_description_cleaned() {
        let record = MediaRecord::titled("x")
            .with_description("Humanity&#039;s last<br><br>stand   behind <i>the</i> walls.");
        let meta = normalize(&record, &classic());
        assert_eq!(meta.description, "Humanity's last stand behind the walls.");
    }

    #[test]
    fn test_description_word_limit() {
        let words: Vec<String> = (0..50).map(|i| format!("w{}", i)).collect();
        let record = MediaRecord::titled("x").with_description(words.join(" "));
        let meta = normalize(&record, &classic());
        assert_eq!(meta.description.split_whitespace().count(), 35);
        assert!(meta.description.ends_with("w34..."));
    }

    #[test]
    fn test_description_ellipsis_policy() {
        let record = MediaRecord::titled("x").with_description("Short and sweet.");
        assert_eq!(normalize(&record, &classic()).description, "Short and sweet.");

        let mut strict = classic();
        strict.budgets.description_ellipsis = DescriptionEllipsis::Always;
        assert_eq!(normalize(&record, &strict).description, "Short and sweet....");
        assert_eq!(normalize(&MediaRecord::titled("x"), &strict).description, "");
    }

    #[test]
    fn test_studio_and_status_defaults() {
        let meta = normalize(&MediaRecord::titled("x"), &classic());
        assert_eq!(meta.studio, UNKNOWN);
        assert_eq!(meta.status, UNKNOWN);
        assert_eq!(meta.meta_line, None);
    }

    #[test]
    fn test_meta_line() {
        let record = MediaRecord::titled("x")
            .with_season("FALL", 2023)
            .with_studio("MAPPA")
            .with_status("NOT_YET_RELEASED");
        let meta = normalize(&record, &classic());
        assert_eq!(meta.status, "NOT YET RELEASED");
        assert_eq!(
            meta.meta_line.as_deref(),
            Some("FALL 2023 \u{2022} MAPPA \u{2022} NOT YET RELEASED")
        );
    }

    #[test]
    fn test_character_only_for_card_layouts() {
        let record = MediaRecord::titled("x").with_character("Eren Yeager", "<b>Angry</b> boy.", None);
        assert_eq!(normalize(&record, &classic()).character, None);

        let meta = normalize(&record, &LayoutConfig::preset(LayoutPreset::Cards));
        let character = meta.character.unwrap();
        assert_eq!(character.name, "Eren Yeager");
        assert_eq!(character.bio, "Angry boy.");
    }

    #[test]
    fn test_malformed_record_still_normalizes() {
        let record = MediaRecord::from_json(r#"{"title": 5, "genres": [null, "Drama"], "averageScore": "high"}"#)
            .unwrap();
        let meta = normalize(&record, &classic());
        assert_eq!(meta.title, UNKNOWN);
        assert_eq!(meta.genre_line, "DRAMA");
        assert_eq!(meta.rating, None);
    }
}
