//! The catalog metadata record consumed by the renderer.
//!
//! Field names follow the AniList `Media` object. Deserialization is
//! lenient at every level: a missing field, a `null`, or a value of the
//! wrong type falls back to the default instead of failing the record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ThumbResult;

/// Placeholder used wherever a display string is required but absent.
pub const UNKNOWN: &str = "UNKNOWN";

fn lenient<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(d)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

fn lenient_vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(d)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter(|v| !v.is_null())
        .filter_map(|v| T::deserialize(v).ok())
        .collect())
}

/// Treat blank strings as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    #[serde(default, deserialize_with = "lenient")]
    pub english: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub romaji: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub native: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverImage {
    #[serde(default, deserialize_with = "lenient")]
    pub extra_large: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Connection<T> {
    #[serde(default, deserialize_with = "lenient_vec")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_animation_studio: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterName {
    #[serde(default, deserialize_with = "lenient")]
    pub full: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterImage {
    #[serde(default, deserialize_with = "lenient")]
    pub large: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default, deserialize_with = "lenient")]
    pub name: CharacterName,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub image: CharacterImage,
}

impl Character {
    pub fn name(&self) -> Option<&str> {
        present(&self.name.full)
    }

    pub fn bio(&self) -> Option<&str> {
        present(&self.description)
    }

    pub fn image_url(&self) -> Option<&str> {
        present(&self.image.large)
    }
}

/// One anime title as returned by the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub title: MediaTitle,
    #[serde(default, deserialize_with = "lenient")]
    pub cover_image: CoverImage,
    #[serde(default, deserialize_with = "lenient")]
    pub average_score: Option<i64>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub genres: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub season: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub season_year: Option<i64>,
    #[serde(default, deserialize_with = "lenient")]
    pub studios: Connection<Studio>,
    #[serde(default, deserialize_with = "lenient")]
    pub characters: Connection<Character>,
}

impl MediaRecord {
    /// Parse a record from JSON text.
    ///
    /// Only text that is not JSON at all is an error; any JSON value that
    /// is not a usable object yields the empty record.
    pub fn from_json(json: &str) -> ThumbResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Self::from_value(value))
    }

    /// Build a record from an already parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }

    /// A record with just an English title, for building up by hand.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: MediaTitle {
                english: Some(title.into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_romaji(mut self, romaji: impl Into<String>) -> Self {
        self.title.romaji = Some(romaji.into());
        self
    }

    pub fn with_poster_url(mut self, url: impl Into<String>) -> Self {
        self.cover_image.extra_large = Some(url.into());
        self
    }

    pub fn with_score(mut self, score: i64) -> Self {
        self.average_score = Some(score);
        self
    }

    pub fn with_genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_season(mut self, season: impl Into<String>, year: i64) -> Self {
        self.season = Some(season.into());
        self.season_year = Some(year);
        self
    }

    pub fn with_studio(mut self, name: impl Into<String>) -> Self {
        self.studios.nodes.push(Studio {
            name: Some(name.into()),
            is_animation_studio: true,
        });
        self
    }

    pub fn with_character(
        mut self,
        name: impl Into<String>,
        bio: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        self.characters.nodes.push(Character {
            name: CharacterName {
                full: Some(name.into()),
            },
            description: Some(bio.into()),
            image: CharacterImage { large: image_url },
        });
        self
    }

    /// The primary (English) title, if present.
    pub fn primary_title(&self) -> Option<&str> {
        present(&self.title.english)
    }

    /// The alternate title: romanized, else native script.
    pub fn alternate_title(&self) -> Option<&str> {
        present(&self.title.romaji).or_else(|| present(&self.title.native))
    }

    /// Primary, else alternate, else [`UNKNOWN`]. Never empty.
    pub fn resolved_title(&self) -> &str {
        self.primary_title()
            .or_else(|| self.alternate_title())
            .unwrap_or(UNKNOWN)
    }

    /// Best available poster URL.
    pub fn poster_url(&self) -> Option<&str> {
        present(&self.cover_image.extra_large).or_else(|| present(&self.cover_image.large))
    }

    /// Animation studio if one is flagged, else the first named studio.
    pub fn studio(&self) -> Option<&str> {
        let named = || self.studios.nodes.iter().filter(|s| present(&s.name).is_some());
        named()
            .find(|s| s.is_animation_studio)
            .or_else(|| named().next())
            .and_then(|s| present(&s.name))
    }

    /// "FALL 2023", "FALL", "2023", or None.
    pub fn season_label(&self) -> Option<String> {
        let season = present(&self.season).map(str::to_uppercase);
        let year = self.season_year.filter(|y| *y > 0).map(|y| y.to_string());
        match (season, year) {
            (Some(s), Some(y)) => Some(format!("{} {}", s, y)),
            (Some(s), None) => Some(s),
            (None, Some(y)) => Some(y),
            (None, None) => None,
        }
    }

    /// First character that has a name.
    pub fn lead_character(&self) -> Option<&Character> {
        self.characters.nodes.iter().find(|c| c.name().is_some())
    }
}
