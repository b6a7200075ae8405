//! AniList catalog lookups.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use hexthumb_core::MediaRecord;
use serde_json::{json, Value};

pub const ANILIST_ENDPOINT: &str = "https://graphql.anilist.co";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const MEDIA_QUERY: &str = r#"
query ($search: String) {
  Media(search: $search, type: ANIME) {
    title { romaji english native }
    coverImage { extraLarge large }
    averageScore
    genres
    description
    status
    season
    seasonYear
    studios { nodes { name isAnimationStudio } }
    characters(sort: ROLE, perPage: 3) {
      nodes { name { full } description image { large } }
    }
  }
}
"#;

pub struct Catalog {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl Catalog {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("hexthumb/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build catalog HTTP client")?;
        Ok(Self {
            client,
            endpoint: ANILIST_ENDPOINT.to_string(),
        })
    }

    /// Look up the best match for `title`.
    pub fn search(&self, title: &str) -> Result<MediaRecord> {
        let title = title.trim();
        if title.is_empty() {
            bail!("search title must not be empty");
        }

        tracing::info!(query = %title, endpoint = %self.endpoint, "querying catalog");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body(title))
            .send()
            .with_context(|| format!("catalog request failed for '{}'", title))?;

        let status = response.status();
        let body: Value = response
            .json()
            .with_context(|| format!("catalog returned an unreadable response (HTTP {})", status))?;

        media_from_response(body, title)
    }
}

fn request_body(title: &str) -> Value {
    json!({
        "query": MEDIA_QUERY,
        "variables": { "search": title },
    })
}

/// Pull `data.Media` out of a GraphQL response.
fn media_from_response(mut body: Value, title: &str) -> Result<MediaRecord> {
    let media = body
        .pointer_mut("/data/Media")
        .map(Value::take)
        .filter(|v| v.is_object());

    match media {
        Some(media) => Ok(MediaRecord::from_value(media)),
        None => {
            if let Some(message) = body
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
            {
                tracing::debug!(error = %message, "catalog reported an error");
            }
            bail!("anime not found: '{}'", title)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_carries_search_variable() {
        let body = request_body("Haikyu!!");
        assert_eq!(body["variables"]["search"], "Haikyu!!");
        assert!(body["query"].as_str().unwrap().contains("coverImage"));
    }

    #[test]
    fn test_media_extracted_from_response() {
        let body = json!({
            "data": {
                "Media": {
                    "title": { "english": "Haikyu!!", "romaji": "Haikyuu!!" },
                    "averageScore": 84,
                    "genres": ["Comedy", "Drama", "Sports"]
                }
            }
        });
        let record = media_from_response(body, "haikyu").unwrap();
        assert_eq!(record.resolved_title(), "Haikyu!!");
        assert_eq!(record.average_score, Some(84));
        assert_eq!(record.genres.len(), 3);
    }

    #[test]
    fn test_null_media_is_not_found() {
        let body = json!({
            "errors": [{ "message": "Not Found.", "status": 404 }],
            "data": { "Media": null }
        });
        let err = media_from_response(body, "zzzz").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_missing_data_is_not_found() {
        let err = media_from_response(json!({}), "zzzz").unwrap_err();
        assert!(err.to_string().contains("zzzz"));
    }
}
