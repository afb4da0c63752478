use chrono::{DateTime, Utc};
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::helpers::thing_helpers::thing_to_id;

pub const DEFAULT_LANGUAGE: &str = "Unknown";
pub const DEFAULT_COVER_IMAGE_URL: &str = "https://via.placeholder.com/500";
pub const DEFAULT_GENRE: &str = "Pop";
pub const DEFAULT_ERA: &str = "2020s";

/// Song row as stored in the `song` table.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SongRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    pub title: String,
    pub artist: String,
    pub language: String,
    pub genre: String,
    pub era: String,
    pub audio_url: String,
    pub cover_image_url: String,
    pub duration_seconds: u32,
    pub lyrics: Option<String>,

    pub created_at: Datetime,
}

/// Song as exchanged over the API.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub language: String,
    pub genre: String,
    pub era: String,
    pub audio_url: String,
    pub cover_image_url: String,
    pub duration_seconds: u32,
    #[serde(default)]
    pub lyrics: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SongRecord> for Song {
    fn from(record: SongRecord) -> Self {
        Self {
            id: record.id.as_ref().map(thing_to_id).unwrap_or_default(),
            title: record.title,
            artist: record.artist,
            language: record.language,
            genre: record.genre,
            era: record.era,
            audio_url: record.audio_url,
            cover_image_url: record.cover_image_url,
            duration_seconds: record.duration_seconds,
            lyrics: record.lyrics,
            created_at: record.created_at.0,
        }
    }
}

impl Song {
    /// Checks a decoded payload before it is handed to playback.
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("song id is empty".to_string());
        }
        if self.title.trim().is_empty() {
            return Err(format!("song '{}' has no title", self.id));
        }
        if !regex_is_match!(r"^https?://\S+$"i, &self.audio_url) {
            return Err(format!(
                "song '{}' has an invalid audio url '{}'",
                self.id, self.audio_url
            ));
        }
        Ok(())
    }
}

/// Body of `POST /api/songs`. Required fields are optional here so the
/// handler can answer with a 400 instead of a deserialization rejection.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreateSongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub audio_url: Option<String>,
    pub language: Option<String>,
    pub cover_image_url: Option<String>,
    pub lyrics: Option<String>,
    pub genre: Option<String>,
    pub era: Option<String>,
    pub duration_seconds: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct SongQuery {
    pub language: Option<String>,
    pub genre: Option<String>,
}
