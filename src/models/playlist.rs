use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::helpers::thing_helpers::thing_to_id;
use crate::models::song::Song;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaylistRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    pub title: String,
    pub is_public: bool,
    pub user_id: Thing,
    pub created_at: Datetime,
}

/// Junction edge `playlist -> playlist_song -> song`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaylistSongRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,

    #[serde(rename = "in")]
    pub playlist_id: Thing,

    #[serde(rename = "out")]
    pub song_id: Thing,

    pub added_at: Datetime,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Playlist {
    pub id: String,
    pub title: String,
    pub is_public: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub songs: Vec<PlaylistSong>,
}

impl From<PlaylistRecord> for Playlist {
    fn from(record: PlaylistRecord) -> Self {
        Self {
            id: record.id.as_ref().map(thing_to_id).unwrap_or_default(),
            title: record.title,
            is_public: record.is_public,
            user_id: thing_to_id(&record.user_id),
            created_at: record.created_at.0,
            songs: Vec::new(),
        }
    }
}

/// Junction row as exposed over the API, with the song embedded when it
/// still exists.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PlaylistSong {
    pub id: String,
    pub playlist_id: String,
    pub song_id: String,
    pub added_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub song: Option<Song>,
}

impl From<PlaylistSongRecord> for PlaylistSong {
    fn from(record: PlaylistSongRecord) -> Self {
        Self {
            id: record.id.as_ref().map(thing_to_id).unwrap_or_default(),
            playlist_id: thing_to_id(&record.playlist_id),
            song_id: thing_to_id(&record.song_id),
            added_at: record.added_at.0,
            song: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CreatePlaylistRequest {
    pub title: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AddSongRequest {
    pub playlist_id: Option<String>,
    pub song_id: Option<String>,
}
