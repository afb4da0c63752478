//! View-models for the app screens. Pure functions over fetched data and
//! session snapshots; nothing here performs I/O.

use std::time::Duration;

use super::{
    error::{Error, Result},
    session::{SessionSnapshot, Transport},
};
use crate::{
    auth::models::{LoginPayload, RegisterPayload},
    models::{
        playlist::Playlist,
        song::{CreateSongRequest, Song},
    },
};

pub const ALL_CATEGORY: &str = "All";
pub const HOME_CATEGORIES: [&str; 4] = [ALL_CATEGORY, "Assamese", "Hindi", "English"];

pub const SEARCH_PROMPT: &str = "Start typing to find music.";
pub const SEARCH_NO_RESULTS: &str = "No results found.";
pub const EMPTY_PLAYLIST: &str = "This playlist is empty.";
pub const EMPTY_PLAYLIST_HINT: &str = "Go to Home and add some tracks.";
pub const UPLOAD_SUCCESS: &str = "Goonj updated with new track!";

#[derive(Debug, Clone, PartialEq)]
pub struct HomeView<'a> {
    pub category: String,
    pub songs: Vec<&'a Song>,
    pub empty_message: Option<String>,
    pub current_song_id: Option<String>,
}

impl<'a> HomeView<'a> {
    /// Songs in `category`, matched on language without regard to case.
    pub fn new(songs: &'a [Song], category: &str, current_song_id: Option<&str>) -> Self {
        let filtered: Vec<&Song> = if category.eq_ignore_ascii_case(ALL_CATEGORY) {
            songs.iter().collect()
        } else {
            songs
                .iter()
                .filter(|song| song.language.to_lowercase() == category.to_lowercase())
                .collect()
        };

        let empty_message = filtered
            .is_empty()
            .then(|| format!("No {category} songs found in database."));

        Self {
            category: category.to_string(),
            songs: filtered,
            empty_message,
            current_song_id: current_song_id.map(str::to_string),
        }
    }

    pub fn is_current(&self, song: &Song) -> bool {
        self.current_song_id.as_deref() == Some(song.id.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchView<'a> {
    pub results: Vec<&'a Song>,
    pub empty_message: Option<&'static str>,
}

/// Case-insensitive substring match on title or artist. A blank query
/// matches nothing.
pub fn search_songs<'a>(songs: &'a [Song], query: &str) -> SearchView<'a> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return SearchView {
            results: Vec::new(),
            empty_message: Some(SEARCH_PROMPT),
        };
    }

    let results: Vec<&Song> = songs
        .iter()
        .filter(|song| {
            song.title.to_lowercase().contains(&needle)
                || song.artist.to_lowercase().contains(&needle)
        })
        .collect();

    let empty_message = results.is_empty().then_some(SEARCH_NO_RESULTS);
    SearchView {
        results,
        empty_message,
    }
}

pub fn song_count_label(count: usize) -> String {
    if count == 1 {
        "1 song".to_string()
    } else {
        format!("{count} songs")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSummary {
    pub id: String,
    pub title: String,
    pub count_label: String,
}

pub fn playlist_library(playlists: &[Playlist]) -> Vec<PlaylistSummary> {
    playlists
        .iter()
        .map(|playlist| PlaylistSummary {
            id: playlist.id.clone(),
            title: playlist.title.clone(),
            count_label: song_count_label(playlist.songs.len()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistDetail {
    pub title: String,
    pub count_label: String,
    /// Songs still present on the server, in insertion order.
    pub songs: Vec<Song>,
    pub empty_state: Option<(&'static str, &'static str)>,
}

impl PlaylistDetail {
    pub fn new(playlist: &Playlist) -> Self {
        let songs: Vec<Song> = playlist
            .songs
            .iter()
            .filter_map(|entry| entry.song.clone())
            .collect();

        Self {
            title: playlist.title.clone(),
            count_label: song_count_label(playlist.songs.len()),
            empty_state: songs
                .is_empty()
                .then_some((EMPTY_PLAYLIST, EMPTY_PLAYLIST_HINT)),
            songs,
        }
    }
}

pub fn validate_playlist_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(Error::InvalidForm(
            "Playlist title cannot be empty.".to_string(),
        ));
    }
    Ok(title.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub title: String,
    pub artist: String,
    pub language: String,
    pub audio_url: String,
    pub cover_image_url: String,
    pub lyrics: String,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            artist: String::new(),
            language: "Assamese".to_string(),
            audio_url: String::new(),
            cover_image_url: String::new(),
            lyrics: String::new(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

impl UploadForm {
    /// Builds the upload request. Blank optional fields are left for the
    /// server to default.
    pub fn to_request(&self) -> Result<CreateSongRequest> {
        let (Some(title), Some(artist), Some(audio_url)) = (
            non_blank(&self.title),
            non_blank(&self.artist),
            non_blank(&self.audio_url),
        ) else {
            return Err(Error::InvalidForm(
                "Title, Artist, and Audio URL are required.".to_string(),
            ));
        };

        Ok(CreateSongRequest {
            title: Some(title),
            artist: Some(artist),
            audio_url: Some(audio_url),
            language: non_blank(&self.language),
            cover_image_url: non_blank(&self.cover_image_url),
            lyrics: non_blank(&self.lyrics),
            ..Default::default()
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn to_payload(&self) -> Result<LoginPayload> {
        match (non_blank(&self.email), self.password.is_empty()) {
            (Some(email), false) => Ok(LoginPayload {
                email: Some(email),
                password: Some(self.password.clone()),
            }),
            _ => Err(Error::InvalidForm(
                "Email and password are required.".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn to_payload(&self) -> Result<RegisterPayload> {
        match (
            non_blank(&self.username),
            non_blank(&self.email),
            self.password.is_empty(),
        ) {
            (Some(username), Some(email), false) => Ok(RegisterPayload {
                username: Some(username),
                email: Some(email),
                password: Some(self.password.clone()),
            }),
            _ => Err(Error::InvalidForm("All fields are required.".to_string())),
        }
    }
}

/// `m:ss` rendering used by the player.
pub fn format_clock(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiniPlayer {
    pub title: String,
    pub artist: String,
    pub cover_image_url: String,
    pub is_playing: bool,
    pub progress: f64,
    pub elapsed: String,
    pub total: Option<String>,
    pub sleep_label: Option<String>,
}

impl MiniPlayer {
    /// Present only while a track is remembered.
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Option<Self> {
        let song = snapshot.current.as_ref()?;

        Some(Self {
            title: song.title.clone(),
            artist: song.artist.clone(),
            cover_image_url: song.cover_image_url.clone(),
            is_playing: snapshot.transport == Transport::Playing,
            progress: snapshot.progress(),
            elapsed: format_clock(snapshot.position),
            total: snapshot.duration.map(format_clock),
            sleep_label: snapshot
                .sleep_minutes_left
                .map(|minutes| format!("Sleep in {minutes} min")),
        })
    }
}
