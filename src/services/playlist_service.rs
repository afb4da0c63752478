use std::collections::HashMap;

use chrono::Utc;
use surrealdb::sql::{Datetime, Thing};
use surrealdb::{engine::any::Any, Surreal};

use crate::{
    helpers::{
        playlist_helpers::{find_playlist, song_already_in_playlist},
        song_helpers::song_exists,
        thing_helpers::{
            create_playlist_thing, create_song_thing, create_user_thing, PLAYLIST_TABLE,
        },
    },
    models::{
        playlist::{
            AddSongRequest, CreatePlaylistRequest, Playlist, PlaylistRecord, PlaylistSong,
            PlaylistSongRecord,
        },
        song::{Song, SongRecord},
    },
    Error, Result,
};

pub struct PlaylistService;

impl PlaylistService {
    /// Returns the playlist if it exists and belongs to `user_id`.
    async fn validate_playlist_ownership(
        db: &Surreal<Any>,
        playlist_id: &str,
        user_id: &str,
    ) -> Result<PlaylistRecord> {
        let playlist = find_playlist(db, playlist_id)
            .await?
            .ok_or_else(|| Error::PlaylistNotFound {
                id: playlist_id.to_string(),
            })?;

        if playlist.user_id != create_user_thing(user_id) {
            tracing::warn!(playlist_id, user_id, "playlist access by non-owner");
            return Err(Error::PlaylistForbidden {
                id: playlist_id.to_string(),
            });
        }

        Ok(playlist)
    }

    pub async fn create_playlist(
        db: &Surreal<Any>,
        user_id: &str,
        request: CreatePlaylistRequest,
    ) -> Result<Playlist> {
        let title = request
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidInput {
                reason: "Playlist title cannot be empty.".to_string(),
            })?;

        let record = PlaylistRecord {
            id: None,
            title,
            is_public: request.is_public.unwrap_or(false),
            user_id: create_user_thing(user_id),
            created_at: Datetime::from(Utc::now()),
        };

        let created: Option<PlaylistRecord> = db.create(PLAYLIST_TABLE).content(record).await?;
        let playlist = created
            .map(Playlist::from)
            .ok_or_else(|| Error::DbError("Could not create playlist".to_string()))?;

        tracing::info!(playlist_id = %playlist.id, user_id, "playlist created");
        Ok(playlist)
    }

    /// Caller's playlists, newest first, each with its junction rows and songs.
    pub async fn get_user_playlists(db: &Surreal<Any>, user_id: &str) -> Result<Vec<Playlist>> {
        let records: Vec<PlaylistRecord> = db
            .query("SELECT * FROM playlist WHERE user_id = $user ORDER BY created_at DESC")
            .bind(("user", create_user_thing(user_id)))
            .await?
            .take(0)?;

        if records.is_empty() {
            return Ok(Vec::new());
        }

        let playlist_things: Vec<Thing> = records.iter().filter_map(|r| r.id.clone()).collect();

        let entries: Vec<PlaylistSongRecord> = db
            .query("SELECT * FROM playlist_song WHERE in IN $playlists ORDER BY added_at ASC")
            .bind(("playlists", playlist_things))
            .await?
            .take(0)?;

        let song_things: Vec<Thing> = entries.iter().map(|e| e.song_id.clone()).collect();
        let songs: HashMap<String, Song> = if song_things.is_empty() {
            HashMap::new()
        } else {
            let song_records: Vec<SongRecord> = db
                .query("SELECT * FROM song WHERE id IN $songs")
                .bind(("songs", song_things))
                .await?
                .take(0)?;
            song_records
                .into_iter()
                .map(Song::from)
                .map(|song| (song.id.clone(), song))
                .collect()
        };

        let mut by_playlist: HashMap<String, Vec<PlaylistSong>> = HashMap::new();
        for entry in entries {
            let mut row = PlaylistSong::from(entry);
            row.song = songs.get(&row.song_id).cloned();
            by_playlist.entry(row.playlist_id.clone()).or_default().push(row);
        }

        Ok(records
            .into_iter()
            .map(Playlist::from)
            .map(|mut playlist| {
                playlist.songs = by_playlist.remove(&playlist.id).unwrap_or_default();
                playlist
            })
            .collect())
    }

    /// Appends a song to a playlist owned by `user_id`. A pair that is
    /// already present is rejected and no row is written.
    pub async fn add_song_to_playlist(
        db: &Surreal<Any>,
        user_id: &str,
        request: AddSongRequest,
    ) -> Result<PlaylistSong> {
        let (Some(playlist_id), Some(song_id)) = (
            request.playlist_id.filter(|id| !id.trim().is_empty()),
            request.song_id.filter(|id| !id.trim().is_empty()),
        ) else {
            return Err(Error::InvalidInput {
                reason: "playlist_id and song_id are required".to_string(),
            });
        };

        Self::validate_playlist_ownership(db, &playlist_id, user_id).await?;

        if !song_exists(db, &song_id).await? {
            return Err(Error::SongNotFound { id: song_id });
        }

        if song_already_in_playlist(db, &playlist_id, &song_id).await? {
            return Err(Error::SongAlreadyInPlaylist {
                song_id,
                playlist_id,
            });
        }

        let mut created: Vec<PlaylistSongRecord> = db
            .query("RELATE $playlist->playlist_song->$song SET added_at = $added_at")
            .bind(("playlist", create_playlist_thing(&playlist_id)))
            .bind(("song", create_song_thing(&song_id)))
            .bind(("added_at", Datetime::from(Utc::now())))
            .await?
            .take(0)?;

        let row = created.pop().map(PlaylistSong::from).ok_or_else(|| {
            Error::DbError(format!(
                "Could not add song '{song_id}' to playlist '{playlist_id}'"
            ))
        })?;

        tracing::info!(
            playlist_id = %row.playlist_id,
            song_id = %row.song_id,
            "song added to playlist"
        );
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::thing_helpers::thing_to_id;
    use crate::models::song::CreateSongRequest;
    use crate::services::song_service::SongService;
    use surrealdb::engine::any::connect;

    async fn setup_db() -> (Surreal<Any>, String) {
        let db = connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();

        let song = SongService::create_song(
            &db,
            CreateSongRequest {
                title: Some("Tum Hi Ho".to_string()),
                artist: Some("Arijit Singh".to_string()),
                audio_url: Some("https://example.com/2.mp3".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        (db, song.id)
    }

    async fn count_songs(db: &Surreal<Any>, playlist_id: &str) -> usize {
        let rows: Vec<PlaylistSongRecord> = db
            .query("SELECT * FROM playlist_song WHERE in = $playlist")
            .bind(("playlist", create_playlist_thing(playlist_id)))
            .await
            .unwrap()
            .take(0)
            .unwrap();
        rows.len()
    }

    fn create_request(title: &str) -> CreatePlaylistRequest {
        CreatePlaylistRequest {
            title: Some(title.to_string()),
            is_public: None,
        }
    }

    fn add_request(playlist_id: &str, song_id: &str) -> AddSongRequest {
        AddSongRequest {
            playlist_id: Some(playlist_id.to_string()),
            song_id: Some(song_id.to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_playlist() {
        let (db, _song_id) = setup_db().await;

        let playlist = PlaylistService::create_playlist(&db, "alice", create_request(" Road trip "))
            .await
            .unwrap();
        assert_eq!(playlist.title, "Road trip");
        assert!(!playlist.is_public);
        assert_eq!(playlist.user_id, "alice");
        assert!(playlist.songs.is_empty());

        let record = find_playlist(&db, &playlist.id).await.unwrap().unwrap();
        assert_eq!(thing_to_id(&record.user_id), "alice");

        let empty = PlaylistService::create_playlist(&db, "alice", create_request("  ")).await;
        assert!(matches!(empty, Err(Error::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_duplicate_song_is_rejected() {
        let (db, song_id) = setup_db().await;
        let playlist = PlaylistService::create_playlist(&db, "alice", create_request("Mix"))
            .await
            .unwrap();

        let row = PlaylistService::add_song_to_playlist(&db, "alice", add_request(&playlist.id, &song_id))
            .await
            .unwrap();
        assert_eq!(row.playlist_id, playlist.id);
        assert_eq!(row.song_id, song_id);

        let again =
            PlaylistService::add_song_to_playlist(&db, "alice", add_request(&playlist.id, &song_id))
                .await;
        assert!(matches!(again, Err(Error::SongAlreadyInPlaylist { .. })));

        assert_eq!(count_songs(&db, &playlist.id).await, 1);
    }

    #[tokio::test]
    async fn test_cross_user_access_is_rejected() {
        let (db, song_id) = setup_db().await;
        let playlist = PlaylistService::create_playlist(&db, "alice", create_request("Private"))
            .await
            .unwrap();

        let result =
            PlaylistService::add_song_to_playlist(&db, "mallory", add_request(&playlist.id, &song_id))
                .await;
        assert!(matches!(result, Err(Error::PlaylistForbidden { .. })));
        assert_eq!(count_songs(&db, &playlist.id).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_song_or_playlist() {
        let (db, song_id) = setup_db().await;
        let playlist = PlaylistService::create_playlist(&db, "alice", create_request("Mix"))
            .await
            .unwrap();

        let missing_song =
            PlaylistService::add_song_to_playlist(&db, "alice", add_request(&playlist.id, "nope"))
                .await;
        assert!(matches!(missing_song, Err(Error::SongNotFound { .. })));

        let missing_playlist =
            PlaylistService::add_song_to_playlist(&db, "alice", add_request("nope", &song_id))
                .await;
        assert!(matches!(missing_playlist, Err(Error::PlaylistNotFound { .. })));

        let blank = PlaylistService::add_song_to_playlist(&db, "alice", AddSongRequest::default())
            .await;
        assert!(matches!(blank, Err(Error::InvalidInput { .. })));
    }

    #[tokio::test]
    async fn test_user_playlists_embed_songs() {
        let (db, song_id) = setup_db().await;
        let empty = PlaylistService::create_playlist(&db, "alice", create_request("Empty"))
            .await
            .unwrap();
        let full = PlaylistService::create_playlist(&db, "alice", create_request("Full"))
            .await
            .unwrap();
        PlaylistService::create_playlist(&db, "bob", create_request("Bob's"))
            .await
            .unwrap();

        PlaylistService::add_song_to_playlist(&db, "alice", add_request(&full.id, &song_id))
            .await
            .unwrap();

        let playlists = PlaylistService::get_user_playlists(&db, "alice").await.unwrap();
        assert_eq!(playlists.len(), 2);
        assert_eq!(playlists[0].id, full.id, "newest playlist first");
        assert_eq!(playlists[1].id, empty.id);

        assert_eq!(playlists[0].songs.len(), 1);
        let embedded = playlists[0].songs[0].song.as_ref().unwrap();
        assert_eq!(embedded.id, song_id);
        assert_eq!(embedded.title, "Tum Hi Ho");
        assert!(playlists[1].songs.is_empty());

        let none = PlaylistService::get_user_playlists(&db, "carol").await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_deleting_song_removes_junction_rows() {
        let (db, song_id) = setup_db().await;
        let playlist = PlaylistService::create_playlist(&db, "alice", create_request("Mix"))
            .await
            .unwrap();
        PlaylistService::add_song_to_playlist(&db, "alice", add_request(&playlist.id, &song_id))
            .await
            .unwrap();

        SongService::delete_song(&db, &song_id).await.unwrap();

        assert_eq!(count_songs(&db, &playlist.id).await, 0);
        let playlists = PlaylistService::get_user_playlists(&db, "alice").await.unwrap();
        assert!(playlists[0].songs.is_empty());
    }
}
