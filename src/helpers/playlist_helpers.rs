use surrealdb::engine::any::Any;
use surrealdb::Surreal;

use crate::{
    helpers::thing_helpers::{create_playlist_thing, create_song_thing},
    models::playlist::{PlaylistRecord, PlaylistSongRecord},
    Error,
};

/// Looks up a playlist by id without checking ownership.
pub async fn find_playlist(
    db: &Surreal<Any>,
    playlist_id: &str,
) -> Result<Option<PlaylistRecord>, Error> {
    let playlist_thing = create_playlist_thing(playlist_id);

    let playlist: Option<PlaylistRecord> = db
        .query("SELECT * FROM $playlist")
        .bind(("playlist", playlist_thing))
        .await?
        .take(0)?;

    Ok(playlist)
}

/// Whether the (playlist, song) junction row already exists.
pub async fn song_already_in_playlist(
    db: &Surreal<Any>,
    playlist_id: &str,
    song_id: &str,
) -> Result<bool, Error> {
    let playlist_thing = create_playlist_thing(playlist_id);
    let song_thing = create_song_thing(song_id);

    let existing: Vec<PlaylistSongRecord> = db
        .query("SELECT * FROM playlist_song WHERE in = $playlist AND out = $song LIMIT 1")
        .bind(("playlist", playlist_thing))
        .bind(("song", song_thing))
        .await?
        .take(0)?;

    Ok(!existing.is_empty())
}
