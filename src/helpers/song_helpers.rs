use crate::{helpers::thing_helpers::create_song_thing, models::song::SongRecord, Error};
use surrealdb::{engine::any::Any, Surreal};

pub async fn find_song(db: &Surreal<Any>, song_id: &str) -> Result<Option<SongRecord>, Error> {
    let song_thing = create_song_thing(song_id);
    let mut response = db
        .query("SELECT * FROM $song_id;")
        .bind(("song_id", song_thing))
        .await?;
    let song: Option<SongRecord> = response.take(0)?;
    Ok(song)
}

pub async fn song_exists(db: &Surreal<Any>, song_id: &str) -> Result<bool, Error> {
    Ok(find_song(db, song_id).await?.is_some())
}
