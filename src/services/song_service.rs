use chrono::Utc;
use surrealdb::sql::Datetime;
use surrealdb::{engine::any::Any, Surreal};

use crate::{
    helpers::{
        song_helpers::find_song,
        thing_helpers::{create_song_thing, SONG_TABLE},
    },
    models::song::{
        CreateSongRequest, Song, SongQuery, SongRecord, DEFAULT_COVER_IMAGE_URL, DEFAULT_ERA,
        DEFAULT_GENRE, DEFAULT_LANGUAGE,
    },
    Error, Result,
};

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub struct SongService;

impl SongService {
    /// Songs matching the optional exact language/genre filters, newest first.
    pub async fn list_songs(db: &Surreal<Any>, query: &SongQuery) -> Result<Vec<Song>> {
        let language = non_blank(query.language.clone());
        let genre = non_blank(query.genre.clone());

        let mut conditions = Vec::new();
        if language.is_some() {
            conditions.push("language = $language");
        }
        if genre.is_some() {
            conditions.push("genre = $genre");
        }

        let mut sql = String::from("SELECT * FROM song");
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let records: Vec<SongRecord> = db
            .query(sql)
            .bind(("language", language))
            .bind(("genre", genre))
            .await?
            .take(0)?;

        Ok(records.into_iter().map(Song::from).collect())
    }

    pub async fn get_song(db: &Surreal<Any>, song_id: &str) -> Result<Song> {
        find_song(db, song_id)
            .await?
            .map(Song::from)
            .ok_or_else(|| Error::SongNotFound {
                id: song_id.to_string(),
            })
    }

    pub async fn create_song(db: &Surreal<Any>, request: CreateSongRequest) -> Result<Song> {
        let (Some(title), Some(artist), Some(audio_url)) = (
            non_blank(request.title),
            non_blank(request.artist),
            non_blank(request.audio_url),
        ) else {
            return Err(Error::MissingFields);
        };

        let record = SongRecord {
            id: None,
            title,
            artist,
            language: non_blank(request.language).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            genre: non_blank(request.genre).unwrap_or_else(|| DEFAULT_GENRE.to_string()),
            era: non_blank(request.era).unwrap_or_else(|| DEFAULT_ERA.to_string()),
            audio_url,
            cover_image_url: non_blank(request.cover_image_url)
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE_URL.to_string()),
            duration_seconds: request.duration_seconds.unwrap_or(0),
            lyrics: non_blank(request.lyrics),
            created_at: Datetime::from(Utc::now()),
        };

        let created: Option<SongRecord> = db.create(SONG_TABLE).content(record).await?;
        let song = created
            .map(Song::from)
            .ok_or_else(|| Error::DbError("Could not create song".to_string()))?;

        tracing::info!(song_id = %song.id, title = %song.title, "song created");
        Ok(song)
    }

    /// Deletes a song and every junction row pointing at it.
    pub async fn delete_song(db: &Surreal<Any>, song_id: &str) -> Result<()> {
        if find_song(db, song_id).await?.is_none() {
            return Err(Error::SongNotFound {
                id: song_id.to_string(),
            });
        }

        db.query("DELETE playlist_song WHERE out = $song; DELETE $song;")
            .bind(("song", create_song_thing(song_id)))
            .await?
            .check()?;

        tracing::info!(song_id, "song deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surrealdb::engine::any::connect;

    async fn setup_db() -> Surreal<Any> {
        let db = connect("mem://").await.unwrap();
        db.use_ns("test").use_db("test").await.unwrap();
        db
    }

    fn request(title: &str, artist: &str, language: &str) -> CreateSongRequest {
        CreateSongRequest {
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            audio_url: Some(format!("https://example.com/{title}.mp3")),
            language: Some(language.to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_song_applies_defaults() {
        let db = setup_db().await;

        let song = SongService::create_song(
            &db,
            CreateSongRequest {
                title: Some("Tumar Kotha".to_string()),
                artist: Some("Zubeen Garg".to_string()),
                audio_url: Some("https://example.com/1.mp3".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(!song.id.is_empty());
        assert_eq!(song.language, DEFAULT_LANGUAGE);
        assert_eq!(song.cover_image_url, DEFAULT_COVER_IMAGE_URL);
        assert_eq!(song.genre, DEFAULT_GENRE);
        assert_eq!(song.era, DEFAULT_ERA);
        assert_eq!(song.duration_seconds, 0);
        assert_eq!(song.lyrics, None);
    }

    #[tokio::test]
    async fn test_create_song_requires_fields() {
        let db = setup_db().await;

        let result = SongService::create_song(
            &db,
            CreateSongRequest {
                title: Some("No artist".to_string()),
                artist: Some("   ".to_string()),
                audio_url: Some("https://example.com/x.mp3".to_string()),
                ..Default::default()
            },
        )
        .await;

        assert!(matches!(result, Err(Error::MissingFields)));
        let all = SongService::list_songs(&db, &SongQuery::default()).await.unwrap();
        assert!(all.is_empty());
    }

    #[tokio::test]
    async fn test_list_songs_filters_and_orders_newest_first() {
        let db = setup_db().await;

        SongService::create_song(&db, request("first", "A", "Hindi")).await.unwrap();
        SongService::create_song(&db, request("second", "B", "Assamese")).await.unwrap();
        SongService::create_song(&db, request("third", "C", "Hindi")).await.unwrap();

        let all = SongService::list_songs(&db, &SongQuery::default()).await.unwrap();
        let titles: Vec<_> = all.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let hindi = SongService::list_songs(
            &db,
            &SongQuery {
                language: Some("Hindi".to_string()),
                genre: None,
            },
        )
        .await
        .unwrap();
        let titles: Vec<_> = hindi.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["third", "first"]);

        let none = SongService::list_songs(
            &db,
            &SongQuery {
                language: Some("Hindi".to_string()),
                genre: Some("Bollywood".to_string()),
            },
        )
        .await
        .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete_song() {
        let db = setup_db().await;
        let song = SongService::create_song(&db, request("gone", "A", "English"))
            .await
            .unwrap();

        SongService::delete_song(&db, &song.id).await.unwrap();
        assert!(matches!(
            SongService::get_song(&db, &song.id).await,
            Err(Error::SongNotFound { .. })
        ));

        assert!(matches!(
            SongService::delete_song(&db, &song.id).await,
            Err(Error::SongNotFound { .. })
        ));
    }
}
