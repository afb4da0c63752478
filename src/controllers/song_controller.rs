use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    extract::AppJson,
    error::Result,
    models::{
        api_response::ApiResponse,
        song::{CreateSongRequest, Song, SongQuery},
    },
    services::song_service::SongService,
    AppState,
};

pub struct SongController;

impl SongController {
    pub async fn list_songs(
        State(state): State<AppState>,
        Query(query): Query<SongQuery>,
    ) -> Result<ApiResponse<Vec<Song>>> {
        let songs = SongService::list_songs(&state.db, &query).await?;
        Ok(ApiResponse::success(songs))
    }

    pub async fn get_song(
        State(state): State<AppState>,
        Path(song_id): Path<String>,
    ) -> Result<ApiResponse<Song>> {
        let song = SongService::get_song(&state.db, &song_id).await?;
        Ok(ApiResponse::success(song))
    }

    pub async fn create_song(
        State(state): State<AppState>,
        AppJson(payload): AppJson<CreateSongRequest>,
    ) -> Result<(StatusCode, ApiResponse<Song>)> {
        let song = SongService::create_song(&state.db, payload).await?;
        Ok((StatusCode::CREATED, ApiResponse::success(song)))
    }

    pub async fn delete_song(
        State(state): State<AppState>,
        Path(song_id): Path<String>,
    ) -> Result<ApiResponse<()>> {
        SongService::delete_song(&state.db, &song_id).await?;
        Ok(ApiResponse::message("Song deleted"))
    }
}
