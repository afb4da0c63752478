use axum::{extract::State, http::StatusCode, Extension};

use crate::{
    extract::AppJson,
    middlewares::mw_auth::Ctx,
    models::{
        api_response::ApiResponse,
        playlist::{AddSongRequest, CreatePlaylistRequest, Playlist, PlaylistSong},
    },
    services::playlist_service::PlaylistService,
    AppState, Error,
};

pub struct PlaylistController;

impl PlaylistController {
    /// Playlists of the authenticated caller.
    pub async fn get_my_playlists(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
    ) -> Result<ApiResponse<Vec<Playlist>>, Error> {
        let playlists = PlaylistService::get_user_playlists(&state.db, &ctx.user_id).await?;
        Ok(ApiResponse::success(playlists))
    }

    pub async fn create_playlist(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        AppJson(payload): AppJson<CreatePlaylistRequest>,
    ) -> Result<(StatusCode, ApiResponse<Playlist>), Error> {
        let playlist = PlaylistService::create_playlist(&state.db, &ctx.user_id, payload).await?;
        Ok((StatusCode::CREATED, ApiResponse::success(playlist)))
    }

    pub async fn add_song_to_playlist(
        State(state): State<AppState>,
        Extension(ctx): Extension<Ctx>,
        AppJson(payload): AppJson<AddSongRequest>,
    ) -> Result<(StatusCode, ApiResponse<PlaylistSong>), Error> {
        let row = PlaylistService::add_song_to_playlist(&state.db, &ctx.user_id, payload).await?;
        Ok((StatusCode::CREATED, ApiResponse::success(row)))
    }
}
