use axum::{
    routing::{get, post},
    Router,
};

use crate::{controllers::playlist_controller::PlaylistController, AppState};

pub struct PlaylistRoutes;

impl PlaylistRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route(
                "/",
                get(PlaylistController::get_my_playlists).post(PlaylistController::create_playlist),
            )
            .route("/add-song", post(PlaylistController::add_song_to_playlist))
    }
}
