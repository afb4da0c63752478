use axum::{routing::get, Router};

use crate::{controllers::song_controller::SongController, AppState};

pub struct SongRoutes;

impl SongRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route(
                "/",
                get(SongController::list_songs).post(SongController::create_song),
            )
            .route(
                "/{song_id}",
                get(SongController::get_song).delete(SongController::delete_song),
            )
    }
}
