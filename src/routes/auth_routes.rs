use axum::{routing::post, Router};

use crate::controllers::auth_controller::{login_handler, register_handler};
use crate::AppState;

pub struct AuthRoutes;

impl AuthRoutes {
    pub fn routes() -> Router<AppState> {
        Router::new()
            .route("/register", post(register_handler))
            .route("/login", post(login_handler))
    }
}
