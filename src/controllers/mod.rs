pub mod auth_controller;
pub mod health_controller;
pub mod playlist_controller;
pub mod song_controller;
