pub mod auth_routes;
pub mod playlist_routes;
pub mod song_routes;
