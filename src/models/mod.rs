pub mod api_response;
pub mod playlist;
pub mod song;
pub mod user;
