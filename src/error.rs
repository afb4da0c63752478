use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::models::api_response::ApiResponse;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, Serialize, strum_macros::AsRefStr)]
#[serde(tag = "type", content = "data")]
pub enum Error {
    // -- Config errors.
    EnvVarError(String),
    ConfigInvalid { key: String },

    // -- Auth errors.
    AuthFailNoAuthToken,
    InvalidToken,
    TokenCreationError,
    PasswordHashError,
    InvalidCredentials,
    UsernameTaken { username: String },
    EmailTaken { email: String },

    // -- Validation errors.
    MissingFields,
    InvalidInput { reason: String },

    // -- Model errors.
    SongNotFound { id: String },
    PlaylistNotFound { id: String },
    PlaylistForbidden { id: String },
    SongAlreadyInPlaylist { song_id: String, playlist_id: String },

    RateLimited,
    DbError(String),
    Io(String),
}

impl core::fmt::Display for Error {
    fn fmt(&self, fmt: &mut core::fmt::Formatter) -> core::result::Result<(), core::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status_code, client_error) = self.client_status_and_error();

        if status_code.is_server_error() {
            tracing::error!(error = %self, code = client_error.as_ref(), "request failed");
        } else {
            tracing::debug!(error = %self, code = client_error.as_ref(), "request rejected");
        }

        (status_code, ApiResponse::<()>::error(self.client_message())).into_response()
    }
}

impl Error {
    pub fn client_status_and_error(&self) -> (StatusCode, ClientError) {
        match self {
            Self::AuthFailNoAuthToken => (StatusCode::UNAUTHORIZED, ClientError::NO_AUTH),
            Self::InvalidToken => (StatusCode::FORBIDDEN, ClientError::NO_AUTH),
            Self::InvalidCredentials => (StatusCode::BAD_REQUEST, ClientError::LOGIN_FAIL),

            Self::UsernameTaken { .. }
            | Self::EmailTaken { .. }
            | Self::MissingFields
            | Self::InvalidInput { .. } => (StatusCode::BAD_REQUEST, ClientError::INVALID_PARAMS),

            Self::SongAlreadyInPlaylist { .. } => (StatusCode::BAD_REQUEST, ClientError::DUPLICATE),

            Self::SongNotFound { .. } | Self::PlaylistNotFound { .. } => {
                (StatusCode::NOT_FOUND, ClientError::RESOURCE_NOT_FOUND)
            }
            Self::PlaylistForbidden { .. } => (StatusCode::FORBIDDEN, ClientError::FORBIDDEN),

            Self::RateLimited => (StatusCode::TOO_MANY_REQUESTS, ClientError::RATE_LIMITED),

            Self::EnvVarError(_)
            | Self::ConfigInvalid { .. }
            | Self::TokenCreationError
            | Self::PasswordHashError
            | Self::DbError(_)
            | Self::Io(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ClientError::SERVICE_ERROR,
            ),
        }
    }

    /// Message placed in the error envelope. Never leaks store or config details.
    pub fn client_message(&self) -> String {
        match self {
            Self::AuthFailNoAuthToken => "Access Denied. No token provided.".to_string(),
            Self::InvalidToken => "Invalid or expired token.".to_string(),
            Self::InvalidCredentials => "Invalid credentials".to_string(),
            Self::UsernameTaken { .. } => "Username is already taken".to_string(),
            Self::EmailTaken { .. } => "Email is already registered".to_string(),
            Self::MissingFields => "Missing required fields".to_string(),
            Self::InvalidInput { reason } => reason.clone(),
            Self::SongNotFound { .. } => "Song not found".to_string(),
            Self::PlaylistNotFound { .. } => "Playlist not found".to_string(),
            Self::PlaylistForbidden { .. } => "You do not own this playlist".to_string(),
            Self::SongAlreadyInPlaylist { .. } => "Song already in playlist".to_string(),
            Self::RateLimited => "Too many requests".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

#[derive(Debug, strum_macros::AsRefStr)]
#[allow(non_camel_case_types)]
pub enum ClientError {
    LOGIN_FAIL,
    NO_AUTH,
    FORBIDDEN,
    INVALID_PARAMS,
    DUPLICATE,
    RATE_LIMITED,
    SERVICE_ERROR,
    RESOURCE_NOT_FOUND,
}

impl From<surrealdb::Error> for Error {
    fn from(err: surrealdb::Error) -> Self {
        Error::DbError(err.to_string())
    }
}

impl From<std::env::VarError> for Error {
    fn from(err: std::env::VarError) -> Self {
        Error::EnvVarError(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(_: bcrypt::BcryptError) -> Self {
        Error::PasswordHashError
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
