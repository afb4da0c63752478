use std::fmt;

pub type Result<T> = core::result::Result<T, Error>;

/// Failures seen by the client library. None of them are retried; callers
/// surface [`Error::notice`] to the user.
#[derive(Debug, Clone, PartialEq, strum_macros::AsRefStr)]
pub enum Error {
    Network(String),
    Api { status: u16, message: String },
    InvalidPayload(String),
    Storage(String),
    Media { url: String, reason: String },
    NotAuthenticated,
    InvalidForm(String),
    EmptyQueue,
    IndexOutOfRange { index: usize, len: usize },
    SessionClosed,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(reason) => write!(f, "network error: {reason}"),
            Self::Api { status, message } => write!(f, "api error {status}: {message}"),
            Self::InvalidPayload(reason) => write!(f, "invalid payload: {reason}"),
            Self::Storage(reason) => write!(f, "storage error: {reason}"),
            Self::Media { url, reason } => write!(f, "could not load {url}: {reason}"),
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::InvalidForm(reason) => write!(f, "invalid form: {reason}"),
            Self::EmptyQueue => write!(f, "queue is empty"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} is outside a queue of {len}")
            }
            Self::SessionClosed => write!(f, "playback session closed"),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Short text suitable for an alert shown to the user.
    pub fn notice(&self) -> String {
        match self {
            Self::Network(_) => "Check your network connection.".to_string(),
            Self::Api { message, .. } => message.clone(),
            Self::InvalidPayload(_) => "The server sent an unexpected response.".to_string(),
            Self::Storage(_) => "Could not access local storage.".to_string(),
            Self::Media { .. } => "Could not play this track.".to_string(),
            Self::NotAuthenticated => "Please log in first.".to_string(),
            Self::InvalidForm(reason) => reason.clone(),
            Self::EmptyQueue | Self::IndexOutOfRange { .. } => "Nothing to play.".to_string(),
            Self::SessionClosed => "Playback not connected.".to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::InvalidPayload(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Storage(err.to_string())
    }
}
