use axum::{extract::rejection::JsonRejection, extract::FromRequest};

use crate::Error;

/// JSON body extractor whose rejections render as the error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidInput {
            reason: rejection.body_text(),
        }
    }
}
