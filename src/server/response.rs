use axum::http::header::{HeaderName, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde::Serialize;
use crate::Error;

/// Canned `{"status": ...}` replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    InternalServerError,
    Forbidden,
}

#[derive(Serialize)]
struct StatusBody {
    status: &'static str,
}

impl Status {
    pub fn code(self) -> StatusCode {
        match self {
            Status::Ok => StatusCode::OK,
            Status::NotFound => StatusCode::NOT_FOUND,
            Status::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Status::Forbidden => StatusCode::FORBIDDEN,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Status::Ok => "ok",
            Status::NotFound => "not found",
            Status::InternalServerError => "internal server error",
            Status::Forbidden => "forbidden",
        }
    }
}

/// Headers set on every JSON response.
pub fn json_headers() -> [(HeaderName, &'static str); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
        (CONTENT_TYPE, "application/json"),
        (X_CONTENT_TYPE_OPTIONS, "nosniff"),
    ]
}

/// Serializes `body` into a JSON response with the standard headers.
pub fn json<T: Serialize>(code: StatusCode, body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(text) => (code, json_headers(), text).into_response(),
        Err(e) => {
            error!("Failed to encode response body: {}", e);
            Status::InternalServerError.into_response()
        }
    }
}

impl IntoResponse for Status {
    fn into_response(self) -> Response {
        json(self.code(), &StatusBody { status: self.reason() })
    }
}

impl From<&Error> for Status {
    fn from(e: &Error) -> Self {
        match e {
            Error::NotFound => Status::NotFound,
            Error::Forbidden => Status::Forbidden,
            // Malformed ids and bodies are reported as server errors.
            Error::InvalidId(_)
            | Error::Malformed(_)
            | Error::Internal(_)
            | Error::Io(_)
            | Error::Serialization(_) => Status::InternalServerError,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = Status::from(&self);
        if status == Status::InternalServerError {
            warn!("Request failed: {}", self);
        }
        status.into_response()
    }
}
