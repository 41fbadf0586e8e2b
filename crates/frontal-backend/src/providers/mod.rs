//! External collaborators the backend talks to over HTTP.
//!
//! Every collaborator is a trait so services can be exercised without the
//! network, plus one implementation for the hosted provider the app uses.

pub mod auth;
pub mod chat;
pub mod store;

/// Extracts a human-readable message from an error response body, falling
/// back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct Nested {
        message: String,
    }

    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum ErrorBody {
        Wrapped { error: Nested },
        Flat { message: String },
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Wrapped { error }) => error.message,
        Ok(ErrorBody::Flat { message }) => message,
        Err(_) => body.trim().to_string(),
    }
}
