//! Request and response payloads exposed over HTTP (camelCase JSON).

pub mod auth;
pub mod measurement;
pub mod sensor;
pub mod series;
pub mod timestamp;

use serde::Serialize;

/// Plain `{"message": ...}` acknowledgement.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
