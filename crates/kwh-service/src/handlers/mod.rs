//! API handlers.

use serde::Serialize;

pub mod auth;
pub mod health;
pub mod password;
pub mod predict;
pub mod recommend;
pub mod wattage;

/// `{success, message}` reply shared by several endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Human-readable outcome.
    pub message: String,
}

impl MessageResponse {
    /// A successful reply.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
