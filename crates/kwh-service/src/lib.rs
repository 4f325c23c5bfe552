//! kWh tracker HTTP API service.
//!
//! This crate provides the HTTP API behind the kWh tracker app, including:
//!
//! - Firebase ID-token verification for email and Google sign-in
//! - Password reset through emailed one-time codes
//! - Appliance wattage estimates from Gemini
//! - Energy-saving recommendations from a hosted Gradio Space
//! - Monthly bill prediction
//!
//! # Authentication
//!
//! End users authenticate with the identity provider directly; the service
//! only verifies the resulting ID tokens. Operational endpoints take an
//! `X-Admin-Key` header.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for the router

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod gemini;
pub mod handlers;
pub mod identity;
pub mod mailer;
pub mod otp;
pub mod recommend;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use gemini::{GeminiClient, GeminiError};
pub use identity::{FirebaseIdentity, IdentityError, IdentityProvider, UserRecord, VerifiedToken};
pub use mailer::{DisabledMailer, MailError, Mailer, SmtpMailer};
pub use otp::OtpService;
pub use recommend::{RecommendClient, RecommendError, RecommendationProxy};
pub use routes::create_router;
pub use state::AppState;
