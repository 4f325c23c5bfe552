//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{auth, health, password, predict, recommend, wattage};
use crate::state::AppState;

/// Maximum concurrent requests for API endpoints.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Sign-in
/// - `POST /api/verify-login-token/` - Verify an email/password ID token
/// - `POST /api/verify-google-token/` - Verify a Google sign-in ID token
///
/// ## Password reset
/// - `POST /api/send-otp-reset-password/` - Email a reset code
/// - `POST /api/verify-otp-and-reset-password/` - Redeem a code
///
/// ## Energy
/// - `GET /api/get-wattage/` - Appliance wattage estimate
/// - `GET /api/predict/` - Next bill prediction
/// - `POST /api/recommend/` - Energy-saving advice (one at a time)
///
/// ## Admin (`X-Admin-Key`)
/// - `POST /api/predict/reload/` - Reload the bill model
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/verify-login-token/", post(auth::verify_login_token))
        .route("/verify-google-token/", post(auth::verify_google_token))
        .route("/send-otp-reset-password/", post(password::send_otp))
        .route(
            "/verify-otp-and-reset-password/",
            post(password::verify_otp_and_reset),
        )
        .route("/get-wattage/", get(wattage::get_wattage))
        .route("/predict/", get(predict::predict))
        .route("/predict/reload/", post(predict::reload_model))
        .route("/recommend/", post(recommend::recommend))
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .nest("/api", api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
