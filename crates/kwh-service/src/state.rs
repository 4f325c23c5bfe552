//! Application state.

use std::sync::Arc;
use std::time::Duration;

use kwh_forecast::{BillPredictor, PredictorPaths};
use kwh_store::Store;

use crate::config::ServiceConfig;
use crate::gemini::GeminiClient;
use crate::identity::{FirebaseIdentity, IdentityProvider};
use crate::mailer::{DisabledMailer, Mailer, SmtpMailer};
use crate::otp::OtpService;
use crate::recommend::{RecommendClient, RecommendationProxy};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: ServiceConfig,

    /// The storage backend.
    pub store: Arc<dyn Store>,

    /// Identity provider for token checks and password changes.
    pub identity: Arc<dyn IdentityProvider>,

    /// Outbound mail.
    pub mailer: Arc<dyn Mailer>,

    /// Gemini client for wattage lookups (optional).
    pub gemini: Option<Arc<GeminiClient>>,

    /// Recommendation Space proxy (optional).
    pub recommender: Option<Arc<RecommendationProxy>>,

    /// Bill predictor.
    pub predictor: Arc<BillPredictor>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        // Identity provider
        let new_identity = || {
            FirebaseIdentity::new(
                config.firebase_project_id.clone(),
                config.identity_api_url.clone(),
                config.identity_jwks_url.clone(),
            )
        };
        let identity = match &config.firebase_credentials {
            Some(key) => match new_identity().with_service_account(key) {
                Ok(identity) => {
                    tracing::info!(
                        client_email = %key.client_email,
                        "Identity admin API authenticated"
                    );
                    identity
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to load Firebase service account");
                    new_identity()
                }
            },
            None => {
                tracing::warn!(
                    "Firebase service account not configured - admin calls are unauthenticated"
                );
                new_identity()
            }
        };
        if config.firebase_project_id.is_empty() {
            tracing::warn!("Firebase project not configured - token verification will fail");
        }

        // Mailer
        let mailer: Arc<dyn Mailer> = match &config.smtp_url {
            Some(url) => match SmtpMailer::from_url(url, &config.mail_from) {
                Ok(mailer) => {
                    tracing::info!("SMTP mailer enabled");
                    Arc::new(mailer)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create SMTP mailer");
                    Arc::new(DisabledMailer)
                }
            },
            None => {
                tracing::warn!("SMTP not configured - password reset emails will fail");
                Arc::new(DisabledMailer)
            }
        };

        // Gemini client if configured
        let gemini = config.genai_api_key.as_ref().and_then(|key| {
            match GeminiClient::new(&config.gemini_api_url, key, &config.gemini_model) {
                Ok(client) => {
                    tracing::info!(model = %config.gemini_model, "Gemini wattage lookup enabled");
                    Some(Arc::new(client))
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to create Gemini client");
                    None
                }
            }
        });

        if gemini.is_none() {
            tracing::warn!("Gemini not configured - wattage lookup will not be available");
        }

        // Recommendation Space
        let recommender = match RecommendClient::new(
            &config.recommend_space_url,
            Duration::from_secs(config.request_timeout_seconds),
        ) {
            Ok(client) => Some(Arc::new(RecommendationProxy::new(client))),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create recommendation client");
                None
            }
        };

        let predictor = Arc::new(BillPredictor::new(PredictorPaths {
            model: config.model_path.clone().into(),
            history: config.history_csv_path.clone().into(),
            rates: config.rates_json_path.clone().into(),
        }));

        Self {
            config,
            store,
            identity: Arc::new(identity),
            mailer,
            gemini,
            recommender,
            predictor,
        }
    }

    /// Replace the identity provider.
    #[must_use]
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    /// Replace the mailer.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = mailer;
        self
    }

    /// Check if Gemini is configured.
    #[must_use]
    pub fn has_gemini(&self) -> bool {
        self.gemini.is_some()
    }

    /// Password-reset service over this state's store, identity and mailer.
    #[must_use]
    pub fn otp_service(&self) -> OtpService {
        OtpService::new(
            self.store.clone(),
            self.identity.clone(),
            self.mailer.clone(),
        )
    }
}
