//! Common test utilities for kwh-service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use kwh_service::identity::IdentityError;
use kwh_service::mailer::MailError;
use kwh_service::{
    create_router, AppState, IdentityProvider, Mailer, ServiceConfig, UserRecord, VerifiedToken,
};
use kwh_store::RocksStore;

/// Admin key configured for every harness.
pub const ADMIN_KEY: &str = "test-admin-key";

/// A registered test account.
pub const USER_EMAIL: &str = "user@example.com";
/// Its user ID.
pub const USER_UID: &str = "uid-user-1";
/// A token the fake provider accepts for it.
pub const USER_TOKEN: &str = "valid-token";

/// Identity provider with one account and one accepted token.
#[derive(Default)]
pub struct FakeIdentity {
    /// Passwords set through `update_password`, in call order.
    pub passwords: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedToken, IdentityError> {
        if id_token == USER_TOKEN {
            Ok(VerifiedToken {
                uid: USER_UID.into(),
                email: Some(USER_EMAIL.into()),
            })
        } else {
            Err(IdentityError::InvalidToken(
                "ID token has invalid signature".into(),
            ))
        }
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, IdentityError> {
        Ok(email.eq_ignore_ascii_case(USER_EMAIL).then(|| UserRecord {
            uid: USER_UID.into(),
            email: Some(USER_EMAIL.into()),
            disabled: false,
            valid_since: None,
        }))
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>, IdentityError> {
        if uid == USER_UID {
            self.get_user_by_email(USER_EMAIL).await
        } else {
            Ok(None)
        }
    }

    async fn update_password(&self, uid: &str, password: &str) -> Result<(), IdentityError> {
        self.passwords
            .lock()
            .unwrap()
            .push((uid.into(), password.into()));
        Ok(())
    }
}

/// A message captured by [`RecordingMailer`].
#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Mailer that keeps every message in memory.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<SentMail>>,
    /// When set, every send fails as if SMTP were unreachable.
    pub failing: AtomicBool,
}

impl RecordingMailer {
    /// Number of messages sent so far.
    pub fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    /// The six-digit code in the most recent message.
    pub fn last_code(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let body = &sent.last().expect("no mail sent").body;
        body.split(|c: char| !c.is_ascii_digit())
            .find(|word| word.len() == 6)
            .expect("no code in mail")
            .to_string()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailError::NotConfigured);
        }
        self.sent.lock().unwrap().push(SentMail {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        });
        Ok(())
    }
}

/// One tree on `Month`: months below 4.5 score 10.0, others 12.0, plus a
/// base score of 0.5.
pub const MODEL_JSON: &str = r#"{"learner": {
    "feature_names": ["Month", "Inflation Rate", "Generation Charge", "Avg_Temperature",
        "Total_Bill_Lag1", "Generation_Charge_Lag1", "Inflation_Lag1", "Avg_Temp_Lag1",
        "Total_Bill_Rolling3", "Gen_Charge_Rolling3", "Inflation_Rolling3", "Temp_Rolling3",
        "Is_Hot_Season", "Is_Cold_Season"],
    "gradient_booster": {"name": "gbtree", "model": {"trees": [{
        "left_children": [1, -1, -1],
        "right_children": [2, -1, -1],
        "split_indices": [0, 0, 0],
        "split_conditions": [4.5, 10.0, 12.0],
        "default_left": [0, 0, 0]
    }]}},
    "learner_model_param": {"base_score": "5E-1", "num_feature": "14"},
    "objective": {"name": "reg:squarederror"}
}}"#;

/// Rates with April above and May below the overall mean.
pub const RATES_JSON: &str = r#"[
    {"Year": 2023, "Month": 4, "Total Bill": 11.0},
    {"Year": 2023, "Month": 5, "Total Bill": 9.0},
    {"Year": 2024, "Month": 4, "Total Bill": 11.5},
    {"Year": 2024, "Month": 5, "Total Bill": 8.5}
]"#;

/// 27 monthly rows from 2022-01 to 2024-03.
pub fn history_csv() -> String {
    let mut csv =
        String::from("Year,Month,Inflation Rate,Generation Charge,Avg_Temperature,Total Bill\n");
    for i in 0..27_u32 {
        let year = 2022 + i / 12;
        let month = i % 12 + 1;
        let t = f64::from(i);
        writeln!(
            csv,
            "{year},{month},{:.2},{:.2},{:.1},{:.2}",
            4.0 + 0.05 * t,
            6.0 + 0.02 * t,
            27.0 + f64::from(month % 6),
            10.0 + 0.1 * t
        )
        .unwrap();
    }
    csv
}

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Direct handle on the store behind the server.
    pub store: Arc<RocksStore>,
    /// The fake identity provider.
    pub identity: Arc<FakeIdentity>,
    /// Captured outgoing mail.
    pub mailer: Arc<RecordingMailer>,
    /// Configuration the server was built with.
    pub config: ServiceConfig,
    /// Temporary directory for the database and data files (kept alive for test duration).
    pub _temp_dir: TempDir,
}

impl TestHarness {
    /// Create a new test harness with a fresh database and data files.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a harness, letting the caller adjust the configuration.
    pub fn with_config(configure: impl FnOnce(&mut ServiceConfig)) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = |name: &str| temp_dir.path().join(name).to_string_lossy().to_string();

        std::fs::write(path("model.json"), MODEL_JSON).unwrap();
        std::fs::write(path("history.csv"), history_csv()).unwrap();
        std::fs::write(path("rates.json"), RATES_JSON).unwrap();

        let mut config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            data_dir: path("db"),
            firebase_project_id: "demo-project".into(),
            // Nothing listens here; tests that need an upstream override it.
            recommend_space_url: "http://127.0.0.1:9".into(),
            identity_api_url: "http://127.0.0.1:9".into(),
            identity_jwks_url: "http://127.0.0.1:9/jwks".into(),
            model_path: path("model.json"),
            history_csv_path: path("history.csv"),
            rates_json_path: path("rates.json"),
            admin_api_key: Some(ADMIN_KEY.into()),
            request_timeout_seconds: 30,
            ..ServiceConfig::default()
        };
        configure(&mut config);

        let store = Arc::new(RocksStore::open(&config.data_dir).expect("Failed to open store"));
        let identity = Arc::new(FakeIdentity::default());
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState::new(store.clone(), config.clone())
            .with_identity(identity.clone())
            .with_mailer(mailer.clone());
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            store,
            identity,
            mailer,
            config,
            _temp_dir: temp_dir,
        }
    }

    /// Path of a file in the harness directory.
    pub fn file(&self, name: &str) -> std::path::PathBuf {
        self._temp_dir.path().join(name)
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
