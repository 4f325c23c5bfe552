//! Firebase Authentication client.
//!
//! ID tokens are verified locally against the `securetoken` JWKS, then the
//! account is looked up through the Identity Toolkit admin API to check for
//! revocation. Admin calls authenticate with an OAuth2 access token minted
//! from a service-account key.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};

use super::{IdentityError, IdentityProvider, UserRecord, VerifiedToken};

// ============================================================================
// Constants
// ============================================================================

/// How long to cache JWKS keys before refreshing.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600); // 1 hour

/// Shortest gap between JWKS fetches triggered by an unknown `kid`.
const JWKS_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Timeout for identity-provider requests.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Allowed clock skew when checking `exp` and `iat`.
const CLOCK_SKEW_SECONDS: u64 = 10;

/// Refresh cached access tokens this long before they expire.
const ACCESS_TOKEN_REFRESH_MARGIN_SECONDS: i64 = 60;

/// Lifetime requested for service-account assertions.
const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

const ADMIN_SCOPES: &str =
    "https://www.googleapis.com/auth/identitytoolkit https://www.googleapis.com/auth/cloud-platform";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

// ============================================================================
// Service account
// ============================================================================

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

/// A Google service-account key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Project the account belongs to.
    pub project_id: String,
    /// Service account email, used as the assertion issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// OAuth2 token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

struct ServiceAccountSigner {
    client_email: String,
    token_uri: String,
    encoding_key: EncodingKey,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

struct AccessToken {
    token: String,
    expires_at: i64,
}

// ============================================================================
// JWKS
// ============================================================================

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    kid: Option<String>,
    n: Option<String>,
    e: Option<String>,
}

struct JwksCache {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl JwksCache {
    fn is_expired(&self) -> bool {
        self.fetched_at
            .map_or(true, |at| at.elapsed() >= JWKS_CACHE_DURATION)
    }

    /// Look up `kid` in a fresh cache.
    ///
    /// `None` means the keys should be fetched. A key missing from a cache
    /// fetched within the last minute is an error without a new fetch.
    fn lookup(&self, kid: &str) -> Option<Result<DecodingKey, IdentityError>> {
        if self.is_expired() {
            return None;
        }
        if let Some(key) = self.keys.get(kid) {
            return Some(Ok(key.clone()));
        }
        let recent = self
            .fetched_at
            .map_or(false, |at| at.elapsed() < JWKS_MIN_REFRESH_INTERVAL);
        recent.then(|| Err(unknown_kid()))
    }
}

fn unknown_kid() -> IdentityError {
    IdentityError::InvalidToken(
        "ID token has \"kid\" claim which does not correspond to a known public key".into(),
    )
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    iat: i64,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    disabled: bool,
    #[serde(default)]
    valid_since: Option<String>,
}

impl From<LookupUser> for UserRecord {
    fn from(user: LookupUser) -> Self {
        Self {
            uid: user.local_id,
            email: user.email,
            disabled: user.disabled,
            valid_since: user.valid_since.and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

// ============================================================================
// Client
// ============================================================================

/// Firebase Authentication client.
pub struct FirebaseIdentity {
    client: Client,
    project_id: String,
    api_url: String,
    jwks_url: String,
    signer: Option<ServiceAccountSigner>,
    jwks: RwLock<JwksCache>,
    access_token: Mutex<Option<AccessToken>>,
}

impl FirebaseIdentity {
    /// Create a client for `project_id`.
    ///
    /// # Arguments
    ///
    /// * `api_url` - Identity Toolkit base URL
    /// * `jwks_url` - ID-token signing key endpoint
    pub fn new(
        project_id: impl Into<String>,
        api_url: impl Into<String>,
        jwks_url: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            project_id: project_id.into(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            jwks_url: jwks_url.into(),
            signer: None,
            jwks: RwLock::new(JwksCache {
                keys: HashMap::new(),
                fetched_at: None,
            }),
            access_token: Mutex::new(None),
        }
    }

    /// Authenticate admin calls with a service-account key.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Configuration` if the private key is not a
    /// valid RSA PEM.
    pub fn with_service_account(mut self, key: &ServiceAccountKey) -> Result<Self, IdentityError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| {
                IdentityError::Configuration(format!("invalid service account key: {e}"))
            })?;

        self.signer = Some(ServiceAccountSigner {
            client_email: key.client_email.clone(),
            token_uri: key.token_uri.clone(),
            encoding_key,
        });
        Ok(self)
    }

    /// Whether admin calls carry service-account credentials.
    #[must_use]
    pub fn has_service_account(&self) -> bool {
        self.signer.is_some()
    }

    fn issuer(&self) -> String {
        format!("https://securetoken.google.com/{}", self.project_id)
    }

    fn admin_url(&self, action: &str) -> String {
        format!(
            "{}/v1/projects/{}/accounts:{action}",
            self.api_url, self.project_id
        )
    }

    /// Get a decoding key from cache or fetch from the JWKS endpoint.
    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        if let Some(found) = self.jwks.read().await.lookup(kid) {
            return found;
        }

        // Cache miss or expired. Holding the write lock across the fetch
        // keeps concurrent misses to one request.
        let mut cache = self.jwks.write().await;
        if let Some(found) = cache.lookup(kid) {
            return found;
        }

        let jwks = self.fetch_jwks().await?;
        cache.keys = jwks
            .keys
            .iter()
            .filter_map(|jwk| Some((jwk.kid.clone()?, jwk_to_decoding_key(jwk)?)))
            .collect();
        cache.fetched_at = Some(Instant::now());

        cache.keys.get(kid).cloned().ok_or_else(unknown_kid)
    }

    async fn fetch_jwks(&self) -> Result<Jwks, IdentityError> {
        tracing::debug!(url = %self.jwks_url, "Fetching JWKS");

        let response = self.client.get(&self.jwks_url).send().await?;
        let jwks: Jwks = handle_response(response).await?;

        tracing::info!(keys_count = jwks.keys.len(), "JWKS fetched successfully");
        Ok(jwks)
    }

    /// Current admin access token, minting a new one when the cached token
    /// is close to expiry.
    async fn access_token(&self) -> Result<Option<String>, IdentityError> {
        let Some(signer) = &self.signer else {
            return Ok(None);
        };

        let mut cached = self.access_token.lock().await;
        let now = Utc::now().timestamp();
        if let Some(token) = cached.as_ref() {
            if token.expires_at - ACCESS_TOKEN_REFRESH_MARGIN_SECONDS > now {
                return Ok(Some(token.token.clone()));
            }
        }

        let claims = AssertionClaims {
            iss: &signer.client_email,
            scope: ADMIN_SCOPES,
            aud: &signer.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signer.encoding_key)
            .map_err(|e| IdentityError::Configuration(format!("failed to sign assertion: {e}")))?;

        let response = self
            .client
            .post(&signer.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = handle_response(response).await?;

        tracing::debug!(expires_in = token.expires_in, "Minted identity admin access token");

        *cached = Some(AccessToken {
            token: token.access_token.clone(),
            expires_at: now + token.expires_in,
        });
        Ok(Some(token.access_token))
    }

    async fn admin_call<T: serde::de::DeserializeOwned>(
        &self,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<T, IdentityError> {
        if self.project_id.is_empty() {
            return Err(IdentityError::Configuration(
                "Firebase project ID is not configured".into(),
            ));
        }

        let mut request = self.client.post(self.admin_url(action)).json(body);
        if let Some(token) = self.access_token().await? {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        handle_response(response).await
    }

    async fn lookup(&self, body: serde_json::Value) -> Result<Option<UserRecord>, IdentityError> {
        let response: LookupResponse = self.admin_call("lookup", &body).await?;
        Ok(response.users.into_iter().next().map(UserRecord::from))
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedToken, IdentityError> {
        if self.project_id.is_empty() {
            return Err(IdentityError::Configuration(
                "Firebase project ID is not configured".into(),
            ));
        }

        let header = decode_header(id_token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode ID token header");
            IdentityError::InvalidToken(format!("malformed ID token: {e}"))
        })?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::InvalidToken(format!(
                "ID token has incorrect algorithm, expected RS256 but got {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::InvalidToken("ID token has no \"kid\" claim".into()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[self.issuer()]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = CLOCK_SKEW_SECONDS;

        let claims = decode::<IdTokenClaims>(id_token, &key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "ID token validation failed");
                IdentityError::InvalidToken(format!("invalid ID token: {e}"))
            })?
            .claims;

        let skew = i64::try_from(CLOCK_SKEW_SECONDS).unwrap_or(0);
        if claims.iat > Utc::now().timestamp() + skew {
            return Err(IdentityError::InvalidToken(
                "ID token issued in the future".into(),
            ));
        }
        if claims.sub.is_empty() {
            return Err(IdentityError::InvalidToken(
                "ID token has an empty \"sub\" claim".into(),
            ));
        }

        // Revocation check
        let user = self
            .get_user(&claims.sub)
            .await?
            .ok_or_else(|| IdentityError::InvalidToken("no user record for ID token".into()))?;

        if user.disabled {
            return Err(IdentityError::InvalidToken(
                "the user account has been disabled".into(),
            ));
        }
        let auth_time = claims.auth_time.unwrap_or(claims.iat);
        if user.valid_since.is_some_and(|since| auth_time < since) {
            return Err(IdentityError::InvalidToken(
                "the ID token has been revoked".into(),
            ));
        }

        Ok(VerifiedToken {
            uid: claims.sub,
            email: claims.email,
        })
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, IdentityError> {
        self.lookup(serde_json::json!({ "email": [email] })).await
    }

    async fn get_user(&self, uid: &str) -> Result<Option<UserRecord>, IdentityError> {
        self.lookup(serde_json::json!({ "localId": [uid] })).await
    }

    async fn update_password(&self, uid: &str, password: &str) -> Result<(), IdentityError> {
        let _: serde_json::Value = self
            .admin_call(
                "update",
                &serde_json::json!({ "localId": uid, "password": password }),
            )
            .await?;

        tracing::info!(uid = %uid, "Password updated");
        Ok(())
    }
}

/// Decode a success body or turn an error body into `IdentityError::Api`.
async fn handle_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, IdentityError> {
    let status = response.status();

    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("HTTP {status}"),
    };

    Err(IdentityError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Convert a JWK to a `DecodingKey`.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        tracing::debug!(kty = %jwk.kty, "Skipping non-RSA JWK");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    DecodingKey::from_rsa_components(n, e).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PROJECT: &str = "demo-project";
    const SIGNING_KEY: &str = include_str!("../../tests/fixtures/signing_key.pem");
    const JWKS: &str = include_str!("../../tests/fixtures/jwks.json");

    fn sign(claims: &serde_json::Value, kid: &str) -> String {
        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(kid.into());
        let key = EncodingKey::from_rsa_pem(SIGNING_KEY.as_bytes()).unwrap();
        encode(&header, claims, &key).unwrap()
    }

    fn claims(sub: &str) -> serde_json::Value {
        let now = Utc::now().timestamp();
        json!({
            "iss": format!("https://securetoken.google.com/{PROJECT}"),
            "aud": PROJECT,
            "sub": sub,
            "iat": now - 30,
            "exp": now + 3600,
            "auth_time": now - 30,
            "email": "user@example.com"
        })
    }

    async fn mount_jwks(server: &MockServer, expected_calls: u64) {
        Mock::given(method("GET"))
            .and(path("/jwks"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(JWKS.as_bytes().to_vec(), "application/json"),
            )
            .expect(expected_calls)
            .mount(server)
            .await;
    }

    async fn mount_user(server: &MockServer, user: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(format!("/v1/projects/{PROJECT}/accounts:lookup")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [user] })))
            .mount(server)
            .await;
    }

    fn identity(server: &MockServer) -> FirebaseIdentity {
        FirebaseIdentity::new(PROJECT, server.uri(), format!("{}/jwks", server.uri()))
    }

    #[tokio::test]
    async fn verifies_valid_token() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;
        mount_user(&server, json!({ "localId": "uid-1", "email": "user@example.com" })).await;

        let verified = identity(&server)
            .verify_id_token(&sign(&claims("uid-1"), "test-key-1"))
            .await
            .unwrap();

        assert_eq!(verified.uid, "uid-1");
        assert_eq!(verified.email.as_deref(), Some("user@example.com"));
    }

    #[tokio::test]
    async fn signing_keys_are_cached() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;
        mount_user(&server, json!({ "localId": "uid-1" })).await;

        let identity = identity(&server);
        let token = sign(&claims("uid-1"), "test-key-1");
        identity.verify_id_token(&token).await.unwrap();
        identity.verify_id_token(&token).await.unwrap();
    }

    #[tokio::test]
    async fn rejects_wrong_audience() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;

        let mut claims = claims("uid-1");
        claims["aud"] = json!("another-project");

        let result = identity(&server)
            .verify_id_token(&sign(&claims, "test-key-1"))
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;

        let mut claims = claims("uid-1");
        claims["exp"] = json!(Utc::now().timestamp() - 60);

        let result = identity(&server)
            .verify_id_token(&sign(&claims, "test-key-1"))
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_unknown_kid() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;

        let result = identity(&server)
            .verify_id_token(&sign(&claims("uid-1"), "rotated-away"))
            .await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn unknown_kids_do_not_refetch_within_interval() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;
        let identity = identity(&server);

        for kid in ["random-1", "random-2", "random-3"] {
            let result = identity.verify_id_token(&sign(&claims("uid-1"), kid)).await;
            assert!(matches!(result, Err(IdentityError::InvalidToken(_))), "{kid}");
        }

        // Keys fetched by the first miss still verify real tokens.
        mount_user(&server, json!({ "localId": "uid-1" })).await;
        let verified = identity
            .verify_id_token(&sign(&claims("uid-1"), "test-key-1"))
            .await
            .unwrap();
        assert_eq!(verified.uid, "uid-1");
    }

    #[tokio::test]
    async fn rejects_garbage() {
        let server = MockServer::start().await;
        let result = identity(&server).verify_id_token("not-a-jwt").await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn rejects_revoked_token() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;
        let since = Utc::now().timestamp() + 5;
        mount_user(
            &server,
            json!({ "localId": "uid-1", "validSince": since.to_string() }),
        )
        .await;

        let err = identity(&server)
            .verify_id_token(&sign(&claims("uid-1"), "test-key-1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("revoked"), "{err}");
    }

    #[tokio::test]
    async fn rejects_disabled_account() {
        let server = MockServer::start().await;
        mount_jwks(&server, 1).await;
        mount_user(&server, json!({ "localId": "uid-1", "disabled": true })).await;

        let err = identity(&server)
            .verify_id_token(&sign(&claims("uid-1"), "test-key-1"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("disabled"), "{err}");
    }

    #[tokio::test]
    async fn lookup_by_email_without_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/projects/{PROJECT}/accounts:lookup")))
            .and(body_partial_json(json!({ "email": ["nobody@example.com"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "lookup" })))
            .expect(1)
            .mount(&server)
            .await;

        let user = identity(&server)
            .get_user_by_email("nobody@example.com")
            .await
            .unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn update_password_surfaces_provider_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/projects/{PROJECT}/accounts:update")))
            .and(body_partial_json(json!({ "localId": "uid-1", "password": "abc" })))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "WEAK_PASSWORD : Password should be at least 6 characters" }
            })))
            .mount(&server)
            .await;

        let err = identity(&server)
            .update_password("uid-1", "abc")
            .await
            .unwrap_err();
        match err {
            IdentityError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("WEAK_PASSWORD"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn admin_calls_use_cached_service_account_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "ya29.test-token",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(format!("/v1/projects/{PROJECT}/accounts:lookup")))
            .and(header("authorization", "Bearer ya29.test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "users": [{ "localId": "uid-9", "email": "someone@example.com" }]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let key = ServiceAccountKey {
            project_id: PROJECT.into(),
            client_email: "svc@demo-project.iam.gserviceaccount.com".into(),
            private_key: SIGNING_KEY.into(),
            token_uri: format!("{}/token", server.uri()),
        };
        let identity = identity(&server).with_service_account(&key).unwrap();
        assert!(identity.has_service_account());

        let user = identity.get_user("uid-9").await.unwrap().unwrap();
        assert_eq!(user.email.as_deref(), Some("someone@example.com"));
        identity.get_user_by_email("someone@example.com").await.unwrap();
    }

    #[test]
    fn invalid_service_account_key_is_rejected() {
        let key = ServiceAccountKey {
            project_id: PROJECT.into(),
            client_email: "svc@example.com".into(),
            private_key: "not a pem".into(),
            token_uri: default_token_uri(),
        };
        let result = FirebaseIdentity::new(PROJECT, "http://localhost", "http://localhost/jwks")
            .with_service_account(&key);
        assert!(matches!(result, Err(IdentityError::Configuration(_))));
    }

    #[test]
    fn debug_redacts_private_key() {
        let key = ServiceAccountKey {
            project_id: PROJECT.into(),
            client_email: "svc@example.com".into(),
            private_key: "super-secret".into(),
            token_uri: default_token_uri(),
        };
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
