//! One-time password records for the password-reset flow.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::OtpId;

/// How long an issued OTP stays valid, in seconds.
pub const OTP_TTL_SECONDS: i64 = 600;

/// Number of digits in an OTP code.
const OTP_DIGITS: usize = 6;

/// Canonical form of an email address used as a store key.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// A six-digit numeric one-time code.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OtpCode(String);

impl OtpCode {
    /// Generate a code uniformly over `000000..=999999`.
    #[must_use]
    pub fn generate() -> Self {
        let value: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{value:06}"))
    }

    /// Return the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OtpCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == OTP_DIGITS && s.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(CoreError::InvalidOtpCode)
        }
    }
}

impl TryFrom<String> for OtpCode {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OtpCode> for String {
    fn from(code: OtpCode) -> Self {
        code.0
    }
}

// Codes are secrets; keep them out of debug logs.
impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode(******)")
    }
}

/// A stored password-reset code.
///
/// At most one unused record per email is meant to be authoritative: the
/// issuer deletes earlier unused records before storing a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtpRecord {
    /// Record ID (ULID, time-ordered).
    pub id: OtpId,

    /// Normalized email address the code was issued for.
    pub email: String,

    /// The six-digit code.
    pub code: OtpCode,

    /// When the code was issued.
    pub created_at: DateTime<Utc>,

    /// Whether the code has already been consumed.
    pub is_used: bool,
}

impl OtpRecord {
    /// Create a fresh, unused record issued now.
    #[must_use]
    pub fn issue(email: &str, code: OtpCode) -> Self {
        Self {
            id: OtpId::generate(),
            email: normalize_email(email),
            code,
            created_at: Utc::now(),
            is_used: false,
        }
    }

    /// Whether the record can still authorize a reset at `now`.
    ///
    /// Valid iff unused and strictly younger than [`OTP_TTL_SECONDS`].
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && (now - self.created_at).num_seconds() < OTP_TTL_SECONDS
    }

    /// Whether the record is valid right now.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// When the record stops being valid.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + chrono::Duration::seconds(OTP_TTL_SECONDS)
    }
}
