//! Key encoding utilities for `RocksDB`.

use kwh_core::OtpId;

/// Separates the email from the record ID in index keys. Email addresses
/// never contain NUL, so one email's keys can't prefix another's.
const EMAIL_SEPARATOR: u8 = 0x00;

/// Length of an encoded `OtpId`.
const ID_LEN: usize = 16;

/// Create a record key from an OTP ID.
#[must_use]
pub fn otp_key(id: &OtpId) -> Vec<u8> {
    id.to_bytes().to_vec()
}

/// Create an email-index key.
///
/// Format: `email || 0x00 || otp_id (16 bytes)`
///
/// Since ULIDs are time-ordered, one email's records sort by issue time.
#[must_use]
pub fn email_otp_key(email: &str, id: &OtpId) -> Vec<u8> {
    let mut key = email_otp_prefix(email);
    key.extend_from_slice(&id.to_bytes());
    key
}

/// Create a prefix for iterating all records for an email.
#[must_use]
pub fn email_otp_prefix(email: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(email.len() + 1 + ID_LEN);
    key.extend_from_slice(email.as_bytes());
    key.push(EMAIL_SEPARATOR);
    key
}

/// Extract the OTP ID from an email-index key.
///
/// Returns `None` if the key is too short to hold an ID.
#[must_use]
pub fn extract_otp_id_from_email_key(key: &[u8]) -> Option<OtpId> {
    let start = key.len().checked_sub(ID_LEN)?;
    let bytes: [u8; ID_LEN] = key[start..].try_into().ok()?;
    Some(OtpId::from_bytes(bytes))
}
