//! `RocksDB` storage layer for password-reset codes.
//!
//! # Architecture
//!
//! The storage uses the following column families:
//!
//! - `otp_records`: OTP records, keyed by `otp_id` (ULID)
//! - `otp_by_email`: Index for listing a mailbox's records in issue order
//!
//! # Example
//!
//! ```no_run
//! use kwh_store::{RocksStore, Store};
//! use kwh_core::{OtpCode, OtpRecord};
//!
//! let store = RocksStore::open("/tmp/kwh-db").unwrap();
//!
//! let record = OtpRecord::issue("user@example.com", OtpCode::generate());
//! store.put_otp(&record).unwrap();
//!
//! let found = store.latest_unused_otp("user@example.com", &record.code).unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;

pub use error::{Result, StoreError};
pub use rocks::RocksStore;

use kwh_core::{OtpCode, OtpId, OtpRecord};

/// The storage trait defining all database operations.
///
/// Email arguments are normalized by the implementation, so callers may pass
/// addresses as typed by users.
pub trait Store: Send + Sync {
    /// Insert or overwrite an OTP record.
    ///
    /// This also maintains the email index.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn put_otp(&self, record: &OtpRecord) -> Result<()>;

    /// Get an OTP record by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_otp(&self, id: &OtpId) -> Result<Option<OtpRecord>>;

    /// List every record issued for an email, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_otps_by_email(&self, email: &str) -> Result<Vec<OtpRecord>>;

    /// Find the most recently issued unused record matching `(email, code)`.
    ///
    /// Expiry is not checked here; callers decide validity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn latest_unused_otp(&self, email: &str, code: &OtpCode) -> Result<Option<OtpRecord>>;

    /// Delete every unused record for an email, returning how many were removed.
    ///
    /// Used records are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn delete_unused_otps(&self, email: &str) -> Result<usize>;

    /// Mark a record used.
    ///
    /// Returns `true` if this call consumed the record and `false` if it was
    /// already used, so concurrent verifications consume a code at most once.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the record doesn't exist.
    fn consume_otp(&self, id: &OtpId) -> Result<bool>;
}
