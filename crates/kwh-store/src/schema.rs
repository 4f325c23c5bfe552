//! Column family definitions.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// OTP records, keyed by `otp_id` (ULID).
    pub const OTP_RECORDS: &str = "otp_records";

    /// Index: records by email, keyed by `email || 0x00 || otp_id`.
    /// Value is empty (index only).
    pub const OTP_BY_EMAIL: &str = "otp_by_email";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![cf::OTP_RECORDS, cf::OTP_BY_EMAIL]
}
