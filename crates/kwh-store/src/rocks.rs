//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use kwh_core::{normalize_email, OtpCode, OtpId, OtpRecord};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::Store;

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Serializes read-modify-write sequences on OTP records.
    write_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("store write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Collect the record IDs indexed under an email, oldest first.
    fn otp_ids_by_email(&self, email: &str) -> Result<Vec<OtpId>> {
        let cf_by_email = self.cf(cf::OTP_BY_EMAIL)?;
        let prefix = keys::email_otp_prefix(email);

        let iter = self
            .db
            .iterator_cf(&cf_by_email, IteratorMode::From(&prefix, Direction::Forward));

        let mut ids = Vec::new();
        for item in iter {
            let (key, _) = item?;

            if !key.starts_with(&prefix) {
                break;
            }

            match keys::extract_otp_id_from_email_key(&key) {
                Some(id) => ids.push(id),
                None => tracing::warn!("Skipping malformed OTP index key"),
            }
        }

        Ok(ids)
    }
}

impl Store for RocksStore {
    fn put_otp(&self, record: &OtpRecord) -> Result<()> {
        let cf_records = self.cf(cf::OTP_RECORDS)?;
        let cf_by_email = self.cf(cf::OTP_BY_EMAIL)?;

        let email = normalize_email(&record.email);
        let record_key = keys::otp_key(&record.id);
        let email_key = keys::email_otp_key(&email, &record.id);
        let value = Self::serialize(record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_records, &record_key, &value);
        batch.put_cf(&cf_by_email, &email_key, []); // Index entry (empty value)

        self.db.write(batch)?;

        Ok(())
    }

    fn get_otp(&self, id: &OtpId) -> Result<Option<OtpRecord>> {
        let cf = self.cf(cf::OTP_RECORDS)?;
        let key = keys::otp_key(id);

        self.db
            .get_cf(&cf, key)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_otps_by_email(&self, email: &str) -> Result<Vec<OtpRecord>> {
        let email = normalize_email(email);
        let mut ids = self.otp_ids_by_email(&email)?;

        // Newest first
        ids.reverse();

        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(record) = self.get_otp(&id)? {
                records.push(record);
            }
        }

        Ok(records)
    }

    fn latest_unused_otp(&self, email: &str, code: &OtpCode) -> Result<Option<OtpRecord>> {
        Ok(self
            .list_otps_by_email(email)?
            .into_iter()
            .find(|record| !record.is_used && &record.code == code))
    }

    fn delete_unused_otps(&self, email: &str) -> Result<usize> {
        let _guard = self.lock()?;

        let email = normalize_email(email);
        let cf_records = self.cf(cf::OTP_RECORDS)?;
        let cf_by_email = self.cf(cf::OTP_BY_EMAIL)?;

        let mut batch = WriteBatch::default();
        let mut deleted = 0;

        for id in self.otp_ids_by_email(&email)? {
            match self.get_otp(&id)? {
                Some(record) if record.is_used => continue,
                Some(_) => {
                    batch.delete_cf(&cf_records, keys::otp_key(&id));
                    batch.delete_cf(&cf_by_email, keys::email_otp_key(&email, &id));
                    deleted += 1;
                }
                // Dangling index entry
                None => batch.delete_cf(&cf_by_email, keys::email_otp_key(&email, &id)),
            }
        }

        self.db.write(batch)?;

        if deleted > 0 {
            tracing::debug!(deleted, "Deleted unused OTP records");
        }

        Ok(deleted)
    }

    fn consume_otp(&self, id: &OtpId) -> Result<bool> {
        let _guard = self.lock()?;

        let mut record = self.get_otp(id)?.ok_or(StoreError::NotFound)?;
        if record.is_used {
            return Ok(false);
        }

        record.is_used = true;

        let cf = self.cf(cf::OTP_RECORDS)?;
        self.db
            .put_cf(&cf, keys::otp_key(id), Self::serialize(&record)?)?;

        Ok(true)
    }
}
