//! Password reset through emailed one-time codes.

use std::sync::Arc;

use kwh_core::{normalize_email, OtpCode, OtpRecord, OTP_TTL_SECONDS};
use kwh_store::Store;

use crate::error::ApiError;
use crate::identity::{IdentityError, IdentityProvider};
use crate::mailer::Mailer;

/// Reply to every reset request, whether or not the account exists.
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account with this email exists, an OTP has been sent.";

/// Reply after a successful password change.
pub const PASSWORD_RESET_MESSAGE: &str = "Password has been reset successfully.";

const RESET_EMAIL_SUBJECT: &str = "Password Reset OTP";

fn reset_email_body(code: &OtpCode) -> String {
    format!(
        "Your password reset code is {}.\n\n\
         The code expires in {} minutes. If you did not request a password reset, \
         you can ignore this email.\n",
        code.as_str(),
        OTP_TTL_SECONDS / 60
    )
}

/// Issues and redeems password-reset codes.
pub struct OtpService {
    store: Arc<dyn Store>,
    identity: Arc<dyn IdentityProvider>,
    mailer: Arc<dyn Mailer>,
}

impl OtpService {
    /// Create a service over the given store, identity provider and mailer.
    #[must_use]
    pub fn new(
        store: Arc<dyn Store>,
        identity: Arc<dyn IdentityProvider>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            identity,
            mailer,
        }
    }

    /// Email a fresh code to `email` if an account exists for it.
    ///
    /// The reply is the same either way, including when the mail cannot be
    /// delivered. Earlier unused codes for the address are deleted before the
    /// new one is stored.
    pub async fn request_reset(&self, email: &str) -> Result<&'static str, ApiError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(ApiError::Validation("Email is required.".into()));
        }

        if self.identity.get_user_by_email(email).await?.is_none() {
            tracing::info!("Password reset requested for unknown account");
            return Ok(RESET_REQUESTED_MESSAGE);
        }

        let removed = self.store.delete_unused_otps(email)?;
        let record = OtpRecord::issue(email, OtpCode::generate());
        self.store.put_otp(&record)?;

        tracing::info!(otp_id = %record.id, superseded = removed, "Issued password reset OTP");

        if let Err(e) = self
            .mailer
            .send(email, RESET_EMAIL_SUBJECT, &reset_email_body(&record.code))
            .await
        {
            tracing::error!(otp_id = %record.id, error = %e, "Failed to send password reset OTP");
        }

        Ok(RESET_REQUESTED_MESSAGE)
    }

    /// Redeem a code and set a new password.
    ///
    /// The code is marked used before the identity provider is called, so a
    /// provider failure still consumes it.
    pub async fn verify_and_reset(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<&'static str, ApiError> {
        let email = email.trim();
        let otp = otp.trim();
        if email.is_empty() || otp.is_empty() || new_password.is_empty() {
            return Err(ApiError::Validation(
                "Email, OTP, and new password are required.".into(),
            ));
        }

        let code: OtpCode = otp.parse().map_err(|_| ApiError::InvalidOtp)?;

        let record = self
            .store
            .latest_unused_otp(email, &code)?
            .ok_or(ApiError::InvalidOtp)?;

        if !record.is_valid() {
            tracing::debug!(otp_id = %record.id, expired_at = %record.expires_at(), "OTP expired");
            return Err(ApiError::InvalidOtp);
        }

        if !self.store.consume_otp(&record.id)? {
            tracing::debug!(otp_id = %record.id, "OTP consumed concurrently");
            return Err(ApiError::InvalidOtp);
        }

        let user = self
            .identity
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(normalize_email(email)))?;

        self.identity.update_password(&user.uid, new_password).await?;

        tracing::info!(otp_id = %record.id, uid = %user.uid, "Password reset completed");
        Ok(PASSWORD_RESET_MESSAGE)
    }
}
