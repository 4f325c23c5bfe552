//! Password reset integration tests.

mod common;

use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};
use common::{TestHarness, USER_EMAIL, USER_UID};
use kwh_core::OtpRecord;
use kwh_store::Store;
use serde_json::json;

const GENERIC_REPLY: &str = "If an account with this email exists, an OTP has been sent.";

async fn request_code(harness: &TestHarness, email: &str) -> serde_json::Value {
    let response = harness
        .server
        .post("/api/send-otp-reset-password/")
        .json(&json!({ "email": email }))
        .await;
    response.assert_status_ok();
    response.json()
}

#[tokio::test]
async fn known_account_receives_code() {
    let harness = TestHarness::new();

    let body = request_code(&harness, USER_EMAIL).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], GENERIC_REPLY);

    let sent = harness.mailer.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, USER_EMAIL);
    assert_eq!(sent[0].subject, "Password Reset OTP");

    let records = harness.store.list_otps_by_email(USER_EMAIL).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code.as_str(), harness.mailer.last_code());
}

#[tokio::test]
async fn unknown_account_gets_same_reply() {
    let harness = TestHarness::new();

    let body = request_code(&harness, "stranger@example.com").await;
    assert_eq!(body["message"], GENERIC_REPLY);
    assert_eq!(harness.mailer.count(), 0);
    assert!(harness
        .store
        .list_otps_by_email("stranger@example.com")
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn mail_failure_does_not_reveal_account() {
    let harness = TestHarness::new();
    harness.mailer.failing.store(true, Ordering::SeqCst);

    let known = harness
        .server
        .post("/api/send-otp-reset-password/")
        .json(&json!({ "email": USER_EMAIL }))
        .await;
    let unknown = harness
        .server
        .post("/api/send-otp-reset-password/")
        .json(&json!({ "email": "stranger@example.com" }))
        .await;

    known.assert_status_ok();
    unknown.assert_status_ok();
    assert_eq!(known.text(), unknown.text());
    assert_eq!(harness.mailer.count(), 0);
}

#[tokio::test]
async fn missing_email_is_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/send-otp-reset-password/")
        .json(&json!({}))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Email is required.");
}

#[tokio::test]
async fn code_resets_password_exactly_once() {
    let harness = TestHarness::new();
    request_code(&harness, USER_EMAIL).await;
    let code = harness.mailer.last_code();

    let response = harness
        .server
        .post("/api/verify-otp-and-reset-password/")
        .json(&json!({ "email": USER_EMAIL, "otp": code, "newPassword": "n3w-Password" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Password has been reset successfully.");
    assert_eq!(
        harness.identity.passwords.lock().unwrap().as_slice(),
        &[(USER_UID.to_string(), "n3w-Password".to_string())]
    );

    let replay = harness
        .server
        .post("/api/verify-otp-and-reset-password/")
        .json(&json!({ "email": USER_EMAIL, "otp": code, "newPassword": "other-Password" }))
        .await;
    replay.assert_status_bad_request();
    let body: serde_json::Value = replay.json();
    assert_eq!(body["error"], "Invalid or expired OTP");
}

#[tokio::test]
async fn earlier_code_is_superseded() {
    let harness = TestHarness::new();
    request_code(&harness, USER_EMAIL).await;
    let first = harness.mailer.last_code();
    request_code(&harness, USER_EMAIL).await;
    let second = harness.mailer.last_code();

    if first != second {
        let response = harness
            .server
            .post("/api/verify-otp-and-reset-password/")
            .json(&json!({ "email": USER_EMAIL, "otp": first, "newPassword": "pw123456" }))
            .await;
        response.assert_status_bad_request();
    }

    let response = harness
        .server
        .post("/api/verify-otp-and-reset-password/")
        .json(&json!({ "email": USER_EMAIL, "otp": second, "newPassword": "pw123456" }))
        .await;
    response.assert_status_ok();
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let harness = TestHarness::new();
    let mut record = OtpRecord::issue(USER_EMAIL, "424242".parse().unwrap());
    record.created_at = Utc::now() - Duration::seconds(601);
    harness.store.put_otp(&record).unwrap();

    let response = harness
        .server
        .post("/api/verify-otp-and-reset-password/")
        .json(&json!({ "email": USER_EMAIL, "otp": "424242", "newPassword": "pw123456" }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "not_found");
    assert!(harness.identity.passwords.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_fields_are_bad_request() {
    let harness = TestHarness::new();

    let response = harness
        .server
        .post("/api/verify-otp-and-reset-password/")
        .json(&json!({ "email": USER_EMAIL, "otp": "123456" }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Email, OTP, and new password are required.");
}
