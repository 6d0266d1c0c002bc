//! Integration tests for the code-verified account flows.
//!
//! Each test runs a storefront against its own mock shop, so call counts
//! are exact.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use royal_florist_core::{FlowKind, OtpStage, PasswordError};
use royal_florist_integration_tests::{MockShop, OTP};
use royal_florist_storefront::notify::NoticeLog;
use royal_florist_storefront::services::{CollectForm, PasswordPair, VerifyOutcome};
use royal_florist_storefront::session::MemoryStorage;
use royal_florist_storefront::{Destination, Storefront, StorefrontError, ValidationError};

async fn setup() -> (MockShop, Storefront, NoticeLog) {
    let shop = MockShop::start().await.unwrap();
    let log = NoticeLog::new();
    let store = shop
        .connect(Arc::new(MemoryStorage::new()), Arc::new(log.clone()))
        .unwrap();
    (shop, store, log)
}

fn registration(password: &str, confirm: &str) -> CollectForm {
    CollectForm::register(
        "Ada Lovelace",
        "ada@royal.com",
        PasswordPair::new(password, confirm),
    )
}

// =============================================================================
// Registration
// =============================================================================

#[tokio::test]
async fn test_register_survives_wrong_codes() {
    let (shop, store, log) = setup().await;
    let mut flow = store.otp(FlowKind::Register);

    flow.submit(registration("secret1", "secret1")).await.unwrap();
    assert_eq!(flow.stage(), OtpStage::AwaitingOtp);

    for _ in 0..2 {
        let err = flow.verify("000000").await.unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::RemoteRejected { status: 400, .. }
        ));
        assert_eq!(err.redirect(), None);
        assert_eq!(flow.stage(), OtpStage::AwaitingOtp);
    }

    assert_eq!(flow.verify(OTP).await.unwrap(), VerifyOutcome::AwaitingPassword);
    assert_eq!(flow.complete(None).await.unwrap(), Destination::SignIn);
    assert_eq!(flow.stage(), OtpStage::Completed);

    assert_eq!(log.errors(), ["Invalid OTP", "Invalid OTP"]);
    assert_eq!(
        log.successes(),
        ["OTP sent to your email", "OTP verified", "Registration completed"]
    );
    assert_eq!(shop.calls("POST /api/auth/register/verify-otp"), 3);

    let account = shop.account("ada@royal.com").unwrap();
    assert_eq!(account.name, "Ada Lovelace");
    assert_eq!(account.password, "secret1");
    assert!(!store.session().is_authenticated());
}

#[tokio::test]
async fn test_verify_before_request_resets_without_calling() {
    let (shop, store, log) = setup().await;
    let mut flow = store.otp(FlowKind::Register);

    let err = flow.verify(OTP).await.unwrap_err();

    assert!(matches!(err, StorefrontError::SubjectMissing(FlowKind::Register)));
    assert_eq!(flow.stage(), OtpStage::Collecting);
    assert_eq!(shop.total_calls(), 0);
    assert_eq!(log.errors().len(), 1);
}

#[tokio::test]
async fn test_bad_passwords_never_reach_the_server() {
    let (shop, store, log) = setup().await;
    let mut flow = store.otp(FlowKind::Register);

    let err = flow.submit(registration("secret1", "secret2")).await.unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Validation(ValidationError::Password(PasswordError::Mismatch))
    ));

    let err = flow.submit(registration("abc12", "abc12")).await.unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::Validation(ValidationError::Password(PasswordError::TooShort { min: 6 }))
    ));

    let err = flow
        .submit(CollectForm::register("", "ada@royal.com", PasswordPair::new("secret1", "secret1")))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    assert_eq!(flow.stage(), OtpStage::Collecting);
    assert_eq!(shop.total_calls(), 0);
    assert_eq!(
        log.errors(),
        [
            "Passwords do not match",
            "Password must be at least 6 characters",
            "Fill all fields"
        ]
    );
}

#[tokio::test]
async fn test_register_existing_email_stays_collecting() {
    let (shop, store, log) = setup().await;
    shop.add_account("Ada", "ada@royal.com", "secret1");
    let mut flow = store.otp(FlowKind::Register);

    let err = flow.submit(registration("secret1", "secret1")).await.unwrap_err();

    assert!(matches!(
        err,
        StorefrontError::RemoteRejected { status: 409, .. }
    ));
    assert_eq!(flow.stage(), OtpStage::Collecting);
    assert!(flow.subject().is_none());
    assert_eq!(log.errors(), ["User already exists"]);
}

// =============================================================================
// Login
// =============================================================================

#[tokio::test]
async fn test_login_code_establishes_session() {
    let (shop, store, log) = setup().await;
    shop.add_account("Ada", "ada@royal.com", "secret1");
    let mut flow = store.otp(FlowKind::Login);

    flow.submit(CollectForm::email("ada@royal.com")).await.unwrap();
    let outcome = flow.verify(OTP).await.unwrap();

    assert_eq!(outcome, VerifyOutcome::Done(Destination::Home));
    assert_eq!(flow.stage(), OtpStage::Completed);
    assert!(store.session().is_authenticated());
    assert_eq!(
        store.session().current_user().unwrap().email.as_str(),
        "ada@royal.com"
    );
    assert_eq!(log.successes(), ["OTP sent", "Authentication Successful"]);
}

#[tokio::test]
async fn test_login_resend_requests_again() {
    let (shop, store, log) = setup().await;
    shop.add_account("Ada", "ada@royal.com", "secret1");
    let mut flow = store.otp(FlowKind::Login);

    flow.submit(CollectForm::email("ada@royal.com")).await.unwrap();
    flow.resend().await.unwrap();

    assert_eq!(shop.calls("POST /api/auth/auth/login/send-otp"), 2);
    assert_eq!(flow.stage(), OtpStage::AwaitingOtp);
    assert_eq!(log.successes(), ["OTP sent", "OTP sent"]);
}

#[tokio::test]
async fn test_login_unknown_email_shows_server_message() {
    let (_shop, store, log) = setup().await;
    let mut flow = store.otp(FlowKind::Login);

    let err = flow.submit(CollectForm::email("nobody@royal.com")).await.unwrap_err();

    assert!(matches!(
        err,
        StorefrontError::RemoteRejected { status: 404, .. }
    ));
    assert_eq!(flow.stage(), OtpStage::Collecting);
    assert_eq!(log.errors(), ["User not found"]);
}

#[tokio::test]
async fn test_password_login_and_logout() {
    let (shop, store, log) = setup().await;
    shop.add_account("Ada", "ada@royal.com", "secret1");

    let err = store
        .auth()
        .login_with_password("ada@royal.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorefrontError::RemoteRejected { status: 401, .. }
    ));
    assert!(!store.session().is_authenticated());

    let destination = store
        .auth()
        .login_with_password("ada@royal.com", "secret1")
        .await
        .unwrap();
    assert_eq!(destination, Destination::Home);
    assert_eq!(store.auth().require_auth().unwrap().name, "Ada");

    assert_eq!(store.auth().logout().unwrap(), Destination::SignIn);
    assert!(store.auth().require_auth().is_err());
    assert_eq!(log.errors(), ["Invalid credentials"]);
    assert_eq!(log.successes(), ["Logged in", "Logged out"]);
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn test_forgot_password_sets_new_password() {
    let (shop, store, _log) = setup().await;
    shop.add_account("Ada", "ada@royal.com", "secret1");
    let mut flow = store.otp(FlowKind::ForgotPassword);

    flow.submit(CollectForm::email("ada@royal.com")).await.unwrap();
    assert_eq!(flow.verify(OTP).await.unwrap(), VerifyOutcome::AwaitingPassword);

    let err = flow
        .complete(Some(PasswordPair::new("newpass1", "newpass2")))
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(flow.stage(), OtpStage::Finalizing);
    assert_eq!(shop.calls("POST /api/auth/forgot/reset-password"), 0);

    let destination = flow
        .complete(Some(PasswordPair::new("newpass1", "newpass1")))
        .await
        .unwrap();
    assert_eq!(destination, Destination::SignIn);
    assert_eq!(shop.account("ada@royal.com").unwrap().password, "newpass1");

    store
        .auth()
        .login_with_password("ada@royal.com", "newpass1")
        .await
        .unwrap();
    assert!(store.session().is_authenticated());
}
