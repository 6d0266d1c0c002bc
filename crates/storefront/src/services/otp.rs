//! OTP challenge flows: registration, login by code, and password reset.
//!
//! The three flows are one state machine parameterized by [`FlowKind`]:
//!
//! ```text
//! COLLECTING --submit--> AWAITING_OTP --verify--> FINALIZING --complete--> COMPLETED
//!      ^                  |  ^   |                    |
//!      |                  |  +---+ resend             |
//!      +-----------------change_details---------------+
//! ```
//!
//! A stage only advances after its server call succeeds. Login skips
//! `FINALIZING`: the verify response carries the session and the flow
//! completes at once.

use core::fmt;

use royal_florist_core::{
    Email, FlowKind, OtpCode, OtpStage, PasswordError, User, validate_new_password,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::api::{Endpoint, Message};
use crate::error::{Result, StorefrontError, ValidationError};
use crate::navigation::Destination;
use crate::state::Storefront;

/// Per-kind endpoints, notices and success route.
struct FlowPlan {
    request: Endpoint,
    verify: Endpoint,
    finalize: Option<Endpoint>,
    on_success: Destination,
    request_sent: &'static str,
    request_failed: &'static str,
    verify_failed: &'static str,
    completed: &'static str,
    finalize_failed: &'static str,
}

fn flow_plan(kind: FlowKind) -> FlowPlan {
    let (request_sent, request_failed, verify_failed, completed, finalize_failed) = match kind {
        FlowKind::Register => (
            "OTP sent to your email",
            "Registration request failed",
            "OTP verification failed",
            "Registration completed",
            "Password setup failed",
        ),
        FlowKind::Login => (
            "OTP Sent",
            "Server error",
            "Verification failed",
            "Authentication Successful",
            "Verification failed",
        ),
        FlowKind::ForgotPassword => (
            "OTP sent to email",
            "Request failed",
            "Verification failed",
            "Password reset successful",
            "Reset failed",
        ),
    };

    FlowPlan {
        request: Endpoint::otp_request(kind),
        verify: Endpoint::otp_verify(kind),
        finalize: Endpoint::otp_finalize(kind),
        on_success: if kind.sets_password() {
            Destination::SignIn
        } else {
            Destination::Home
        },
        request_sent,
        request_failed,
        verify_failed,
        completed,
        finalize_failed,
    }
}

const RESENT: &str = "OTP resent";
const RESEND_FAILED: &str = "Resend failed";
const VERIFIED: &str = "OTP verified";

/// A new password and its confirmation.
#[derive(Clone)]
pub struct PasswordPair {
    password: SecretString,
    confirm: SecretString,
}

impl PasswordPair {
    #[must_use]
    pub fn new(password: impl Into<String>, confirm: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
            confirm: SecretString::from(confirm.into()),
        }
    }

    /// # Errors
    ///
    /// Returns the first [`PasswordError`] that applies.
    pub fn validate(&self) -> std::result::Result<(), PasswordError> {
        validate_new_password(self.password.expose_secret(), self.confirm.expose_secret())
    }

    fn is_blank(&self) -> bool {
        self.password.expose_secret().is_empty() || self.confirm.expose_secret().is_empty()
    }
}

impl fmt::Debug for PasswordPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordPair([REDACTED])")
    }
}

/// Identity fields gathered by the first step.
#[derive(Debug, Clone, Default)]
pub struct CollectForm {
    /// Account holder name; registration only.
    pub name: Option<String>,
    pub email: String,
    /// The new password pair; registration collects it up front.
    pub password: Option<PasswordPair>,
}

impl CollectForm {
    /// Form for login by code or password reset.
    #[must_use]
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            ..Self::default()
        }
    }

    /// Form for registration.
    #[must_use]
    pub fn register(name: impl Into<String>, email: impl Into<String>, password: PasswordPair) -> Self {
        Self {
            name: Some(name.into()),
            email: email.into(),
            password: Some(password),
        }
    }
}

/// What a successful verify led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The code was accepted; a new password is needed next.
    AwaitingPassword,
    /// The flow is done; move to the destination.
    Done(Destination),
}

#[derive(Serialize)]
struct RequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    email: &'a str,
}

#[derive(Serialize)]
struct VerifyBody<'a> {
    email: &'a str,
    otp: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinalizeBody<'a> {
    email: &'a str,
    new_password: &'a str,
    confirm_password: &'a str,
}

/// `{token, user}` returned when a login succeeds.
#[derive(Deserialize)]
pub(crate) struct SessionGrant {
    pub token: String,
    pub user: User,
}

/// One OTP challenge in progress.
pub struct OtpFlow {
    store: Storefront,
    kind: FlowKind,
    plan: FlowPlan,
    stage: OtpStage,
    subject: Option<Email>,
    name: Option<String>,
    pending: Option<PasswordPair>,
}

impl fmt::Debug for OtpFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpFlow")
            .field("kind", &self.kind)
            .field("stage", &self.stage)
            .field("subject", &self.subject)
            .finish_non_exhaustive()
    }
}

impl OtpFlow {
    #[must_use]
    pub fn new(store: Storefront, kind: FlowKind) -> Self {
        Self {
            store,
            kind,
            plan: flow_plan(kind),
            stage: OtpStage::Collecting,
            subject: None,
            name: None,
            pending: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FlowKind {
        self.kind
    }

    #[must_use]
    pub const fn stage(&self) -> OtpStage {
        self.stage
    }

    /// The email the code was sent to, once a code has been requested.
    #[must_use]
    pub const fn subject(&self) -> Option<&Email> {
        self.subject.as_ref()
    }

    /// Validate the identity fields and request a code.
    ///
    /// # Errors
    ///
    /// - `Validation` for blank fields, a bad email or a bad password pair;
    ///   nothing is sent
    /// - `InvalidTransition` unless collecting
    /// - `RemoteRejected` if the server refuses; the flow stays collecting
    #[instrument(skip(self, form), fields(kind = ?self.kind))]
    pub async fn submit(&mut self, form: CollectForm) -> Result<()> {
        let result = self.try_submit(form).await;
        self.store.report(result, self.plan.request_failed)
    }

    async fn try_submit(&mut self, form: CollectForm) -> Result<()> {
        self.expect_stage(OtpStage::Collecting, "submit details")?;
        let (email, name, pending) = self.validate_form(form)?;

        let response: Message = self
            .store
            .api()
            .call_with(
                self.plan.request.clone(),
                &RequestBody {
                    name: name.as_deref(),
                    email: email.as_str(),
                },
            )
            .await?;

        info!(email = %email, "OTP requested");
        self.subject = Some(email);
        self.name = name;
        self.pending = pending;
        self.stage = OtpStage::AwaitingOtp;
        self.store.success(response.text_or(self.plan.request_sent));
        Ok(())
    }

    fn validate_form(
        &self,
        form: CollectForm,
    ) -> Result<(Email, Option<String>, Option<PasswordPair>)> {
        if !self.kind.requires_name() {
            return Ok((Email::parse(&form.email)?, None, None));
        }

        let name = form.name.map(|n| n.trim().to_string()).unwrap_or_default();
        let blank = name.is_empty()
            || form.email.trim().is_empty()
            || form.password.as_ref().is_none_or(PasswordPair::is_blank);
        if blank {
            return Err(ValidationError::MissingField("name").into());
        }
        let pair = form
            .password
            .ok_or(ValidationError::MissingField("password"))?;
        pair.validate()?;
        let email = Email::parse(&form.email)?;

        Ok((email, Some(name), Some(pair)))
    }

    /// Send the code again to the same subject.
    ///
    /// # Errors
    ///
    /// - `SubjectMissing` if no code was requested; the flow resets
    /// - `InvalidTransition` unless awaiting a code
    /// - `RemoteRejected` if the server refuses
    #[instrument(skip(self), fields(kind = ?self.kind))]
    pub async fn resend(&mut self) -> Result<()> {
        let result = self.try_resend().await;
        self.store.report(result, RESEND_FAILED)
    }

    async fn try_resend(&mut self) -> Result<()> {
        let email = self.require_subject()?;
        self.expect_stage(OtpStage::AwaitingOtp, "resend the code")?;

        let response: Message = self
            .store
            .api()
            .call_with(
                self.plan.request.clone(),
                &RequestBody {
                    name: self.name.as_deref(),
                    email: email.as_str(),
                },
            )
            .await?;

        debug!("OTP resent");
        self.store.success(response.text_or(RESENT));
        Ok(())
    }

    /// Check a code.
    ///
    /// For login a correct code establishes the session and finishes the
    /// flow; the other kinds move on to choosing a password.
    ///
    /// # Errors
    ///
    /// - `SubjectMissing` if no code was requested; the flow resets
    /// - `InvalidTransition` unless awaiting a code
    /// - `Validation` for a blank code; nothing is sent
    /// - `RemoteRejected` for a wrong or expired code; the flow keeps
    ///   awaiting a code
    #[instrument(skip(self, code), fields(kind = ?self.kind))]
    pub async fn verify(&mut self, code: &str) -> Result<VerifyOutcome> {
        let result = self.try_verify(code).await;
        self.store.report(result, self.plan.verify_failed)
    }

    async fn try_verify(&mut self, code: &str) -> Result<VerifyOutcome> {
        let email = self.require_subject()?;
        self.expect_stage(OtpStage::AwaitingOtp, "verify a code")?;
        let code = OtpCode::parse(code)?;
        let body = VerifyBody {
            email: email.as_str(),
            otp: code.as_str(),
        };

        if self.kind == FlowKind::Login {
            let grant: SessionGrant = self
                .store
                .api()
                .call_with(self.plan.verify.clone(), &body)
                .await?;
            self.store
                .session()
                .establish(grant.user, SecretString::from(grant.token))?;
            self.finish();
            info!(email = %email, "Signed in with OTP");
            self.store.success(self.plan.completed);
            return Ok(VerifyOutcome::Done(self.plan.on_success));
        }

        let response: Message = self
            .store
            .api()
            .call_with(self.plan.verify.clone(), &body)
            .await?;
        self.stage = OtpStage::Finalizing;
        debug!("OTP verified");
        self.store.success(response.text_or(VERIFIED));
        Ok(VerifyOutcome::AwaitingPassword)
    }

    /// Set the new password and finish the flow.
    ///
    /// With `None`, the pair collected at registration is used.
    ///
    /// # Errors
    ///
    /// - `SubjectMissing` if no code was requested; the flow resets
    /// - `InvalidTransition` unless the code was verified
    /// - `Validation` for a blank, mismatched or short password; nothing is
    ///   sent
    /// - `RemoteRejected` if the server refuses; the flow stays finalizing
    #[instrument(skip(self, password), fields(kind = ?self.kind))]
    pub async fn complete(&mut self, password: Option<PasswordPair>) -> Result<Destination> {
        let result = self.try_complete(password).await;
        self.store.report(result, self.plan.finalize_failed)
    }

    async fn try_complete(&mut self, password: Option<PasswordPair>) -> Result<Destination> {
        let email = self.require_subject()?;
        self.expect_stage(OtpStage::Finalizing, "set a password")?;
        let finalize = self.plan.finalize.clone().ok_or(StorefrontError::InvalidTransition {
            stage: self.stage,
            action: "set a password",
        })?;

        let pair = password
            .or_else(|| self.pending.clone())
            .ok_or(ValidationError::Password(PasswordError::Empty))?;
        pair.validate()?;

        let response: Message = self
            .store
            .api()
            .call_with(
                finalize,
                &FinalizeBody {
                    email: email.as_str(),
                    new_password: pair.password.expose_secret(),
                    confirm_password: pair.confirm.expose_secret(),
                },
            )
            .await?;

        self.finish();
        info!(email = %email, "OTP flow completed");
        self.store.success(response.text_or(self.plan.completed));
        Ok(self.plan.on_success)
    }

    /// Go back to editing the identity fields.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` once the flow has completed.
    pub fn change_details(&mut self) -> Result<()> {
        if self.stage == OtpStage::Completed {
            return Err(StorefrontError::InvalidTransition {
                stage: self.stage,
                action: "change details",
            });
        }
        self.reset();
        Ok(())
    }

    fn require_subject(&mut self) -> Result<Email> {
        if let Some(email) = &self.subject {
            return Ok(email.clone());
        }
        self.reset();
        Err(StorefrontError::SubjectMissing(self.kind))
    }

    fn expect_stage(&self, stage: OtpStage, action: &'static str) -> Result<()> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(StorefrontError::InvalidTransition {
                stage: self.stage,
                action,
            })
        }
    }

    fn reset(&mut self) {
        self.stage = OtpStage::Collecting;
        self.subject = None;
        self.name = None;
        self.pending = None;
    }

    fn finish(&mut self) {
        self.stage = OtpStage::Completed;
        self.pending = None;
    }
}
