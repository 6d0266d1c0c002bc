//! Account commands: registration, sign-in, password reset, profile.

use royal_florist_core::{Address, FlowKind, ProfileUpdate};
use royal_florist_storefront::services::{CollectForm, OtpFlow, PasswordPair, VerifyOutcome};
use royal_florist_storefront::{Destination, Storefront, StorefrontError};
use tracing::debug;

use super::{CmdResult, retryable};
use crate::console;
use crate::prompt::Prompt;

/// Register: details and password up front, then the emailed code.
pub async fn register(store: &Storefront, prompt: &Prompt) -> CmdResult {
    let mut flow = store.otp(FlowKind::Register);

    let name = prompt.ask("Name").await?;
    let email = prompt.ask("Email").await?;
    let password = prompt.ask_secret("Password").await?;
    let confirm = prompt.ask_secret("Confirm password").await?;
    flow.submit(CollectForm::register(
        name,
        email,
        PasswordPair::new(password, confirm),
    ))
    .await?;

    if verify(&mut flow, prompt).await? == VerifyOutcome::AwaitingPassword {
        console::next(flow.complete(None).await?);
    }
    Ok(())
}

/// Sign in with email and password.
pub async fn login(store: &Storefront, prompt: &Prompt) -> CmdResult {
    let email = prompt.ask("Email").await?;
    let password = prompt.ask_secret("Password").await?;
    console::next(store.auth().login_with_password(&email, &password).await?);
    Ok(())
}

/// Sign in with an emailed code.
pub async fn login_with_otp(store: &Storefront, prompt: &Prompt) -> CmdResult {
    let mut flow = store.otp(FlowKind::Login);
    let email = prompt.ask("Email").await?;
    flow.submit(CollectForm::email(email)).await?;

    if let VerifyOutcome::Done(destination) = verify(&mut flow, prompt).await? {
        console::next(destination);
    }
    Ok(())
}

/// Reset a forgotten password.
pub async fn forgot(store: &Storefront, prompt: &Prompt) -> CmdResult {
    let mut flow = store.otp(FlowKind::ForgotPassword);
    let email = prompt.ask("Email").await?;
    flow.submit(CollectForm::email(email)).await?;
    verify(&mut flow, prompt).await?;

    loop {
        let password = prompt.ask_secret("New password").await?;
        let confirm = prompt.ask_secret("Confirm new password").await?;
        match flow.complete(Some(PasswordPair::new(password, confirm))).await {
            Ok(destination) => {
                console::next(destination);
                return Ok(());
            }
            Err(e) if retryable(&e) => debug!(error = %e, "Password refused, asking again"),
            Err(e) => return Err(e.into()),
        }
    }
}

/// Ask for the code until it is accepted. `r` re-sends it.
async fn verify(
    flow: &mut OtpFlow,
    prompt: &Prompt,
) -> Result<VerifyOutcome, Box<dyn std::error::Error>> {
    if let Some(email) = flow.subject() {
        console::line(&format!("A code was sent to {email}."));
    }
    loop {
        let answer = prompt.ask("OTP (r to resend)").await?;
        if answer.trim().eq_ignore_ascii_case("r") {
            match flow.resend().await {
                Ok(()) => {}
                Err(e) if retryable(&e) => {}
                Err(e) => return Err(e.into()),
            }
            continue;
        }

        match flow.verify(&answer).await {
            Ok(outcome) => return Ok(outcome),
            Err(e) if retryable(&e) => debug!(error = %e, "Code refused, asking again"),
            Err(e) => return Err(e.into()),
        }
    }
}

pub fn logout(store: &Storefront) -> CmdResult {
    console::next(store.auth().logout()?);
    Ok(())
}

pub async fn show_profile(store: &Storefront) -> CmdResult {
    match store.profile().fetch().await {
        Ok(user) => {
            console::user(&user);
            Ok(())
        }
        Err(e) => {
            if let Some(destination) = e.redirect() {
                console::next(destination);
            }
            Err(e.into())
        }
    }
}

/// Edit contact details, offering the current values as defaults.
pub async fn update_profile(store: &Storefront, prompt: &Prompt) -> CmdResult {
    let user = match store.profile().fetch().await {
        Ok(user) => user,
        Err(e @ StorefrontError::Unauthenticated) => {
            console::next(Destination::SignIn);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };
    let current = user.address.clone().unwrap_or_default();

    let update = ProfileUpdate {
        phone: prompt
            .ask_or("Phone", user.phone.as_deref().unwrap_or_default())
            .await?,
        address: Address {
            full_address: prompt.ask_or("Full address", &current.full_address).await?,
            pincode: prompt.ask_or("Pin code", &current.pincode).await?,
            city: prompt.ask_or("City", &current.city).await?,
            state: prompt.ask_or("State", &current.state).await?,
            country: prompt.ask_or("Country", &current.country).await?,
        },
    };

    let user = store.profile().update(&update).await?;
    console::user(&user);
    Ok(())
}
