// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authenticate at the gateway, then reach the application.

use super::{PortalProtocol, ProtocolError};
use crate::page::PortalPage;
use crate::recorder::StepRecorder;
use dp_core::Secret;

impl PortalProtocol {
    /// Log in with `identity` and `secret`.
    ///
    /// A challenge widget on the login page ends the attempt with
    /// [`ProtocolError::ChallengeDetected`] before any credential is typed.
    pub async fn authenticate<P, R>(
        &self,
        page: &P,
        recorder: &R,
        identity: &str,
        secret: &Secret,
    ) -> Result<(), ProtocolError>
    where
        P: PortalPage + ?Sized,
        R: StepRecorder + ?Sized,
    {
        let login = &self.selectors.login;

        recorder.log("opening login page");
        page.goto(login.url).await?;
        page.wait_for_settle().await?;
        self.capture(page, recorder, "login-page", "Login page").await?;

        if page.find(login.challenge).await?.is_found() {
            self.capture(page, recorder, "challenge-detected", "Challenge detected").await?;
            recorder.log("anti-automation challenge detected, stopping");
            return Err(ProtocolError::ChallengeDetected);
        }

        page.fill(login.identity_input, identity).await?;
        page.click(login.identity_submit).await?;
        page.wait_for_settle().await?;
        self.capture(page, recorder, "identity-submitted", "Identity submitted").await?;
        recorder.log("identity submitted");

        page.fill(login.secret_input, secret.expose()).await?;
        page.click(login.secret_submit).await?;
        page.wait_for_settle().await?;
        self.capture(page, recorder, "password-submitted", "Password submitted").await?;
        recorder.log("password submitted");

        if let Some(text) = page.text(login.error_banner).await? {
            self.capture(page, recorder, "login-error", "Login error").await?;
            let message = non_empty_or(text, "login failed");
            recorder.log(&format!("login rejected: {}", message));
            return Err(ProtocolError::LoginRejected(message));
        }

        let url = page.url().await?;
        if self.selectors.is_login_url(&url) {
            recorder.log("still on the login page after submitting credentials");
            return Err(ProtocolError::StillOnLoginPage);
        }

        recorder.log("authenticated");
        Ok(())
    }

    /// Open the services directory and follow the link to the application,
    /// searching for it by name when no direct link is shown.
    pub async fn reach_application<P, R>(&self, page: &P, recorder: &R) -> Result<(), ProtocolError>
    where
        P: PortalPage + ?Sized,
        R: StepRecorder + ?Sized,
    {
        let directory = &self.selectors.directory;

        recorder.log("opening services directory");
        page.goto(directory.url).await?;
        page.wait_for_settle().await?;
        self.capture(page, recorder, "services-directory", "Services directory").await?;

        if !page.find(directory.app_link).await?.is_found() {
            recorder.log(&format!("no direct link, searching for {}", directory.app_name));
            page.fill(directory.search_input, directory.app_name).await?;
            page.wait_for_settle().await?;
            if !page.find(directory.app_link).await?.is_found() {
                recorder.log("application link not found");
                return Err(ProtocolError::ApplicationNotFound);
            }
        }

        page.click(directory.app_link).await?;
        page.wait_for_settle().await?;
        self.capture(page, recorder, "application", "Application opened").await?;
        recorder.log(&format!("opened {}", directory.app_name));
        Ok(())
    }
}

pub(super) fn non_empty_or(text: String, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}
