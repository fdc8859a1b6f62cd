//! Multi-step password reset: email, then emailed code, then new password.
//!
//! DESIGN
//! ======
//! The wizard only advances after the remote step succeeds. Validation
//! failures never reach the network; remote failures keep the current step
//! and record the server message for display.

#[cfg(test)]
#[path = "password_reset_test.rs"]
mod password_reset_test;

use super::auth::AuthService;
use crate::error::ClientError;
use crate::validation::{FieldErrors, check_confirmation, check_email, check_password, require};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResetStep {
    #[default]
    EnterEmail,
    EnterCode,
    NewPassword,
    Done,
}

#[derive(Debug, Default)]
pub struct PasswordResetWizard {
    step: ResetStep,
    email: String,
    code: String,
    last_error: Option<String>,
}

/// Codes are pasted or typed by hand; drop stray whitespace but keep case
/// and length as the server issued them.
fn normalize_code(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

impl PasswordResetWizard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(&self) -> ResetStep {
        self.step
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Step 1: request a reset code for `email`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` for a bad email or the remote error.
    pub async fn submit_email(&mut self, auth: &AuthService, email: &str) -> Result<(), ClientError> {
        let email = email.trim();
        let mut errors = FieldErrors::new();
        check_email(&mut errors, "email", email);
        errors.into_result().map_err(ClientError::Validation)?;

        let result = auth.forgot_password(email).await;
        self.track(result)?;
        email.clone_into(&mut self.email);
        self.step = ResetStep::EnterCode;
        Ok(())
    }

    /// Step 2: verify the emailed code.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when called out of order or with a
    /// blank code, or the remote error.
    pub async fn submit_code(&mut self, auth: &AuthService, code: &str) -> Result<(), ClientError> {
        self.expect_step(ResetStep::EnterCode, "code")?;
        let code = normalize_code(code);
        let mut errors = FieldErrors::new();
        require(&mut errors, "code", &code);
        errors.into_result().map_err(ClientError::Validation)?;

        let result = auth.verify_reset_code(&self.email, &code).await;
        self.track(result)?;
        self.code = code;
        self.step = ResetStep::NewPassword;
        Ok(())
    }

    /// Step 3: set the new password.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when called out of order or with a
    /// weak/mismatched password, or the remote error.
    pub async fn submit_password(&mut self, auth: &AuthService, password: &str, confirm: &str) -> Result<(), ClientError> {
        self.expect_step(ResetStep::NewPassword, "password")?;
        let mut errors = FieldErrors::new();
        check_password(&mut errors, "password", password);
        check_confirmation(&mut errors, "confirm_password", password, confirm);
        errors.into_result().map_err(ClientError::Validation)?;

        let result = auth.reset_password(&self.email, &self.code, password).await;
        self.track(result)?;
        self.code.clear();
        self.step = ResetStep::Done;
        Ok(())
    }

    /// Go back one step. The code is forgotten when leaving the password step.
    pub fn back(&mut self) {
        self.last_error = None;
        self.step = match self.step {
            ResetStep::EnterEmail | ResetStep::EnterCode => ResetStep::EnterEmail,
            ResetStep::NewPassword => {
                self.code.clear();
                ResetStep::EnterCode
            }
            ResetStep::Done => ResetStep::Done,
        };
    }

    fn expect_step(&self, want: ResetStep, field: &'static str) -> Result<(), ClientError> {
        if self.step == want {
            return Ok(());
        }
        let mut errors = FieldErrors::new();
        errors.add(field, "Complete the previous step first.");
        Err(ClientError::Validation(errors))
    }

    fn track(&mut self, result: Result<(), ClientError>) -> Result<(), ClientError> {
        match result {
            Ok(()) => {
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
