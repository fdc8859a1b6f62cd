//! Login lifecycle for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views call `AuthService` for everything identity related. It writes the
//! outcome into the shared [`Session`] and drives the role-based redirects.
//!
//! ERROR HANDLING
//! ==============
//! One attempt per call, no retry. Remote failures arrive as
//! `ClientError::Api` whose display text is the server's message.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::rc::Rc;

use super::session::{Session, end_session};
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::{ProfileUpdate, Role, User};
use crate::router::{Navigator, home_for_role, paths};
use crate::validation::FieldErrors;

pub struct AuthService {
    api: ApiClient,
    session: Session,
    navigator: Rc<dyn Navigator>,
}

/// Where a freshly signed-in user lands.
#[must_use]
pub fn login_destination(role: &str) -> &'static str {
    match Role::parse(role) {
        Some(role) => home_for_role(Some(role)),
        None => paths::HOME,
    }
}

impl AuthService {
    #[must_use]
    pub fn new(api: ApiClient, session: Session, navigator: Rc<dyn Navigator>) -> Self {
        Self { api, session, navigator }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Sign in, persist the session and redirect by role.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the credentials are rejected, or a
    /// storage error if the session cannot be persisted.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let response = self.api.login(email.trim(), password).await?;
        let (token, user) = response.into_session_user();
        self.session.establish(&token, user.clone())?;

        let destination = login_destination(&user.role);
        tracing::info!(user_id = %user.id, role = %user.role, %destination, "logged in");
        self.navigator.navigate(destination);
        Ok(user)
    }

    /// Create an account. The user still has to sign in afterwards.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the server refuses the registration.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ClientError> {
        self.api.register(name.trim(), email.trim(), password).await?;
        tracing::info!(email = %email.trim(), "registered");
        self.navigator.navigate(paths::LOGIN);
        Ok(())
    }

    /// Forget the session and go to the login page.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the stored session cannot be removed; the
    /// user stays loaded to match storage, and the redirect still happens.
    pub fn logout(&self) -> Result<(), ClientError> {
        tracing::info!("logged out");
        end_session(&self.session, self.navigator.as_ref())?;
        Ok(())
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.session.token()
    }

    /// Re-fetch the current user by id and overwrite the cached copy.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NoCurrentUser` when nobody is loaded, otherwise
    /// whatever the fetch returns.
    pub async fn refresh_user_data(&self) -> Result<User, ClientError> {
        let current = self.session.current_user().ok_or(ClientError::NoCurrentUser)?;
        let fresh = self.api.get_user(&current.id).await?;
        self.session.replace_user(fresh.clone())?;
        Ok(fresh)
    }

    /// Update name/email and refresh the cached user from the response.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Validation` when `update` sets no field,
    /// `ClientError::NoCurrentUser` when nobody is loaded, otherwise whatever
    /// the update returns.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ClientError> {
        if update.is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("profile", "Provide a name or email to update.");
            return Err(ClientError::Validation(errors));
        }
        let current = self.session.current_user().ok_or(ClientError::NoCurrentUser)?;
        let mut updated = self.api.update_profile(update).await?;
        // Some servers omit the role on profile responses; keep the one we routed with.
        if updated.role.trim().is_empty() {
            updated.role = current.role;
        }
        self.session.replace_user(updated.clone())?;
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` when the current password is rejected.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<(), ClientError> {
        self.api.change_password(current_password, new_password).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` when the server refuses the request.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        self.api.forgot_password(email.trim()).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` when the code is rejected.
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<(), ClientError> {
        self.api.verify_reset_code(email.trim(), code.trim()).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` when the reset is rejected.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<(), ClientError> {
        self.api.reset_password(email.trim(), code.trim(), new_password).await
    }
}
