//! Typed calls against the remote pharmacy API.
//!
//! ERROR HANDLING
//! ==============
//! Each call is a single attempt. Non-2xx responses become
//! `ClientError::Api` with the most helpful message the body offers, so
//! views can show it verbatim.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::rc::Rc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::transport::{HttpRequest, HttpResponse, Transport};
use super::types::{
    ChangePasswordRequest, EmailRequest, ListEnvelope, LoginRequest, LoginResponse, Product, ProfileUpdate,
    RegisterRequest, ResetPasswordRequest, User, UserEnvelope, VerifyResetCodeRequest,
};
use crate::error::ClientError;

pub const LOGIN_PATH: &str = "/users/login";
pub const REGISTER_PATH: &str = "/users/register";
pub const FORGOT_PASSWORD_PATH: &str = "/users/forgot-password";
pub const VERIFY_RESET_CODE_PATH: &str = "/users/verify-reset-code";
pub const RESET_PASSWORD_PATH: &str = "/users/reset-password";
pub const PROFILE_PATH: &str = "/users/profile";
pub const CHANGE_PASSWORD_PATH: &str = "/users/change-password";
pub const MEDICINES_PATH: &str = "/api/medicines";
pub const PRODUCTS_PATH: &str = "/api/products";

fn user_endpoint(user_id: &str) -> String {
    format!("/users/{user_id}")
}

/// Best-effort human message for a failed response.
///
/// Looks for `message`, then `error` (string or `{ message }`), then falls
/// back to the status code.
fn error_message(status: u16, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let from_body = parsed.as_ref().and_then(|v| {
        v.get("message")
            .and_then(serde_json::Value::as_str)
            .or_else(|| v.get("error").and_then(serde_json::Value::as_str))
            .or_else(|| v.pointer("/error/message").and_then(serde_json::Value::as_str))
    });
    match from_body.map(str::trim) {
        Some(message) if !message.is_empty() => message.to_owned(),
        _ => format!("request failed with status {status}"),
    }
}

fn json_body<T: Serialize>(payload: &T) -> Result<serde_json::Value, ClientError> {
    serde_json::to_value(payload).map_err(|e| ClientError::Decode(format!("request encode failed: {e}")))
}

fn check_status(path: &str, response: HttpResponse) -> Result<HttpResponse, ClientError> {
    if response.is_success() {
        return Ok(response);
    }
    let message = error_message(response.status, &response.body);
    tracing::warn!(%path, status = response.status, %message, "api request failed");
    Err(ClientError::Api { status: response.status, message })
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Rc<dyn Transport>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self { transport }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        check_status(&path, response)
    }

    async fn fetch<R: DeserializeOwned>(&self, request: HttpRequest) -> Result<R, ClientError> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        serde_json::from_str(&response.body).map_err(|e| ClientError::Decode(format!("{path}: {e}")))
    }

    async fn post<B: Serialize>(&self, path: &str, payload: &B) -> Result<HttpResponse, ClientError> {
        self.send(HttpRequest::new(Method::POST, path).with_json(json_body(payload)?))
            .await
    }

    /// `POST /users/login`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on rejected credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = json_body(&LoginRequest { email, password })?;
        self.fetch(HttpRequest::new(Method::POST, LOGIN_PATH).with_json(body))
            .await
    }

    /// `POST /users/register`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the server refuses the registration.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ClientError> {
        self.post(REGISTER_PATH, &RegisterRequest { name, email, password })
            .await
            .map(drop)
    }

    /// `POST /users/forgot-password`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the server refuses the request.
    pub async fn forgot_password(&self, email: &str) -> Result<(), ClientError> {
        self.post(FORGOT_PASSWORD_PATH, &EmailRequest { email })
            .await
            .map(drop)
    }

    /// `POST /users/verify-reset-code`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the code is rejected.
    pub async fn verify_reset_code(&self, email: &str, code: &str) -> Result<(), ClientError> {
        self.post(VERIFY_RESET_CODE_PATH, &VerifyResetCodeRequest { email, code })
            .await
            .map(drop)
    }

    /// `POST /users/reset-password`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the reset is rejected.
    pub async fn reset_password(&self, email: &str, code: &str, new_password: &str) -> Result<(), ClientError> {
        self.post(RESET_PASSWORD_PATH, &ResetPasswordRequest { email, code, new_password })
            .await
            .map(drop)
    }

    /// `PUT /users/profile`. Returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on rejection or `ClientError::Decode` on an unexpected body.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ClientError> {
        let request = HttpRequest::new(Method::PUT, PROFILE_PATH).with_json(json_body(update)?);
        self.fetch::<UserEnvelope>(request)
            .await
            .map(UserEnvelope::into_user)
    }

    /// `POST /users/change-password`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` when the current password is wrong.
    pub async fn change_password(&self, current_password: &str, new_password: &str) -> Result<(), ClientError> {
        self.post(CHANGE_PASSWORD_PATH, &ChangePasswordRequest { current_password, new_password })
            .await
            .map(drop)
    }

    /// `GET /users/:id`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on failure or `ClientError::Decode` on an unexpected body.
    pub async fn get_user(&self, user_id: &str) -> Result<User, ClientError> {
        self.fetch::<UserEnvelope>(HttpRequest::get(user_endpoint(user_id)))
            .await
            .map(UserEnvelope::into_user)
    }

    /// `GET /api/medicines`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on failure or `ClientError::Decode` on an unexpected body.
    pub async fn medicines(&self) -> Result<Vec<Product>, ClientError> {
        self.fetch::<ListEnvelope<Product>>(HttpRequest::get(MEDICINES_PATH))
            .await
            .map(ListEnvelope::into_vec)
    }

    /// `GET /api/products`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` on failure or `ClientError::Decode` on an unexpected body.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        self.fetch::<ListEnvelope<Product>>(HttpRequest::get(PRODUCTS_PATH))
            .await
            .map(ListEnvelope::into_vec)
    }
}
