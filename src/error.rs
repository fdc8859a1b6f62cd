//! Error taxonomy shared by the services and the CLI.
//!
//! ERROR HANDLING
//! ==============
//! Remote failures are normalized into `Api { status, message }` with the
//! best message the response body offers. Form validation failures travel
//! separately as `FieldErrors` and only become a `ClientError` when a flow
//! (checkout, password reset) refuses to proceed.

use crate::storage::StorageError;
use crate::validation::FieldErrors;

/// Errors produced by client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The remote API answered with a non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("request failed: {0}")]
    Request(String),

    /// A response body did not match the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// An operation needed a loaded user and there was none.
    #[error("no user is currently loaded")]
    NoCurrentUser,

    /// Checkout was attempted with nothing in the cart.
    #[error("cart is empty")]
    EmptyCart,

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Input was rejected before any remote call was made.
    #[error("invalid input: {0}")]
    Validation(FieldErrors),
}

impl ClientError {
    /// HTTP status of an API failure, if this error came from one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the remote API rejected the session credentials.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
