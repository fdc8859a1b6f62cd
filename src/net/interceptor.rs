//! Session-aware transport middleware.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every API call made by the services passes through `AuthInterceptor`. It
//! attaches the bearer token on the way out and turns any 401 on the way
//! back into a forced logout.
//!
//! ERROR HANDLING
//! ==============
//! The 401 response itself is handed back untouched; the API layer converts
//! it into the same `ClientError::Api` the caller would have seen anyway.

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod interceptor_test;

use std::rc::Rc;

use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::error::ClientError;
use crate::router::Navigator;
use crate::state::session::{Session, end_session};

pub const AUTHORIZATION: &str = "Authorization";
const UNAUTHORIZED: u16 = 401;

pub struct AuthInterceptor<T> {
    inner: T,
    session: Session,
    navigator: Rc<dyn Navigator>,
}

impl<T: Transport> AuthInterceptor<T> {
    pub fn new(inner: T, session: Session, navigator: Rc<dyn Navigator>) -> Self {
        Self { inner, session, navigator }
    }
}

/// Format a bearer credential header value.
#[must_use]
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[async_trait::async_trait(?Send)]
impl<T: Transport> Transport for AuthInterceptor<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let request = match self.session.token() {
            Some(token) => request.with_header(AUTHORIZATION, bearer(&token)),
            None => request,
        };
        let path = request.path.clone();

        let response = self.inner.send(request).await?;
        if response.status == UNAUTHORIZED {
            tracing::warn!(%path, "unauthorized response; ending session");
            if let Err(e) = end_session(&self.session, self.navigator.as_ref()) {
                tracing::warn!(error = %e, "failed to clear stored session");
            }
        }
        Ok(response)
    }
}
