//! Shared fixtures for unit tests: a scripted transport and session builders.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use serde_json::json;

use crate::error::ClientError;
use crate::net::transport::{HttpRequest, HttpResponse, Transport};
use crate::net::types::User;
use crate::router::History;
use crate::state::session::Session;
use crate::storage::{KeyValueStore, MemoryStore};

/// Transport that replays queued responses and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<HttpResponse>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn push(&self, status: u16, body: serde_json::Value) {
        self.responses.borrow_mut().push_back(HttpResponse::new(status, body.to_string()));
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    pub fn last_request(&self) -> HttpRequest {
        self.requests.borrow().last().cloned().expect("no request was sent")
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ClientError::Request("no scripted response".to_owned()))
    }
}

pub fn user(id: &str, role: &str) -> User {
    User { id: id.to_owned(), email: format!("{id}@example.com"), role: role.to_owned(), name: format!("User {id}") }
}

pub fn login_body(token: &str, role: &str) -> serde_json::Value {
    json!({
        "token": token,
        "user": { "id": "u1", "email": "u1@example.com", "role": role, "name": "User u1" }
    })
}

pub fn empty_session() -> Session {
    Session::restore(Rc::new(MemoryStore::new()))
}

pub fn signed_in_session(role: &str) -> Session {
    let session = empty_session();
    session.establish("tok-1", user("u1", role)).expect("memory store never fails");
    session
}

pub fn history() -> Rc<History> {
    Rc::new(History::new())
}

pub fn stored(session: &Session, key: &str) -> Option<String> {
    session.store().get(key)
}
