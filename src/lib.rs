//! Client-side core for the pharmacy marketplace.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views (the CLI in `main.rs`, or any other front end) talk to the services
//! in `state`, which reach the remote API through `net`. The router consults
//! the same `Session` before every navigation.
//!
//! DESIGN
//! ======
//! The session (token + current user) is an explicitly owned context handed
//! to each service. Everything runs on one thread; shared handles are `Rc`.

pub mod config;
pub mod error;
pub mod net;
pub mod router;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
#[path = "helpers_test.rs"]
mod test_helpers;

pub use config::ClientConfig;
pub use error::ClientError;
pub use router::{GuardDecision, History, Navigator, Router};
pub use state::auth::AuthService;
pub use state::cart::CartService;
pub use state::session::Session;
