//! Networking modules for the remote pharmacy API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` moves raw requests, `interceptor` layers session handling on
//! top of any transport, `api` maps endpoints to typed calls, and `types`
//! defines the wire schema.

pub mod api;
pub mod interceptor;
pub mod transport;
pub mod types;
