//! Client state and the services that own it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` holds token + current user, `auth` drives the login lifecycle,
//! `cart` is the local basket, and `catalog`, `checkout` and
//! `password_reset` are the view-facing flows built on top of them.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod password_reset;
pub mod session;
