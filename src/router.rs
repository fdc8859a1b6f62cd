//! Route table, navigation and the authorization guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation goes through [`Router::navigate`], which resolves the
//! route, asks [`authorize`] for a decision and hands the final path to the
//! [`Navigator`]. Login redirects and forced logouts use the same navigator.
//!
//! TRADE-OFFS
//! ==========
//! Decisions trust the locally cached user. Nothing is re-validated with the
//! server, so a tampered user record changes what the guard allows; the
//! server still enforces its own checks on every API call.

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::net::types::Role;
use crate::state::session::Session;

pub mod paths {
    pub const ROOT: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const FORGOT_PASSWORD: &str = "/forgot-password";
    pub const HOME: &str = "/home";
    pub const CATEGORIES: &str = "/categories";
    pub const CATEGORY: &str = "/categories/:category";
    pub const PRODUCT: &str = "/products/:id";
    pub const CART: &str = "/cart";
    pub const CHECKOUT: &str = "/checkout";
    pub const PROFILE: &str = "/profile";
    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
    pub const PHARMACY_ADMIN_DASHBOARD: &str = "/pharmacy-admin/dashboard";
}

/// Landing route for a role: the login redirect target and the guard's
/// fallback when a role lacks access.
#[must_use]
pub fn home_for_role(role: Option<Role>) -> &'static str {
    match role {
        Some(Role::SuperAdmin) => paths::ADMIN_DASHBOARD,
        Some(Role::Admin) => paths::PHARMACY_ADMIN_DASHBOARD,
        Some(Role::User) => paths::HOME,
        None => paths::ROOT,
    }
}

// =============================================================================
// NAVIGATION
// =============================================================================

/// Performs the actual location change.
pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// In-process navigator that records every location it is sent to.
#[derive(Debug, Default)]
pub struct History {
    entries: RefCell<Vec<String>>,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.entries.borrow().last().cloned()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str) {
        tracing::info!(%path, "navigate");
        self.entries.borrow_mut().push(path.to_owned());
    }
}

// =============================================================================
// GUARD
// =============================================================================

/// Static route data consulted by the guard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteDef {
    pub pattern: &'static str,
    pub requires_auth: bool,
    /// Lowercase role names allowed through; empty means any signed-in user.
    pub required_roles: &'static [&'static str],
}

impl RouteDef {
    #[must_use]
    pub const fn public(pattern: &'static str) -> Self {
        Self { pattern, requires_auth: false, required_roles: &[] }
    }

    #[must_use]
    pub const fn authenticated(pattern: &'static str) -> Self {
        Self { pattern, requires_auth: true, required_roles: &[] }
    }

    #[must_use]
    pub const fn with_roles(pattern: &'static str, required_roles: &'static [&'static str]) -> Self {
        Self { pattern, requires_auth: true, required_roles }
    }

    /// Match a concrete path, treating `:name` segments as wildcards.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let mut want = self.pattern.trim_matches('/').split('/');
        let mut got = path.trim_matches('/').split('/');
        loop {
            match (want.next(), got.next()) {
                (None, None) => return true,
                (Some(w), Some(g)) if w.starts_with(':') && !g.is_empty() => {}
                (Some(w), Some(g)) if w == g => {}
                _ => return false,
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Decide whether the current session may enter `route`.
#[must_use]
pub fn authorize(session: &Session, route: &RouteDef) -> GuardDecision {
    if !route.requires_auth {
        return GuardDecision::Allow;
    }
    if !session.is_logged_in() {
        return GuardDecision::Redirect(paths::LOGIN.to_owned());
    }
    if route.required_roles.is_empty() {
        return GuardDecision::Allow;
    }

    let role = session.role().unwrap_or_default();
    if route.required_roles.iter().any(|r| r.eq_ignore_ascii_case(&role)) {
        GuardDecision::Allow
    } else {
        tracing::info!(route = route.pattern, %role, "role not permitted");
        GuardDecision::Redirect(home_for_role(Role::parse(&role)).to_owned())
    }
}

// =============================================================================
// ROUTER
// =============================================================================

/// The storefront's routes in match order.
#[must_use]
pub fn default_routes() -> Vec<RouteDef> {
    vec![
        RouteDef::public(paths::ROOT),
        RouteDef::public(paths::LOGIN),
        RouteDef::public(paths::REGISTER),
        RouteDef::public(paths::FORGOT_PASSWORD),
        RouteDef::public(paths::HOME),
        RouteDef::public(paths::CATEGORIES),
        RouteDef::public(paths::CATEGORY),
        RouteDef::public(paths::PRODUCT),
        RouteDef::public(paths::CART),
        RouteDef::authenticated(paths::CHECKOUT),
        RouteDef::authenticated(paths::PROFILE),
        RouteDef::with_roles(paths::ADMIN_DASHBOARD, &["superadmin"]),
        RouteDef::with_roles(paths::PHARMACY_ADMIN_DASHBOARD, &["admin"]),
    ]
}

pub struct Router {
    routes: Vec<RouteDef>,
    session: Session,
    navigator: Rc<dyn Navigator>,
}

impl Router {
    #[must_use]
    pub fn new(session: Session, navigator: Rc<dyn Navigator>) -> Self {
        Self::with_routes(default_routes(), session, navigator)
    }

    #[must_use]
    pub fn with_routes(routes: Vec<RouteDef>, session: Session, navigator: Rc<dyn Navigator>) -> Self {
        Self { routes, session, navigator }
    }

    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&RouteDef> {
        self.routes.iter().find(|r| r.matches(path))
    }

    /// Guard decision for `path` without navigating. Unknown paths redirect to `/`.
    #[must_use]
    pub fn check(&self, path: &str) -> GuardDecision {
        match self.resolve(path) {
            Some(route) => authorize(&self.session, route),
            None => GuardDecision::Redirect(paths::ROOT.to_owned()),
        }
    }

    /// Navigate to `path`, or wherever the guard redirects. Returns the final path.
    pub fn navigate(&self, path: &str) -> String {
        let target = match self.check(path) {
            GuardDecision::Allow => path.to_owned(),
            GuardDecision::Redirect(to) => to,
        };
        self.navigator.navigate(&target);
        target
    }
}
