//! Inline form validation.
//!
//! SYSTEM CONTEXT
//! ==============
//! Views run these checks before calling a service. Failures are shown next
//! to the offending field and never reach the network.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

use std::collections::BTreeMap;
use std::fmt;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Per-field validation messages keyed by field name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.errors.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when no field failed, otherwise the collected errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Require a non-blank value.
pub fn require(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        return false;
    }
    true
}

/// Loose email shape check: one `@`, non-empty local part, dotted domain.
#[must_use]
pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || value.contains(char::is_whitespace) {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

pub fn check_email(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if require(errors, field, value) && !is_email(value) {
        errors.add(field, "Enter a valid email address.");
    }
}

pub fn check_password(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if require(errors, field, value) && value.chars().count() < MIN_PASSWORD_LEN {
        errors.add(field, format!("Password must be at least {MIN_PASSWORD_LEN} characters."));
    }
}

pub fn check_confirmation(errors: &mut FieldErrors, field: &'static str, password: &str, confirm: &str) {
    if require(errors, field, confirm) && password != confirm {
        errors.add(field, "Passwords do not match.");
    }
}

/// Login form: email + password.
///
/// # Errors
///
/// Returns the field errors when any check fails.
pub fn validate_login(email: &str, password: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    check_email(&mut errors, "email", email);
    require(&mut errors, "password", password);
    errors.into_result()
}

/// Registration form.
///
/// # Errors
///
/// Returns the field errors when any check fails.
pub fn validate_registration(name: &str, email: &str, password: &str, confirm: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "name", name);
    check_email(&mut errors, "email", email);
    check_password(&mut errors, "password", password);
    check_confirmation(&mut errors, "confirm_password", password, confirm);
    errors.into_result()
}

/// Change-password form.
///
/// # Errors
///
/// Returns the field errors when any check fails.
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    require(&mut errors, "current_password", current);
    check_password(&mut errors, "new_password", new);
    check_confirmation(&mut errors, "confirm_password", new, confirm);
    if errors.is_empty() && current == new {
        errors.add("new_password", "New password must differ from the current one.");
    }
    errors.into_result()
}
