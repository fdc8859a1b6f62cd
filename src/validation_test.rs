use super::*;

// =============================================================================
// is_email
// =============================================================================

#[test]
fn is_email_accepts_plain_address() {
    assert!(is_email("alice@example.com"));
    assert!(is_email("  bob@pharma.co.uk  "));
}

#[test]
fn is_email_rejects_malformed() {
    for bad in ["", "alice", "@example.com", "alice@", "alice@example", "a@b@c.com", "a b@c.com", "alice@.com"] {
        assert!(!is_email(bad), "expected {bad:?} to be rejected");
    }
}

// =============================================================================
// forms
// =============================================================================

#[test]
fn validate_login_requires_both_fields() {
    let errors = validate_login("", "").unwrap_err();
    assert_eq!(errors.get("email"), Some("This field is required."));
    assert_eq!(errors.get("password"), Some("This field is required."));
}

#[test]
fn validate_login_flags_bad_email_only() {
    let errors = validate_login("nope", "secret").unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get("email"), Some("Enter a valid email address."));
}

#[test]
fn validate_login_accepts_good_input() {
    assert!(validate_login("a@b.com", "x").is_ok());
}

#[test]
fn validate_registration_checks_length_and_confirmation() {
    let errors = validate_registration("Ann", "ann@example.com", "abc", "abd").unwrap_err();
    assert_eq!(errors.get("password"), Some("Password must be at least 6 characters."));
    assert_eq!(errors.get("confirm_password"), Some("Passwords do not match."));
    assert_eq!(errors.get("name"), None);
}

#[test]
fn validate_password_change_rejects_reuse() {
    let errors = validate_password_change("secret1", "secret1", "secret1").unwrap_err();
    assert_eq!(errors.get("new_password"), Some("New password must differ from the current one."));
    assert!(validate_password_change("secret1", "secret2", "secret2").is_ok());
}

// =============================================================================
// FieldErrors
// =============================================================================

#[test]
fn field_errors_first_message_wins() {
    let mut errors = FieldErrors::new();
    errors.add("email", "first");
    errors.add("email", "second");
    assert_eq!(errors.get("email"), Some("first"));
}

#[test]
fn field_errors_display_joins_sorted_fields() {
    let mut errors = FieldErrors::new();
    errors.add("password", "too short");
    errors.add("email", "missing");
    assert_eq!(errors.to_string(), "email: missing; password: too short");
}
