//! Checkout over the local cart.
//!
//! SYSTEM CONTEXT
//! ==============
//! The remote API has no order endpoint, so checkout stays on the client:
//! validate shipping details, price the cart, hand back a receipt and empty
//! the cart.

#[cfg(test)]
#[path = "checkout_test.rs"]
mod checkout_test;

use super::cart::{CartItem, CartService};
use crate::config::ShippingPolicy;
use crate::error::ClientError;
use crate::validation::{FieldErrors, require};

#[derive(Clone, Debug, PartialEq)]
pub struct CheckoutSummary {
    pub lines: Vec<CartItem>,
    pub item_count: u32,
    pub subtotal: f64,
    pub shipping: f64,
    pub total: f64,
}

impl CheckoutSummary {
    #[must_use]
    pub fn from_cart(cart: &CartService, policy: ShippingPolicy) -> Self {
        let subtotal = cart.total();
        let shipping = if cart.is_empty() || subtotal >= policy.free_threshold { 0.0 } else { policy.fee };
        Self {
            lines: cart.items().to_vec(),
            item_count: cart.count(),
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShippingDetails {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
}

impl ShippingDetails {
    /// # Errors
    ///
    /// Returns per-field messages for missing or malformed values.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        require(&mut errors, "full_name", &self.full_name);
        require(&mut errors, "address", &self.address);
        require(&mut errors, "city", &self.city);
        if require(&mut errors, "phone", &self.phone) && !is_phone(&self.phone) {
            errors.add("phone", "Enter a valid phone number.");
        }
        errors.into_result()
    }
}

/// Digits with optional leading `+` and spaces/dashes; 7 to 15 digits.
fn is_phone(raw: &str) -> bool {
    let raw = raw.trim();
    let body = raw.strip_prefix('+').unwrap_or(raw);
    if !body.chars().all(|c| c.is_ascii_digit() || c == ' ' || c == '-') {
        return false;
    }
    let digits = body.chars().filter(char::is_ascii_digit).count();
    (7..=15).contains(&digits)
}

#[derive(Clone, Debug, PartialEq)]
pub struct OrderReceipt {
    pub summary: CheckoutSummary,
    pub ship_to: ShippingDetails,
}

/// Validate, price and empty the cart.
///
/// # Errors
///
/// Returns `ClientError::EmptyCart`, `ClientError::Validation`, or a storage
/// error when the emptied cart cannot be persisted.
pub fn checkout(
    cart: &mut CartService,
    details: ShippingDetails,
    policy: ShippingPolicy,
) -> Result<OrderReceipt, ClientError> {
    if cart.is_empty() {
        return Err(ClientError::EmptyCart);
    }
    details.validate().map_err(ClientError::Validation)?;

    let summary = CheckoutSummary::from_cart(cart, policy);
    cart.clear_cart()?;
    tracing::info!(items = summary.item_count, total = summary.total, "order placed");
    Ok(OrderReceipt { summary, ship_to: details })
}
