//! Validation of raw order requests before any stock is touched.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{Customer, OrderCreate, OrderRequest, ShippingAddress};
use super::error::OrderError;

const MAX_NAME_LEN: usize = 100;

/// An order request that passed validation, normalized for the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIntake {
    pub customer: Customer,
    pub address: ShippingAddress,
    pub product_id: String,
    pub quantity: u32,
    pub notes: Option<String>,
}

impl ValidatedIntake {
    pub fn into_create(self, unit_price: f64) -> OrderCreate {
        OrderCreate {
            customer: self.customer,
            address: self.address,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price,
            notes: self.notes,
        }
    }
}

/// Checks every field and reports all problems at once.
pub fn validate(request: OrderRequest) -> Result<ValidatedIntake, OrderError> {
    let mut problems = Vec::new();

    let name = request.name.trim().to_string();
    if name.is_empty() {
        problems.push("Name is required".to_string());
    } else if name.chars().count() > MAX_NAME_LEN {
        problems.push(format!("Name must be at most {MAX_NAME_LEN} characters"));
    }

    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        problems.push("Email is required".to_string());
    } else if !is_valid_email(&email) {
        problems.push("Please provide a valid email".to_string());
    }

    let product_id = request.product_id.trim().to_string();
    if product_id.is_empty() {
        problems.push("Product ID is required".to_string());
    }

    if request.quantity < 1 {
        problems.push("Quantity must be at least 1".to_string());
    }

    let phone = request.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty());
    if let Some(phone) = &phone {
        if !is_valid_phone(phone) {
            problems.push("Please provide a valid phone number".to_string());
        }
    }

    if !problems.is_empty() {
        return Err(OrderError::ValidationError(problems.join("; ")));
    }

    let mut address = request.address;
    if address.country.trim().is_empty() {
        address.country = ShippingAddress::default().country;
    }

    Ok(ValidatedIntake {
        customer: Customer { name, email, phone },
        address,
        product_id,
        quantity: request.quantity,
        notes: request.notes,
    })
}

/// Non-blank text, an `@`, and a dot with text on both sides.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email regex is valid"));

/// Digits, whitespace and `+-()` only.
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\s+()-]+$").expect("phone regex is valid"));

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}
