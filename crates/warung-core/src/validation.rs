//! # Validation Module
//!
//! Pure, side-effect-free payload validation for Warung POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Validation Layers                            │
//! │                                                                     │
//! │  Layer 1: THIS MODULE - payload shape/bounds                        │
//! │  ├── trimmed string lengths, numeric signs, cart non-empty          │
//! │  └── never touches storage; same payload → same report              │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 2: Settlement engine - business rules against current state  │
//! │  ├── product exists, stock sufficiency, payment sufficiency         │
//! │  └── debt idempotency                                               │
//! │           │                                                         │
//! │           ▼                                                         │
//! │  Layer 3: Database - CHECK / NOT NULL constraints                   │
//! │                                                                     │
//! │  Defense in depth: each layer catches a different class of error    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use warung_core::types::NewDebt;
//! use warung_core::validation::validate_debt;
//!
//! let report = validate_debt(&NewDebt {
//!     customer_name: "B".to_string(),
//!     amount: 0,
//!     description: String::new(),
//!     due_date: None,
//! });
//!
//! assert!(!report.valid);
//! assert_eq!(report.errors.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::checkout::CheckoutRequest;
use crate::error::ValidationError;
use crate::types::{NewCategory, NewCustomer, NewDebt, NewProduct};
use crate::MIN_NAME_LEN;

/// Result type for single-field validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Validation Report
// =============================================================================

/// Structured outcome of a payload validation.
///
/// Collects every failure rather than stopping at the first, so a form
/// can show all problems at once.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationReport {
    pub valid: bool,
    /// Human-readable messages, one per failed rule. Empty when valid.
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Builds a report from the outcome of individual field checks.
    fn collect(checks: impl IntoIterator<Item = ValidationResult<()>>) -> Self {
        let errors: Vec<String> = checks
            .into_iter()
            .filter_map(|check| check.err().map(|e| e.to_string()))
            .collect();

        ValidationReport {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Passing report with no errors.
    pub fn ok() -> Self {
        ValidationReport {
            valid: true,
            errors: Vec::new(),
        }
    }
}

// =============================================================================
// Field Validators
// =============================================================================

/// Validates a display name (product, category, customer, debtor).
///
/// ## Rules
/// - Trimmed length ≥ 2
pub fn validate_name(field: &'static str, name: &str) -> ValidationResult<()> {
    if name.trim().len() < MIN_NAME_LEN {
        return Err(ValidationError::TooShort {
            field,
            min: MIN_NAME_LEN,
        });
    }
    Ok(())
}

/// Validates a non-blank string field (e.g. product category).
pub fn validate_required(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(())
}

/// Validates a monetary or stock value that may be zero but not negative.
pub fn validate_non_negative(field: &'static str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::MustBeNonNegative { field });
    }
    Ok(())
}

/// Validates a value that must be strictly positive (debt amount,
/// cart quantity).
pub fn validate_positive(field: &'static str, value: i64) -> ValidationResult<()> {
    if value <= 0 {
        return Err(ValidationError::MustBePositive { field });
    }
    Ok(())
}

/// Validates a hex color code (`#RGB` or `#RRGGBB`).
pub fn validate_color(color: &str) -> ValidationResult<()> {
    let rest = match color.strip_prefix('#') {
        Some(rest) => rest,
        None => {
            return Err(ValidationError::InvalidFormat {
                field: "color",
                reason: "must start with '#'",
            })
        }
    };

    if !(rest.len() == 3 || rest.len() == 6) || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidFormat {
            field: "color",
            reason: "must be a 3 or 6 digit hex code",
        });
    }

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a product payload before it reaches the catalog.
pub fn validate_product(payload: &NewProduct) -> ValidationReport {
    ValidationReport::collect([
        validate_name("name", &payload.name),
        validate_required("category", &payload.category),
        validate_non_negative("price", payload.price),
        validate_non_negative("stock", payload.stock),
    ])
}

/// Validates a checkout payload's shape.
///
/// Only the payload: the cart must be non-empty and every quantity a
/// positive integer. Whether the amount paid actually covers the total
/// is a business rule checked later, against resolved prices - a
/// shortage is a rejection, not a shape error.
pub fn validate_checkout(payload: &CheckoutRequest) -> ValidationReport {
    let mut checks: Vec<ValidationResult<()>> = Vec::with_capacity(payload.items.len() + 1);

    if payload.items.is_empty() {
        checks.push(Err(ValidationError::Empty { field: "items" }));
    }

    for line in &payload.items {
        checks.push(validate_required("productId", &line.product_id));
        checks.push(validate_positive("quantity", line.quantity));
    }

    ValidationReport::collect(checks)
}

/// Validates a debt payload.
pub fn validate_debt(payload: &NewDebt) -> ValidationReport {
    ValidationReport::collect([
        validate_name("customerName", &payload.customer_name),
        validate_positive("amount", payload.amount),
    ])
}

/// Validates a category payload.
pub fn validate_category(payload: &NewCategory) -> ValidationReport {
    let mut checks = vec![validate_name("name", &payload.name)];
    if let Some(color) = &payload.color {
        checks.push(validate_color(color));
    }
    ValidationReport::collect(checks)
}

/// Validates a customer payload.
pub fn validate_customer(payload: &NewCustomer) -> ValidationReport {
    ValidationReport::collect([validate_name("name", &payload.name)])
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkout::CartLine;
    use crate::types::PaymentMethod;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("name", "Indomie Goreng").is_ok());
        assert!(validate_name("name", "Ab").is_ok());

        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", " A ").is_err());
    }

    #[test]
    fn test_validate_product_collects_all_errors() {
        let report = validate_product(&NewProduct {
            name: "X".to_string(),
            category: "  ".to_string(),
            price: -100,
            stock: -1,
        });

        assert!(!report.valid);
        assert_eq!(report.errors.len(), 4);

        let report = validate_product(&NewProduct {
            name: "Indomie".to_string(),
            category: "Makanan".to_string(),
            price: 3_500,
            stock: 0,
        });
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_validate_checkout_rejects_empty_cart() {
        let report = validate_checkout(&CheckoutRequest {
            items: vec![],
            amount_paid: 10_000,
            discount: 0,
            payment_method: PaymentMethod::Cash,
            note: String::new(),
        });

        assert!(!report.valid);
        assert_eq!(report.errors, vec!["items must not be empty"]);
    }

    #[test]
    fn test_validate_checkout_rejects_non_positive_quantity() {
        let report = validate_checkout(&CheckoutRequest {
            items: vec![
                CartLine {
                    product_id: "p1".to_string(),
                    quantity: 0,
                },
                CartLine {
                    product_id: "p2".to_string(),
                    quantity: 2,
                },
            ],
            amount_paid: 10_000,
            discount: 0,
            payment_method: PaymentMethod::Cash,
            note: String::new(),
        });

        assert!(!report.valid);
        assert_eq!(report.errors, vec!["quantity must be greater than zero"]);
    }

    #[test]
    fn test_validate_debt() {
        let report = validate_debt(&NewDebt {
            customer_name: "Budi".to_string(),
            amount: 50_000,
            description: String::new(),
            due_date: None,
        });
        assert!(report.valid);

        let report = validate_debt(&NewDebt {
            customer_name: "B".to_string(),
            amount: 0,
            description: String::new(),
            due_date: None,
        });
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#C4643C").is_ok());
        assert!(validate_color("#fff").is_ok());

        assert!(validate_color("C4643C").is_err());
        assert!(validate_color("#12345").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }
}
