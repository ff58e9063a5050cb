//! Domain records
//!
//! Suppliers and products as stored in their maps and returned over HTTP.
//! Both serialize every field in binary formats; human-readable formats
//! (JSON) leave out `updatedAt` until the record has been updated once.

mod product;
mod supplier;

pub use product::{Product, ProductCreate, ProductPatch, ProductWithSupplier};
pub use supplier::{Supplier, SupplierCreate, SupplierPatch};

use crate::error::{Result, SupplyError};

const FIELD_HINT: &str = "Check data types and required fields!";

/// A present, non-blank string field
pub(crate) fn required_text(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(text) => non_empty_text(field, text),
        None => Err(SupplyError::BadRequest(format!("{FIELD_HINT} missing `{field}`"))),
    }
}

/// A string field that, when supplied, must not be blank
pub(crate) fn non_empty_text(field: &str, value: String) -> Result<String> {
    if value.trim().is_empty() {
        return Err(SupplyError::BadRequest(format!(
            "{FIELD_HINT} `{field}` must be a non-empty string"
        )));
    }
    Ok(value)
}

pub(crate) fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| SupplyError::BadRequest(format!("{FIELD_HINT} missing `{field}`")))
}

pub(crate) fn valid_price(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(SupplyError::BadRequest(format!(
            "{FIELD_HINT} `price` must be a non-negative number"
        )));
    }
    Ok(value)
}
