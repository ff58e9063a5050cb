//! Request body decoding

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::SupplyError;
use super::ApiError;

/// Decode a JSON body
///
/// Syntax errors and type mismatches are both bad requests; missing
/// fields are left to the payload's own validation.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        ApiError::from(SupplyError::BadRequest(format!(
            "Check data types and required fields! ({})",
            e
        )))
    })
}
