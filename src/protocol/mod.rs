//! Protocol Module
//!
//! The HTTP wire contract: how request bodies are read and how results
//! and errors become responses.
//!
//! ### Bodies
//! - Requests: JSON objects with camelCase fields; unknown fields ignored
//! - Success: JSON record / array, or a plain-text confirmation for deletes
//! - Failure: plain-text message
//!
//! ### Status Codes
//! - 200: OK
//! - 400: malformed body, invalid fields, or (on some routes) unknown id
//! - 404: unknown id, orphaned reference, or empty supplier listing
//! - 500: storage failure

mod request;
mod response;

pub use request::parse_body;
pub use response::ApiError;
