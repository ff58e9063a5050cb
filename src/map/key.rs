//! Order-preserving key codecs
//!
//! The engine compares keys as raw bytes, so every encoding here must
//! sort the same way its type does.

use crate::error::{Result, SupplyError};

/// A type usable as an `OrderedMap` key
pub trait Key: Sized {
    /// Encode so that byte order equals `Ord` order
    fn to_key_bytes(&self) -> Vec<u8>;

    /// Decode bytes produced by `to_key_bytes`
    fn from_key_bytes(bytes: &[u8]) -> Result<Self>;
}

impl Key for String {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| SupplyError::Serialization(format!("key is not UTF-8: {}", e)))
    }
}

/// Big-endian so numeric order survives byte comparison
impl Key for u64 {
    fn to_key_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }

    fn from_key_bytes(bytes: &[u8]) -> Result<Self> {
        let buf: [u8; 8] = bytes.try_into().map_err(|_| {
            SupplyError::Serialization(format!("u64 key must be 8 bytes, got {}", bytes.len()))
        })?;
        Ok(u64::from_be_bytes(buf))
    }
}
