// Canonical encoding shared by every hash computation
use crate::error::{BlockchainError, Result};
use serde::Serialize;

/// Serialize a value into its canonical byte form (compact JSON, declaration field order)
pub fn canonical_bytes<T: Serialize>(data: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(data)
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))
}
