//! Utility functions and helpers
//!
//! This module contains hashing utilities, the canonical encoding,
//! and other helper functions used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest, sha256_hex};

pub use serialization::canonical_bytes;
