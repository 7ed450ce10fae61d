//! Canonical content hashing for blocks and transactions
//!
//! Every digest in the ledger is SHA-256 over compact JSON with a fixed
//! field order and the `hash` field forced to the empty string:
//!
//! - transaction: `sender, receiver, amount, timestamp, hash`
//! - block: `index, timestamp, previous_hash, nonce, hash, transactions`
//!
//! Sealing and validation both go through [`BlockPreimage`], so a block
//! hashed during proof-of-work always reproduces during validation.

use crate::core::Transaction;
use crate::error::Result;
use crate::utils::{canonical_bytes, sha256_hex};
use serde::Serialize;

#[derive(Serialize)]
struct TransactionView<'a> {
    sender: &'a str,
    receiver: &'a str,
    amount: f64,
    timestamp: i64,
    hash: &'a str,
}

#[derive(Serialize)]
struct BlockHead<'a> {
    index: u64,
    timestamp: i64,
    previous_hash: &'a str,
}

#[derive(Serialize)]
struct BlockTail<'a> {
    hash: &'a str,
    transactions: &'a [Transaction],
}

/// Hash a transaction's fields with its own hash left empty
pub fn hash_transaction(
    sender: &str,
    receiver: &str,
    amount: f64,
    timestamp: i64,
) -> Result<String> {
    let view = TransactionView {
        sender,
        receiver,
        amount,
        timestamp,
        hash: "",
    };
    Ok(sha256_hex(&canonical_bytes(&view)?))
}

/// The canonical block encoding split around the nonce.
///
/// `head` ends with `"nonce":` and `tail` starts with `,"hash":""`, so
/// `head + nonce + tail` is byte-identical to serializing the whole block
/// with an empty hash. Only the nonce changes between attempts.
#[derive(Debug, Clone)]
pub struct BlockPreimage {
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl BlockPreimage {
    pub fn new(
        index: u64,
        timestamp: i64,
        previous_hash: &str,
        transactions: &[Transaction],
    ) -> Result<BlockPreimage> {
        let mut head = canonical_bytes(&BlockHead {
            index,
            timestamp,
            previous_hash,
        })?;
        head.pop(); // closing brace
        head.extend_from_slice(b",\"nonce\":");

        let tail_object = canonical_bytes(&BlockTail {
            hash: "",
            transactions,
        })?;
        let mut tail = Vec::with_capacity(tail_object.len());
        tail.push(b',');
        tail.extend_from_slice(&tail_object[1..]); // opening brace

        Ok(BlockPreimage { head, tail })
    }

    pub fn bytes(&self, nonce: u64) -> Vec<u8> {
        let nonce = nonce.to_string();
        let mut data = Vec::with_capacity(self.head.len() + nonce.len() + self.tail.len());
        data.extend_from_slice(&self.head);
        data.extend_from_slice(nonce.as_bytes());
        data.extend_from_slice(&self.tail);
        data
    }

    pub fn hash(&self, nonce: u64) -> String {
        sha256_hex(&self.bytes(nonce))
    }
}
