// A transaction is a plain value transfer record: who pays, who receives, how much.
// There are no signatures or balances; the ledger accepts what it is given.

use crate::core::hasher::hash_transaction;
use crate::error::{BlockchainError, Result};
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};

/// A pending or mined transfer.
///
/// Field declaration order is the canonical hashing order. Equality is
/// full-field equality, which is what mempool dedup and pruning rely on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    sender: String,
    receiver: String,
    amount: f64,
    timestamp: i64,
    hash: String,
}

// JSON has no encoding for NaN or infinity, and NaN breaks equality.
// The sign is not checked.
fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        Err(BlockchainError::MalformedInput(format!(
            "The amount must be a finite number, got {amount}"
        )))
    }
}

impl Transaction {
    // The hash is computed here once and never again
    pub fn new(sender: &str, receiver: &str, amount: f64) -> Result<Transaction> {
        let timestamp = current_timestamp()?;
        Self::with_timestamp(sender, receiver, amount, timestamp)
    }

    pub fn with_timestamp(
        sender: &str,
        receiver: &str,
        amount: f64,
        timestamp: i64,
    ) -> Result<Transaction> {
        check_amount(amount)?;
        let hash = hash_transaction(sender, receiver, amount, timestamp)?;
        Ok(Transaction {
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            amount,
            timestamp,
            hash,
        })
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_receiver(&self) -> &str {
        self.receiver.as_str()
    }

    pub fn get_amount(&self) -> f64 {
        self.amount
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }
}

/// A transaction submission as it arrives from a client; every field is optional
/// until checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub amount: Option<f64>,
}

impl TransactionRequest {
    pub fn new(sender: &str, receiver: &str, amount: f64) -> TransactionRequest {
        TransactionRequest {
            sender: Some(sender.to_string()),
            receiver: Some(receiver.to_string()),
            amount: Some(amount),
        }
    }

    /// Check that sender, receiver and amount are all present
    pub fn into_parts(self) -> Result<(String, String, f64)> {
        let mut missing = Vec::new();
        if self.sender.is_none() {
            missing.push("sender");
        }
        if self.receiver.is_none() {
            missing.push("receiver");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }

        match (self.sender, self.receiver, self.amount) {
            (Some(sender), Some(receiver), Some(amount)) => {
                check_amount(amount)?;
                Ok((sender, receiver, amount))
            }
            _ => Err(BlockchainError::MalformedInput(format!(
                "Some elements of the transaction are missing: {}",
                missing.join(", ")
            ))),
        }
    }
}
