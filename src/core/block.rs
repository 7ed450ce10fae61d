use crate::core::hasher::BlockPreimage;
use crate::core::Transaction;
use crate::error::Result;
use crate::utils::current_timestamp;
use serde::{Deserialize, Serialize};

/// Previous hash carried by the genesis block
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// A block that has been assembled but has not passed proof-of-work yet.
///
/// It has no hash, and the chain store only accepts [`Block`], so an unsealed
/// block cannot be inserted by mistake.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsealedBlock {
    index: u64,
    timestamp: i64,
    previous_hash: String,
    transactions: Vec<Transaction>,
}

impl UnsealedBlock {
    /// Assemble the next block. `index` is the chain length plus one.
    pub fn new(
        index: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> Result<UnsealedBlock> {
        Ok(UnsealedBlock {
            index,
            timestamp: current_timestamp()?,
            previous_hash,
            transactions,
        })
    }

    #[cfg(test)]
    pub fn new_test_block(
        index: u64,
        timestamp: i64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> UnsealedBlock {
        UnsealedBlock {
            index,
            timestamp,
            previous_hash,
            transactions,
        }
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn preimage(&self) -> Result<BlockPreimage> {
        BlockPreimage::new(
            self.index,
            self.timestamp,
            &self.previous_hash,
            &self.transactions,
        )
    }

    /// Attach a found nonce and its digest
    pub(crate) fn seal(self, nonce: u64, hash: String) -> Block {
        Block {
            index: self.index,
            timestamp: self.timestamp,
            previous_hash: self.previous_hash,
            nonce,
            hash,
            transactions: self.transactions,
        }
    }
}

/// A sealed block, as stored in the chain and exchanged with peers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: i64,
    previous_hash: String,
    nonce: u64,
    hash: String,
    transactions: Vec<Transaction>,
}

impl Block {
    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_hash(&self) -> &str {
        self.hash.as_str()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn contains_transaction(&self, tx: &Transaction) -> bool {
        self.transactions.contains(tx)
    }

    /// Recompute the digest from the stored fields and nonce, hash field empty
    pub fn compute_hash(&self) -> Result<String> {
        let preimage = BlockPreimage::new(
            self.index,
            self.timestamp,
            &self.previous_hash,
            &self.transactions,
        )?;
        Ok(preimage.hash(self.nonce))
    }
}
