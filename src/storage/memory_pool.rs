use crate::core::{Block, Transaction};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Pending transactions in arrival order.
///
/// Membership is full-field equality, not hash equality.
pub struct MemoryPool {
    inner: RwLock<Vec<Transaction>>,
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPool {
    pub fn new() -> MemoryPool {
        MemoryPool {
            inner: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Transaction>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Transaction>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add(&self, tx: Transaction) {
        self.write().push(tx);
    }

    /// Take every pending transaction and leave the pool empty, under one lock
    pub fn drain(&self) -> Vec<Transaction> {
        std::mem::take(&mut *self.write())
    }

    /// The candidates that are not already pending
    pub fn find_new(&self, candidates: &[Transaction]) -> Vec<Transaction> {
        let pool = self.read();
        candidates
            .iter()
            .filter(|tx| !pool.contains(tx))
            .cloned()
            .collect()
    }

    /// Append each incoming transaction that is not already pending.
    /// Returns whether anything was added.
    pub fn merge(&self, incoming: Vec<Transaction>) -> bool {
        let mut pool = self.write();
        let mut added = false;
        for tx in incoming {
            if !pool.contains(&tx) {
                pool.push(tx);
                added = true;
            }
        }
        added
    }

    /// Drop every pending transaction that already sits in a block of `chain`.
    /// Returns whether anything was removed.
    pub fn prune(&self, chain: &[Block]) -> bool {
        let mut pool = self.write();
        let before = pool.len();
        pool.retain(|tx| !chain.iter().any(|block| block.contains_transaction(tx)));
        pool.len() != before
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn get_all(&self) -> Vec<Transaction> {
        self.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
