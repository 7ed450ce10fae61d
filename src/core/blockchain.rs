// The chain store: an in-memory, append-only list of sealed blocks.
// All mutation goes through one RwLock so readers never see a half-replaced chain.

use crate::core::Block;
use crate::error::{BlockchainError, Result};
use log::info;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct Blockchain {
    blocks: RwLock<Vec<Block>>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// An empty store; the ledger appends the genesis block right after
    pub fn new() -> Blockchain {
        Blockchain {
            blocks: RwLock::new(Vec::new()),
        }
    }

    pub fn from_blocks(blocks: Vec<Block>) -> Blockchain {
        Blockchain {
            blocks: RwLock::new(blocks),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Block>> {
        self.blocks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Block>> {
        self.blocks.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Push a sealed block. No validation happens here.
    pub fn append(&self, block: Block) -> Block {
        self.write().push(block.clone());
        block
    }

    pub fn tail(&self) -> Result<Block> {
        self.read().last().cloned().ok_or(BlockchainError::EmptyChain)
    }

    /// Wholesale substitution. The incoming chain is trusted as given.
    pub fn replace(&self, new_chain: Vec<Block>) {
        let mut blocks = self.write();
        info!(
            "Replacing local chain of {} blocks with {} blocks",
            blocks.len(),
            new_chain.len()
        );
        *blocks = new_chain;
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.read().clone()
    }

    /// Run `f` against the current chain while holding the read lock
    pub fn with_blocks<T>(&self, f: impl FnOnce(&[Block]) -> T) -> T {
        f(self.read().as_slice())
    }
}
