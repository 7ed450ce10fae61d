use crate::core::hasher::BlockPreimage;
use crate::core::{Block, UnsealedBlock};
use crate::error::{BlockchainError, Result};
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A sealed block's hex digest must start with this
pub const TARGET_PREFIX: &str = "0000";

// How many nonces are tried between cancellation checks
const CANCEL_CHECK_INTERVAL: u64 = 4096;

/// Shared flag that stops a running proof-of-work search.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

pub struct ProofOfWork {
    block: UnsealedBlock,
    preimage: BlockPreimage,
    target_prefix: &'static str,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: UnsealedBlock) -> Result<ProofOfWork> {
        let preimage = block.preimage()?;
        Ok(ProofOfWork {
            block,
            preimage,
            target_prefix: TARGET_PREFIX,
        })
    }

    #[cfg(test)]
    fn with_target_prefix(block: UnsealedBlock, target_prefix: &'static str) -> Result<ProofOfWork> {
        let mut pow = ProofOfWork::new_proof_of_work(block)?;
        pow.target_prefix = target_prefix;
        Ok(pow)
    }

    /// Whether a hex digest satisfies the fixed difficulty
    pub fn meets_target(hash: &str) -> bool {
        hash.starts_with(TARGET_PREFIX)
    }

    /// Recompute a sealed block's digest and check it against the target
    pub fn validate(block: &Block) -> Result<bool> {
        Ok(Self::meets_target(&block.compute_hash()?))
    }

    fn prepare_data(&self, nonce: u64) -> Vec<u8> {
        self.preimage.bytes(nonce)
    }

    /// Search nonces from 1 upward until the digest meets the target.
    ///
    /// There is no attempt limit; only `cancel` ends the search early.
    pub fn run(self, cancel: &CancelToken) -> Result<Block> {
        info!(
            "Mining block {} with {} transactions",
            self.block.get_index(),
            self.block.get_transactions().len()
        );

        let mut nonce: u64 = 1;
        loop {
            if nonce % CANCEL_CHECK_INTERVAL == 0 && cancel.is_cancelled() {
                info!(
                    "Mining of block {} cancelled after {nonce} attempts",
                    self.block.get_index()
                );
                return Err(BlockchainError::MiningCancelled);
            }

            let hash = crate::utils::sha256_hex(&self.prepare_data(nonce));
            if hash.starts_with(self.target_prefix) {
                debug!("Found nonce {nonce} for block {}", self.block.get_index());
                return Ok(self.block.seal(nonce, hash));
            }
            nonce += 1;
        }
    }
}

/// Seal a block with the fixed difficulty
pub fn seal(block: UnsealedBlock, cancel: &CancelToken) -> Result<Block> {
    ProofOfWork::new_proof_of_work(block)?.run(cancel)
}
