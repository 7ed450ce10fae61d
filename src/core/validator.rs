use crate::core::{Block, ProofOfWork};
use log::{debug, warn};

/// Check linkage and difficulty for a whole chain.
///
/// From the second block on, each block's `previous_hash` must equal the
/// prior block's stored hash, and its recomputed digest (hash field empty,
/// stored nonce) must meet the target. The recomputed digest is not compared
/// against the stored `hash` field. A chain of zero or one block is valid.
pub fn is_chain_valid(chain: &[Block]) -> bool {
    for pair in chain.windows(2) {
        let (previous, block) = (&pair[0], &pair[1]);

        if block.get_previous_hash() != previous.get_hash() {
            debug!("Block {} does not link to its predecessor", block.get_index());
            return false;
        }

        match ProofOfWork::validate(block) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Block {} fails the difficulty target", block.get_index());
                return false;
            }
            Err(e) => {
                warn!("Could not hash block {}: {e}", block.get_index());
                return false;
            }
        }
    }
    true
}
