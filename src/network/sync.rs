//! Pull-based reconciliation with peers
//!
//! Two independent protocols, both initiated by this node:
//!
//! - chain adoption: take the longest chain any peer reports, if it is
//!   strictly longer than ours. The incoming chain is adopted as-is.
//! - mempool sync: take the transactions of the first peer that has any,
//!   merge the ones we lack, then prune everything already mined.
//!
//! A peer that fails or answers badly is logged and skipped.

use crate::core::{Block, Blockchain, Transaction};
use crate::error::BlockchainError;
use crate::network::message::{ChainSync, MempoolSync};
use crate::network::peer::PeerClient;
use crate::storage::MemoryPool;
use log::{error, info, warn};

fn log_skipped_peer(peer: &str, protocol: &str, e: &BlockchainError) {
    if e.is_peer_error() {
        warn!("Skipping peer {peer} during {protocol} sync: {e}");
    } else {
        error!("Skipping peer {peer} during {protocol} sync after local failure: {e}");
    }
}

/// Longest-chain adoption across `peers`
pub fn sync_chain<'a>(
    blockchain: &Blockchain,
    peers: impl IntoIterator<Item = &'a String>,
    client: &dyn PeerClient,
) -> ChainSync {
    let mut max_length = blockchain.len();
    let mut longest_chain: Option<Vec<Block>> = None;

    for peer in peers {
        let response = match client.fetch_chain(peer) {
            Ok(response) => response,
            Err(e) => {
                log_skipped_peer(peer, "chain", &e);
                continue;
            }
        };
        if response.chain.is_empty() {
            warn!("Skipping peer {peer} during chain sync: empty chain");
            continue;
        }
        if response.length > max_length {
            info!(
                "Peer {peer} reports a chain of {} blocks (best so far {max_length})",
                response.length
            );
            max_length = response.length;
            longest_chain = Some(response.chain);
        }
    }

    match longest_chain {
        Some(chain) => {
            blockchain.replace(chain);
            ChainSync {
                replaced: true,
                chain: blockchain.snapshot(),
            }
        }
        None => ChainSync {
            replaced: false,
            chain: blockchain.snapshot(),
        },
    }
}

/// Transactions of the first peer that returns a non-empty mempool.
/// Later peers are not contacted.
pub fn collect_peer_transactions<'a>(
    peers: impl IntoIterator<Item = &'a String>,
    client: &dyn PeerClient,
) -> Vec<Transaction> {
    for peer in peers {
        match client.fetch_mempool(peer) {
            Ok(response) if !response.transactions.is_empty() => {
                info!(
                    "Using {} pending transactions from peer {peer}",
                    response.transactions.len()
                );
                return response.transactions;
            }
            Ok(_) => {}
            Err(e) => log_skipped_peer(peer, "mempool", &e),
        }
    }
    Vec::new()
}

/// Merge new peer transactions into the pool, then prune anything already mined
pub fn sync_mempool<'a>(
    memory_pool: &MemoryPool,
    blockchain: &Blockchain,
    peers: impl IntoIterator<Item = &'a String>,
    client: &dyn PeerClient,
) -> MempoolSync {
    let candidates = collect_peer_transactions(peers, client);
    let new_transactions = memory_pool.find_new(&candidates);
    let updated = memory_pool.merge(new_transactions);
    let duplicates_pruned = blockchain.with_blocks(|chain| memory_pool.prune(chain));

    if updated || duplicates_pruned {
        info!(
            "Mempool synced: updated={updated}, pruned={duplicates_pruned}, pending={}",
            memory_pool.len()
        );
    }

    MempoolSync {
        updated,
        duplicates_pruned,
        mempool: memory_pool.get_all(),
    }
}
