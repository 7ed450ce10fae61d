//! # Hadcoin - a minimal proof-of-work ledger
//!
//! One node keeps an append-only chain of sealed blocks, a mempool of
//! pending transactions and a set of known peers, and pulls chain and
//! mempool state from those peers on demand.
//!
//! ## How the code is organized
//! - `core/`: transactions, blocks, canonical hashing, proof-of-work, the
//!   chain store and chain validation
//! - `storage/`: the in-memory transaction pool
//! - `network/`: peer registry, request/reply types, peer clients, chain and
//!   mempool synchronization, and the TCP server
//! - `ledger`: the per-node context tying chain, mempool and peers together
//! - `config/`: node settings from defaults, TOML and the environment
//! - `cli/`: command-line parsing for the node binary
//!
//! ## Things worth remembering
//! - A longer peer chain is adopted by length alone. It is not re-validated.
//! - Mempool sync takes transactions from the first peer that has any and
//!   ignores the rest.
//! - Validation checks linkage and the `0000` prefix of the recomputed
//!   digest. It does not compare against the stored hash.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod ledger;
pub mod network;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use crate::core::{
    is_chain_valid, seal, Block, Blockchain, CancelToken, ProofOfWork, Transaction,
    TransactionRequest, UnsealedBlock,
};
pub use error::{BlockchainError, Result};
pub use ledger::Ledger;
pub use network::{
    ChainResponse, ChainSync, LocalPeerClient, MempoolResponse, MempoolSync, Nodes, Package,
    PeerClient, Reply, Server, TcpPeerClient,
};
pub use storage::MemoryPool;
pub use utils::{current_timestamp, sha256_digest, sha256_hex};
