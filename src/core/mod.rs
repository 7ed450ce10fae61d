//! Core ledger functionality
//!
//! This module contains the fundamental ledger components: transactions,
//! blocks, canonical hashing, proof-of-work sealing, the chain store and
//! chain validation.

pub mod block;
pub mod blockchain;
pub mod hasher;
pub mod proof_of_work;
pub mod transaction;
pub mod validator;

pub use block::{Block, UnsealedBlock, GENESIS_PREVIOUS_HASH};
pub use blockchain::Blockchain;
pub use hasher::BlockPreimage;
pub use proof_of_work::{seal, CancelToken, ProofOfWork, TARGET_PREFIX};
pub use transaction::{Transaction, TransactionRequest};
pub use validator::is_chain_valid;
