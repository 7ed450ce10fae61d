//! In-memory storage
//!
//! This module holds the memory pool of transactions waiting to be mined.
//! Nothing is persisted; a restarted node starts again from genesis.

pub mod memory_pool;

pub use memory_pool::MemoryPool;
