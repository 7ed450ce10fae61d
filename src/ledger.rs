//! The ledger context: one chain, one mempool and one peer registry per node.
//!
//! A [`Ledger`] is created at start-up and handed to whoever serves requests;
//! there is no process-wide state. All operations take `&self` and the ledger
//! is `Send + Sync`, so it is usually shared behind an `Arc`.

use crate::config::Config;
use crate::core::{
    is_chain_valid, seal, Block, Blockchain, CancelToken, Transaction, TransactionRequest,
    UnsealedBlock, GENESIS_PREVIOUS_HASH,
};
use crate::error::Result;
use crate::network::message::{ChainResponse, ChainSync, MempoolSync};
use crate::network::{sync, Nodes, PeerClient};
use crate::storage::MemoryPool;
use log::info;
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Ledger {
    node_id: String,
    blockchain: Blockchain,
    memory_pool: MemoryPool,
    nodes: Nodes,
    // Held across build, seal and append, and while adopting a peer chain,
    // so a mined block always links to the tail it was built on.
    chain_writer: Mutex<()>,
    cancel: CancelToken,
}

impl Ledger {
    /// Create a ledger and mine its genesis block
    pub fn new(node_id: &str) -> Result<Ledger> {
        let ledger = Ledger {
            node_id: node_id.to_string(),
            blockchain: Blockchain::new(),
            memory_pool: MemoryPool::new(),
            nodes: Nodes::new(),
            chain_writer: Mutex::new(()),
            cancel: CancelToken::new(),
        };

        let genesis = ledger.build_block(GENESIS_PREVIOUS_HASH.to_string())?;
        let genesis = seal(genesis, &ledger.cancel)?;
        info!("Created genesis block {} for node {node_id}", genesis.get_hash());
        ledger.blockchain.append(genesis);

        Ok(ledger)
    }

    /// Create a ledger from configuration, registering the configured peers
    pub fn from_config(config: &Config) -> Result<Ledger> {
        let ledger = Ledger::new(&config.node_id)?;
        if !config.peers.is_empty() {
            ledger.register_peers(config.peers.as_slice())?;
        }
        Ok(ledger)
    }

    pub fn node_id(&self) -> &str {
        self.node_id.as_str()
    }

    pub fn blockchain(&self) -> &Blockchain {
        &self.blockchain
    }

    pub fn memory_pool(&self) -> &MemoryPool {
        &self.memory_pool
    }

    pub fn nodes(&self) -> &Nodes {
        &self.nodes
    }

    /// Token that aborts an in-flight proof-of-work search
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Stop any running or future mining on this ledger
    pub fn shutdown(&self) {
        info!("Shutting down ledger for node {}", self.node_id);
        self.cancel.cancel();
    }

    fn lock_chain_writer(&self) -> MutexGuard<'_, ()> {
        self.chain_writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Assemble the next block on top of `previous_hash`, moving every pending
    /// transaction into it. The block is left unsealed.
    pub fn build_block(&self, previous_hash: String) -> Result<UnsealedBlock> {
        let index = self.blockchain.len() as u64 + 1;
        let transactions = self.memory_pool.drain();
        UnsealedBlock::new(index, previous_hash, transactions)
    }

    /// Build, seal and append a block holding the current mempool.
    ///
    /// Mining requests are serialized. If sealing is cancelled, the drained
    /// transactions go back into the mempool.
    pub fn mine(&self) -> Result<Block> {
        let _writer = self.lock_chain_writer();

        let previous_hash = self.blockchain.tail()?.get_hash().to_string();
        let block = self.build_block(previous_hash)?;
        let transactions = block.get_transactions().to_vec();

        let sealed = match seal(block, &self.cancel) {
            Ok(sealed) => sealed,
            Err(e) => {
                self.memory_pool.merge(transactions);
                return Err(e);
            }
        };

        info!(
            "New block {} is mined with {} transactions: {}",
            sealed.get_index(),
            sealed.get_transactions().len(),
            sealed.get_hash()
        );
        Ok(self.blockchain.append(sealed))
    }

    /// Queue a transaction; returns the index of the block expected to hold it
    pub fn submit(&self, sender: &str, receiver: &str, amount: f64) -> Result<u64> {
        let transaction = Transaction::new(sender, receiver, amount)?;
        let index = self.blockchain.tail()?.get_index() + 1;
        self.memory_pool.add(transaction);
        Ok(index)
    }

    /// Queue a transaction from a client request, rejecting missing fields
    pub fn submit_transaction(&self, request: TransactionRequest) -> Result<u64> {
        let (sender, receiver, amount) = request.into_parts()?;
        self.submit(&sender, &receiver, amount)
    }

    pub fn get_chain(&self) -> ChainResponse {
        let chain = self.blockchain.snapshot();
        ChainResponse {
            length: chain.len(),
            chain,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.blockchain.with_blocks(is_chain_valid)
    }

    pub fn get_mempool(&self) -> Vec<Transaction> {
        self.memory_pool.get_all()
    }

    /// Add peers and return the full registry. Nothing is added if any
    /// address is malformed.
    pub fn register_peers<S: AsRef<str>>(&self, addresses: &[S]) -> Result<BTreeSet<String>> {
        let canonical = addresses
            .iter()
            .map(|addr| crate::network::canonical_address(addr.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        for addr in canonical {
            if self.nodes.add_node(&addr)? {
                info!("Registered peer {addr}");
            }
        }
        Ok(self.nodes.get_nodes())
    }

    /// Adopt the longest strictly-longer chain reported by a peer
    pub fn sync_chain(&self, client: &dyn PeerClient) -> ChainSync {
        let _writer = self.lock_chain_writer();
        sync::sync_chain(&self.blockchain, &self.nodes.get_nodes(), client)
    }

    /// Merge the first non-empty peer mempool and prune mined transactions
    pub fn sync_mempool(&self, client: &dyn PeerClient) -> MempoolSync {
        sync::sync_mempool(
            &self.memory_pool,
            &self.blockchain,
            &self.nodes.get_nodes(),
            client,
        )
    }
}
