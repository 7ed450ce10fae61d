//! Request and reply types exchanged with a node.
//!
//! One JSON-encoded [`Package`] goes in, one JSON-encoded [`Reply`] comes
//! out, then the connection closes. `GetChain` and `GetMempool` are the two
//! requests nodes make of each other; the rest are issued by clients.

use crate::core::{Block, Transaction, TransactionRequest};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Package {
    GetChain,
    GetMempool,
    Mine,
    AddTransaction { transaction: TransactionRequest },
    ConnectNodes { nodes: Option<Vec<String>> },
    SyncChain,
    SyncMempool,
    IsValid,
    Status,
}

/// A node's full chain and its length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolResponse {
    pub transactions: Vec<Transaction>,
}

/// Outcome of longest-chain adoption
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSync {
    pub replaced: bool,
    pub chain: Vec<Block>,
}

/// Outcome of a mempool merge from peers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MempoolSync {
    pub updated: bool,
    pub duplicates_pruned: bool,
    pub mempool: Vec<Transaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub node_id: String,
    pub length: usize,
    pub pending: usize,
    pub peers: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    Chain(ChainResponse),
    Mempool(MempoolResponse),
    Mined { message: String, block: Block },
    TransactionAdded { message: String, index: u64 },
    Connected { message: String, total_nodes: BTreeSet<String> },
    ChainSynced { message: String, sync: ChainSync },
    MempoolSynced { message: String, sync: MempoolSync },
    Validity { message: String, valid: bool },
    Status(NodeStatus),
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_serialization() {
        let pkg = Package::AddTransaction {
            transaction: TransactionRequest::new("A", "B", 10.0),
        };

        let serialized = serde_json::to_string(&pkg).unwrap();
        let deserialized: Package = serde_json::from_str(&serialized).unwrap();
        assert!(matches!(deserialized, Package::AddTransaction { .. }));
    }

    #[test]
    fn test_unit_package_wire_form() {
        assert_eq!(serde_json::to_string(&Package::GetChain).unwrap(), "\"GetChain\"");
        let pkg: Package = serde_json::from_str("\"GetMempool\"").unwrap();
        assert!(matches!(pkg, Package::GetMempool));
    }

    #[test]
    fn test_connect_without_nodes_field() {
        let pkg: Package = serde_json::from_str(r#"{"ConnectNodes":{}}"#).unwrap();
        assert!(matches!(pkg, Package::ConnectNodes { nodes: None }));
    }
}
