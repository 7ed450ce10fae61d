//! Node-to-node and client-to-node communication
//!
//! This module holds the peer registry, the request/reply types, the peer
//! clients used during synchronization, the synchronization protocols
//! themselves and the TCP server that exposes a ledger.

pub mod message;
pub mod node;
pub mod peer;
pub mod server;
pub mod sync;

pub use message::{
    ChainResponse, ChainSync, MempoolResponse, MempoolSync, NodeStatus, Package, Reply,
};
pub use node::{canonical_address, Nodes};
pub use peer::{LocalPeerClient, PeerClient, TcpPeerClient};
pub use server::Server;
