use crate::error::{BlockchainError, Result};
use crate::ledger::Ledger;
use crate::network::message::{ChainResponse, MempoolResponse, Package, Reply};
use log::debug;
use std::collections::HashMap;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

const TCP_TIMEOUT: u64 = 5000;

/// What a node asks of its peers during synchronization.
///
/// Any failure is reported as [`BlockchainError::PeerUnreachable`] or
/// [`BlockchainError::PeerBadResponse`]; callers skip that peer and move on.
pub trait PeerClient: Send + Sync {
    fn fetch_chain(&self, peer: &str) -> Result<ChainResponse>;
    fn fetch_mempool(&self, peer: &str) -> Result<MempoolResponse>;
}

/// Talks to peers over TCP with JSON packages
#[derive(Debug, Clone)]
pub struct TcpPeerClient {
    timeout: Duration,
}

impl Default for TcpPeerClient {
    fn default() -> Self {
        Self::new(Duration::from_millis(TCP_TIMEOUT))
    }
}

impl TcpPeerClient {
    pub fn new(timeout: Duration) -> TcpPeerClient {
        TcpPeerClient { timeout }
    }

    fn resolve(peer: &str) -> Result<SocketAddr> {
        peer.to_socket_addrs()
            .map_err(|e| BlockchainError::PeerUnreachable {
                peer: peer.to_string(),
                reason: format!("cannot resolve address: {e}"),
            })?
            .next()
            .ok_or_else(|| BlockchainError::PeerUnreachable {
                peer: peer.to_string(),
                reason: "address resolved to nothing".to_string(),
            })
    }

    /// Send one package and wait for the reply
    pub fn request(&self, peer: &str, pkg: &Package) -> Result<Reply> {
        let unreachable = |reason: String| BlockchainError::PeerUnreachable {
            peer: peer.to_string(),
            reason,
        };
        let addr = Self::resolve(peer)?;
        debug!("Sending package to {addr}: {pkg:?}");

        let mut stream = TcpStream::connect_timeout(&addr, self.timeout)
            .map_err(|e| unreachable(format!("failed to connect: {e}")))?;
        stream
            .set_write_timeout(Some(self.timeout))
            .map_err(|e| unreachable(format!("failed to set write timeout: {e}")))?;
        stream
            .set_read_timeout(Some(self.timeout))
            .map_err(|e| unreachable(format!("failed to set read timeout: {e}")))?;

        serde_json::to_writer(&stream, pkg)
            .map_err(|e| unreachable(format!("failed to send package: {e}")))?;
        let _ = stream.flush();
        let _ = stream.shutdown(Shutdown::Write);

        serde_json::from_reader(BufReader::new(&stream)).map_err(|e| {
            BlockchainError::PeerBadResponse {
                peer: peer.to_string(),
                reason: format!("failed to read reply: {e}"),
            }
        })
    }
}

fn unexpected(peer: &str, reply: Reply) -> BlockchainError {
    let reason = match reply {
        Reply::Error { message } => message,
        other => format!("unexpected reply: {other:?}"),
    };
    BlockchainError::PeerBadResponse {
        peer: peer.to_string(),
        reason,
    }
}

impl PeerClient for TcpPeerClient {
    fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        match self.request(peer, &Package::GetChain)? {
            Reply::Chain(response) => Ok(response),
            other => Err(unexpected(peer, other)),
        }
    }

    fn fetch_mempool(&self, peer: &str) -> Result<MempoolResponse> {
        match self.request(peer, &Package::GetMempool)? {
            Reply::Mempool(response) => Ok(response),
            other => Err(unexpected(peer, other)),
        }
    }
}

/// In-process peers keyed by address, for tests and single-process simulations.
///
/// Addresses with no registered ledger behave like unreachable peers.
#[derive(Default)]
pub struct LocalPeerClient {
    peers: RwLock<HashMap<String, Arc<Ledger>>>,
}

impl LocalPeerClient {
    pub fn new() -> LocalPeerClient {
        LocalPeerClient::default()
    }

    pub fn connect(&self, address: &str, ledger: Arc<Ledger>) {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string(), ledger);
    }

    pub fn disconnect(&self, address: &str) {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(address);
    }

    fn peer(&self, address: &str) -> Result<Arc<Ledger>> {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
            .ok_or_else(|| BlockchainError::PeerUnreachable {
                peer: address.to_string(),
                reason: "no such local peer".to_string(),
            })
    }
}

impl PeerClient for LocalPeerClient {
    fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        Ok(self.peer(peer)?.get_chain())
    }

    fn fetch_mempool(&self, peer: &str) -> Result<MempoolResponse> {
        Ok(MempoolResponse {
            transactions: self.peer(peer)?.get_mempool(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_client_unknown_peer_is_unreachable() {
        let client = LocalPeerClient::new();
        let err = client.fetch_chain("127.0.0.1:9").unwrap_err();
        assert!(matches!(err, BlockchainError::PeerUnreachable { .. }));
    }

    #[test]
    fn test_local_client_serves_ledger() {
        let client = LocalPeerClient::new();
        let ledger = Arc::new(Ledger::new("peer").unwrap());
        ledger.submit("A", "B", 1.0).unwrap();
        client.connect("127.0.0.1:5001", Arc::clone(&ledger));

        assert_eq!(client.fetch_chain("127.0.0.1:5001").unwrap().length, 1);
        assert_eq!(
            client.fetch_mempool("127.0.0.1:5001").unwrap().transactions,
            ledger.get_mempool()
        );

        client.disconnect("127.0.0.1:5001");
        assert!(client.fetch_mempool("127.0.0.1:5001").is_err());
    }

    #[test]
    fn test_tcp_client_unreachable_peer() {
        // Bind then drop a listener so the port is very likely closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = TcpPeerClient::new(Duration::from_millis(500));
        let err = client.fetch_chain(&format!("127.0.0.1:{port}")).unwrap_err();
        assert!(err.is_peer_error());
    }

    #[test]
    fn test_error_reply_is_bad_response() {
        let err = unexpected(
            "peer",
            Reply::Error {
                message: "boom".to_string(),
            },
        );
        match err {
            BlockchainError::PeerBadResponse { reason, .. } => assert_eq!(reason, "boom"),
            other => panic!("unexpected error {other:?}"),
        }
    }
}
