use crate::error::{BlockchainError, Result};
use crate::ledger::Ledger;
use crate::network::message::{MempoolResponse, NodeStatus, Package, Reply};
use crate::network::peer::PeerClient;
use log::{debug, error, info};
use serde_json::Deserializer;
use std::io::{BufReader, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const TCP_READ_TIMEOUT: u64 = 60;

/// Serves one ledger over TCP.
///
/// Each connection carries one [`Package`] and gets one [`Reply`]. Every
/// connection runs on its own thread, so a long proof-of-work search does
/// not block chain or mempool reads; mining itself is serialized inside the
/// ledger.
#[derive(Clone)]
pub struct Server {
    ledger: Arc<Ledger>,
    peer_client: Arc<dyn PeerClient>,
}

impl Server {
    pub fn new(ledger: Arc<Ledger>, peer_client: Arc<dyn PeerClient>) -> Self {
        Self {
            ledger,
            peer_client,
        }
    }

    /// Bind `addr` and serve until the listener fails
    pub fn run(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr)
            .map_err(|e| BlockchainError::Network(format!("Failed to bind to {addr}: {e}")))?;
        self.serve(listener)
    }

    /// Serve connections from an already bound listener
    pub fn serve(&self, listener: TcpListener) -> Result<()> {
        let local_addr = listener.local_addr()?;
        info!(
            "Node {} listening on {local_addr}",
            self.ledger.node_id()
        );

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer_addr = match stream.peer_addr() {
                        Ok(addr) => addr,
                        Err(e) => {
                            error!("Failed to get peer address: {e}");
                            continue;
                        }
                    };

                    let server = self.clone();
                    thread::spawn(move || {
                        if let Err(e) = server.handle_connection(stream, peer_addr) {
                            error!("Error handling connection from {peer_addr}: {e}");
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {e}");
                }
            }
        }

        Ok(())
    }

    fn handle_connection(&self, stream: TcpStream, peer_addr: SocketAddr) -> Result<()> {
        stream
            .set_read_timeout(Some(Duration::from_secs(TCP_READ_TIMEOUT)))
            .map_err(|e| BlockchainError::Network(format!("Failed to set read timeout: {e}")))?;

        let reader = BufReader::new(&stream);
        let pkg = Deserializer::from_reader(reader).into_iter::<Package>().next();

        let reply = match pkg {
            Some(Ok(pkg)) => {
                debug!("Received request from {peer_addr}: {pkg:?}");
                self.process_message(pkg)
            }
            Some(Err(e)) => Reply::Error {
                message: format!("Failed to deserialize package: {e}"),
            },
            None => return Ok(()),
        };

        let mut writer = &stream;
        serde_json::to_writer(writer, &reply)?;
        writer.flush()?;
        let _ = stream.shutdown(Shutdown::Both);
        Ok(())
    }

    /// Block until `signals` yields a termination signal, then cancel any
    /// mining on the served ledger. Returns the signal, or `None` if the
    /// source ended first.
    pub fn stop_on_signal(&self, signals: impl IntoIterator<Item = i32>) -> Option<i32> {
        let signal = signals.into_iter().next()?;
        info!(
            "Received termination signal {signal}, stopping node {}",
            self.ledger.node_id()
        );
        self.ledger.shutdown();
        Some(signal)
    }

    /// Answer one request against the ledger
    pub fn process_message(&self, pkg: Package) -> Reply {
        match self.dispatch(pkg) {
            Ok(reply) => reply,
            Err(e) => {
                if !matches!(e, BlockchainError::MalformedInput(_)) {
                    error!("Request failed: {e}");
                }
                Reply::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    fn dispatch(&self, pkg: Package) -> Result<Reply> {
        let ledger = &self.ledger;
        let reply = match pkg {
            Package::GetChain => Reply::Chain(ledger.get_chain()),
            Package::GetMempool => Reply::Mempool(MempoolResponse {
                transactions: ledger.get_mempool(),
            }),
            Package::Mine => {
                let block = ledger.mine()?;
                Reply::Mined {
                    message: "Congratulations, you just mined a block!".to_string(),
                    block,
                }
            }
            Package::AddTransaction { transaction } => {
                let index = ledger.submit_transaction(transaction)?;
                Reply::TransactionAdded {
                    message: format!("This transaction will be added to Block {index}"),
                    index,
                }
            }
            Package::ConnectNodes { nodes } => {
                let nodes =
                    nodes.ok_or_else(|| BlockchainError::MalformedInput("No node".to_string()))?;
                let total_nodes = ledger.register_peers(nodes.as_slice())?;
                Reply::Connected {
                    message: "All the nodes are now connected. The ledger now contains the following nodes:"
                        .to_string(),
                    total_nodes,
                }
            }
            Package::SyncChain => {
                let sync = ledger.sync_chain(self.peer_client.as_ref());
                let message = if sync.replaced {
                    "The nodes had different chains so the chain was replaced by the longest one."
                } else {
                    "All good. The chain is the largest one."
                };
                Reply::ChainSynced {
                    message: message.to_string(),
                    sync,
                }
            }
            Package::SyncMempool => {
                let sync = ledger.sync_mempool(self.peer_client.as_ref());
                let message = if sync.updated {
                    "Mempool was updated"
                } else {
                    "Mempool was not updated"
                };
                Reply::MempoolSynced {
                    message: message.to_string(),
                    sync,
                }
            }
            Package::IsValid => {
                let valid = ledger.is_valid();
                let message = if valid {
                    "All good. The Blockchain is valid."
                } else {
                    "The Blockchain is not valid."
                };
                Reply::Validity {
                    message: message.to_string(),
                    valid,
                }
            }
            Package::Status => Reply::Status(NodeStatus {
                node_id: ledger.node_id().to_string(),
                length: ledger.blockchain().len(),
                pending: ledger.memory_pool().len(),
                peers: ledger.nodes().get_nodes(),
            }),
        };
        Ok(reply)
    }
}
