use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hadcoin")]
pub struct Opt {
    #[arg(
        long = "node",
        global = true,
        default_value = "127.0.0.1:5000",
        help = "Address of the node to talk to"
    )]
    pub node: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(long = "config", help = "Path to a TOML configuration file")]
        config: Option<PathBuf>,
    },
    #[command(name = "mine", about = "Mine a block on the node")]
    Mine,
    #[command(name = "send", about = "Submit a transaction to the node's mempool")]
    Send {
        #[arg(help = "Sender identifier")]
        sender: String,
        #[arg(help = "Receiver identifier")]
        receiver: String,
        #[arg(help = "Amount to transfer", allow_negative_numbers = true)]
        amount: f64,
    },
    #[command(name = "printchain", about = "Print the node's chain")]
    Printchain,
    #[command(name = "mempool", about = "Print the node's pending transactions")]
    Mempool,
    #[command(name = "isvalid", about = "Check the node's chain")]
    IsValid,
    #[command(name = "connect", about = "Register peers with the node")]
    Connect {
        #[arg(required = true, help = "Peer addresses, e.g. http://127.0.0.1:5001")]
        peers: Vec<String>,
    },
    #[command(name = "syncchain", about = "Adopt the longest chain among the node's peers")]
    SyncChain,
    #[command(name = "syncmempool", about = "Merge pending transactions from the node's peers")]
    SyncMempool,
    #[command(name = "status", about = "Show the node's identity and sizes")]
    Status,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let opt = Opt::parse_from(["hadcoin", "send", "A", "B", "10"]);
        assert_eq!(opt.node, "127.0.0.1:5000");
        match opt.command {
            Command::Send {
                sender,
                receiver,
                amount,
            } => {
                assert_eq!(sender, "A");
                assert_eq!(receiver, "B");
                assert_eq!(amount, 10.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_connect_with_node() {
        let opt = Opt::parse_from([
            "hadcoin",
            "--node",
            "127.0.0.1:5001",
            "connect",
            "http://127.0.0.1:5002",
            "http://127.0.0.1:5003",
        ]);
        assert_eq!(opt.node, "127.0.0.1:5001");
        assert!(matches!(opt.command, Command::Connect { ref peers } if peers.len() == 2));
    }

    #[test]
    fn test_connect_requires_peers() {
        assert!(Opt::try_parse_from(["hadcoin", "connect"]).is_err());
    }
}
