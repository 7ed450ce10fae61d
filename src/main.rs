// Entry point for the hadcoin node and its client commands.
// `startnode` runs a node; every other command sends one request to a running node.
use clap::Parser;
use hadcoin::{
    Command, Config, Ledger, Opt, Package, Reply, Server, TcpPeerClient, TransactionRequest,
};
use log::{error, info, LevelFilter};
#[cfg(not(windows))]
use signal_hook::{consts::TERM_SIGNALS, iterator::Signals};
use std::process;
use std::sync::Arc;
#[cfg(not(windows))]
use std::thread;
use std::time::Duration;

// Mining has no time bound, so client requests wait much longer than peer calls
const CLIENT_TIMEOUT_SECS: u64 = 600;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(opt: Opt) -> Result<(), Box<dyn std::error::Error>> {
    let pkg = match opt.command {
        Command::StartNode { config } => {
            let config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::new(),
            };
            info!(
                "Starting node {} on {} with {} configured peers",
                config.node_id,
                config.node_addr,
                config.peers.len()
            );

            let ledger = Arc::new(Ledger::from_config(&config)?);
            let server = Server::new(ledger, Arc::new(TcpPeerClient::default()));
            watch_term_signals(&server)?;
            server.run(&config.node_addr)?;
            return Ok(());
        }
        Command::Mine => Package::Mine,
        Command::Send {
            sender,
            receiver,
            amount,
        } => Package::AddTransaction {
            transaction: TransactionRequest::new(&sender, &receiver, amount),
        },
        Command::Printchain => Package::GetChain,
        Command::Mempool => Package::GetMempool,
        Command::IsValid => Package::IsValid,
        Command::Connect { peers } => Package::ConnectNodes { nodes: Some(peers) },
        Command::SyncChain => Package::SyncChain,
        Command::SyncMempool => Package::SyncMempool,
        Command::Status => Package::Status,
    };

    let client = TcpPeerClient::new(Duration::from_secs(CLIENT_TIMEOUT_SECS));
    let reply = client.request(&opt.node, &pkg)?;
    println!("{}", serde_json::to_string_pretty(&reply)?);

    if let Reply::Error { message } = reply {
        return Err(message.into());
    }
    Ok(())
}

// A termination signal cancels in-flight mining before the process exits
#[cfg(not(windows))]
fn watch_term_signals(server: &Server) -> std::io::Result<()> {
    let mut signals = Signals::new(TERM_SIGNALS)?;
    let server = server.clone();
    thread::spawn(move || {
        if server.stop_on_signal(signals.forever()).is_some() {
            process::exit(0);
        }
    });
    Ok(())
}

#[cfg(windows)]
fn watch_term_signals(_server: &Server) -> std::io::Result<()> {
    Ok(())
}
