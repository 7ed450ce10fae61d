//! Ledger integration tests
//!
//! End-to-end behaviour of mining, validation and peer reconciliation,
//! both in-process and over real TCP connections.

use hadcoin::{
    is_chain_valid, Ledger, LocalPeerClient, Package, Reply, Server, TcpPeerClient, Transaction,
    TransactionRequest,
};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn mine_blocks(ledger: &Ledger, count: usize) {
    for _ in 0..count {
        ledger.mine().unwrap();
    }
}

fn start_server(ledger: Arc<Ledger>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let server = Server::new(ledger, Arc::new(TcpPeerClient::default()));
    thread::spawn(move || server.serve(listener));
    addr
}

#[test]
fn test_repeated_mining_produces_valid_chain() {
    let ledger = Ledger::new("node").unwrap();
    for i in 0..3 {
        ledger.submit("A", "B", i as f64).unwrap();
        ledger.mine().unwrap();
    }

    let chain = ledger.get_chain();
    assert_eq!(chain.length, 4);
    assert!(is_chain_valid(&chain.chain));
    assert!(ledger.is_valid());
    for (position, block) in chain.chain.iter().enumerate() {
        assert_eq!(block.get_index(), position as u64 + 1);
        assert!(block.get_hash().starts_with("0000"));
    }
}

#[test]
fn test_submit_then_mine_end_to_end() {
    let ledger = Ledger::new("node").unwrap();

    let index = ledger
        .submit_transaction(TransactionRequest::new("A", "B", 10.0))
        .unwrap();
    assert_eq!(index, 2);
    let submitted: Vec<Transaction> = ledger.get_mempool();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].get_sender(), "A");
    assert_eq!(submitted[0].get_receiver(), "B");
    assert_eq!(submitted[0].get_amount(), 10.0);

    let mined = ledger.mine().unwrap();
    assert!(ledger.get_mempool().is_empty());

    let chain = ledger.get_chain();
    assert_eq!(chain.length, 2);
    assert_eq!(chain.chain[1], mined);
    assert_eq!(chain.chain[1].get_transactions(), submitted.as_slice());
    assert_eq!(
        chain.chain[1].get_previous_hash(),
        chain.chain[0].get_hash()
    );
    assert!(ledger.is_valid());
}

#[test]
fn test_longer_peer_chain_is_adopted_verbatim() {
    let x = Arc::new(Ledger::new("x").unwrap());
    let y = Arc::new(Ledger::new("y").unwrap());
    mine_blocks(&x, 3);
    mine_blocks(&y, 1);

    let client = LocalPeerClient::new();
    client.connect("127.0.0.1:5001", Arc::clone(&x));
    y.register_peers(&["http://127.0.0.1:5001"]).unwrap();

    let result = y.sync_chain(&client);
    assert!(result.replaced);
    assert_eq!(result.chain, x.get_chain().chain);
    assert_eq!(y.get_chain(), x.get_chain());

    // Nothing changed on the peer, so a second sync keeps the local chain
    let again = y.sync_chain(&client);
    assert!(!again.replaced);
    assert_eq!(again.chain, x.get_chain().chain);
}

#[test]
fn test_adoption_does_not_revalidate() {
    let x = Arc::new(Ledger::new("x").unwrap());
    let y = Arc::new(Ledger::new("y").unwrap());
    mine_blocks(&x, 2);

    // Corrupt the peer's chain: break linkage on its tail
    let mut chain = x.get_chain().chain;
    let mut tail = serde_json::to_value(chain.last().unwrap()).unwrap();
    tail["previous_hash"] = "not-a-real-hash".into();
    *chain.last_mut().unwrap() = serde_json::from_value(tail).unwrap();
    x.blockchain().replace(chain.clone());
    assert!(!x.is_valid());

    let client = LocalPeerClient::new();
    client.connect("127.0.0.1:5001", Arc::clone(&x));
    y.register_peers(&["127.0.0.1:5001"]).unwrap();

    assert!(y.sync_chain(&client).replaced);
    assert_eq!(y.get_chain().chain, chain);
    assert!(!y.is_valid());
}

#[test]
fn test_unreachable_peer_does_not_abort_sync() {
    let x = Arc::new(Ledger::new("x").unwrap());
    let y = Arc::new(Ledger::new("y").unwrap());
    mine_blocks(&x, 1);

    let client = LocalPeerClient::new();
    client.connect("127.0.0.1:5002", Arc::clone(&x));
    y.register_peers(&["127.0.0.1:5001", "127.0.0.1:5002"])
        .unwrap();

    assert!(y.sync_chain(&client).replaced);
    assert_eq!(y.get_chain().length, 2);
}

#[test]
fn test_mempool_sync_merges_then_prunes_mined() {
    let x = Arc::new(Ledger::new("x").unwrap());
    let y = Arc::new(Ledger::new("y").unwrap());

    x.submit("A", "B", 1.0).unwrap();
    x.submit("C", "D", 2.0).unwrap();
    let peer_pending = x.get_mempool();

    let client = LocalPeerClient::new();
    client.connect("127.0.0.1:5001", Arc::clone(&x));
    y.register_peers(&["127.0.0.1:5001"]).unwrap();

    let result = y.sync_mempool(&client);
    assert!(result.updated);
    assert!(!result.duplicates_pruned);
    assert_eq!(result.mempool, peer_pending);

    // Y mines them, picks them up again from X, and prunes them
    y.mine().unwrap();
    let result = y.sync_mempool(&client);
    assert!(result.updated);
    assert!(result.duplicates_pruned);
    assert!(result.mempool.is_empty());
}

#[test]
fn test_two_nodes_over_tcp() {
    let x = Arc::new(Ledger::new("x").unwrap());
    let y = Arc::new(Ledger::new("y").unwrap());
    let x_addr = start_server(Arc::clone(&x));
    let y_addr = start_server(Arc::clone(&y));
    let client = TcpPeerClient::new(Duration::from_secs(120));

    let reply = client
        .request(
            &x_addr,
            &Package::AddTransaction {
                transaction: TransactionRequest::new("A", "B", 10.0),
            },
        )
        .unwrap();
    assert!(matches!(reply, Reply::TransactionAdded { index: 2, .. }));
    for _ in 0..2 {
        let reply = client.request(&x_addr, &Package::Mine).unwrap();
        assert!(matches!(reply, Reply::Mined { .. }));
    }

    let reply = client
        .request(
            &y_addr,
            &Package::ConnectNodes {
                nodes: Some(vec![format!("http://{x_addr}")]),
            },
        )
        .unwrap();
    match reply {
        Reply::Connected { total_nodes, .. } => assert!(total_nodes.contains(&x_addr)),
        other => panic!("unexpected reply {other:?}"),
    }

    match client.request(&y_addr, &Package::SyncChain).unwrap() {
        Reply::ChainSynced { sync, .. } => {
            assert!(sync.replaced);
            assert_eq!(sync.chain.len(), 3);
        }
        other => panic!("unexpected reply {other:?}"),
    }
    assert_eq!(y.get_chain(), x.get_chain());

    match client.request(&y_addr, &Package::IsValid).unwrap() {
        Reply::Validity { valid, .. } => assert!(valid),
        other => panic!("unexpected reply {other:?}"),
    }

    let reply = client
        .request(
            &y_addr,
            &Package::AddTransaction {
                transaction: TransactionRequest {
                    sender: Some("A".to_string()),
                    receiver: None,
                    amount: None,
                },
            },
        )
        .unwrap();
    assert!(matches!(reply, Reply::Error { .. }));
    assert!(y.get_mempool().is_empty());
}

#[test]
fn test_concurrent_mining_keeps_chain_linked() {
    let ledger = Arc::new(Ledger::new("node").unwrap());

    let miners: Vec<_> = (0..4)
        .map(|i| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                ledger.submit(&format!("miner-{i}"), "B", 1.0).unwrap();
                ledger.mine().unwrap()
            })
        })
        .collect();
    for miner in miners {
        miner.join().unwrap();
    }

    let chain = ledger.get_chain().chain;
    assert_eq!(chain.len(), 5);
    for (position, block) in chain.iter().enumerate() {
        assert_eq!(block.get_index(), position as u64 + 1);
    }
    for pair in chain.windows(2) {
        assert_eq!(pair[1].get_previous_hash(), pair[0].get_hash());
    }
    assert!(ledger.is_valid());
}

#[test]
fn test_submissions_during_mining_are_not_lost() {
    const SUBMISSIONS: usize = 200;
    let ledger = Arc::new(Ledger::new("node").unwrap());

    let submitter = {
        let ledger = Arc::clone(&ledger);
        thread::spawn(move || {
            for i in 0..SUBMISSIONS {
                ledger.submit(&format!("sender-{i}"), "B", i as f64).unwrap();
            }
        })
    };
    for _ in 0..3 {
        ledger.mine().unwrap();
    }
    submitter.join().unwrap();

    let mut seen: Vec<String> = ledger
        .get_chain()
        .chain
        .iter()
        .flat_map(|block| block.get_transactions().iter())
        .chain(ledger.get_mempool().iter())
        .map(|tx| tx.get_sender().to_string())
        .collect();
    seen.sort();

    let mut expected: Vec<String> = (0..SUBMISSIONS).map(|i| format!("sender-{i}")).collect();
    expected.sort();
    assert_eq!(seen, expected);
    assert!(ledger.is_valid());
}
