use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::sync::mpsc::{channel, Sender};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use rand::{thread_rng, Rng};
use secp256k1::Secp256k1;

use bitcoin_types::{Block, BlockHeader, ChannelPoint, Transaction, TxIn, TxOut};
use chainntfs::{BlockEpoch, BlockEpochEvent, CancelHandle, ChainError, ChainIO, ChainNotifier};
use common_types::{Hash256, PublicKey, SecretKey};
use wire::{
    AnnouncementChannel, AnnouncementChannelData, ChannelUpdateFlags, Color,
    MilliSatoshi, NodeAlias, RawFeatureVector, Satoshi, ShortChannelId,
};

use crate::error::RoutingError;
use crate::graph::MemoryGraph;
use crate::router::{ChannelRouter, RouterConfig};
use crate::topology::{ChannelAuthProof, ChannelInfo, ChannelPolicy, LightningNode};

const CHAN_VALUE: u64 = 10_000;
const RESERVE: u64 = 5_000;

struct MockChainState {
    blocks: HashMap<Hash256, Block>,
    block_index: HashMap<u32, Hash256>,
    utxos: HashMap<ChannelPoint, TxOut>,
    best_height: u32,
}

struct MockChain {
    state: Mutex<MockChainState>,
}

impl MockChain {
    fn new(best_height: u32) -> Arc<Self> {
        Arc::new(MockChain {
            state: Mutex::new(MockChainState {
                blocks: HashMap::new(),
                block_index: HashMap::new(),
                utxos: HashMap::new(),
                best_height: best_height,
            }),
        })
    }

    fn add_utxo(&self, outpoint: ChannelPoint, output: TxOut) {
        self.state.lock().unwrap().utxos.insert(outpoint, output);
    }

    fn add_block(&self, block: Block, height: u32) -> Hash256 {
        let mut block = block;
        block.header.nonce = height;
        let hash = block.block_hash().unwrap();

        let mut state = self.state.lock().unwrap();
        state.block_index.insert(height, hash);
        state.blocks.insert(hash, block);
        hash
    }
}

impl ChainIO for MockChain {
    fn best_block(&self) -> Result<(Hash256, u32), ChainError> {
        let state = self.state.lock().unwrap();
        let hash = state
            .block_index
            .get(&state.best_height)
            .cloned()
            .unwrap_or_default();
        Ok((hash, state.best_height))
    }

    fn block_hash(&self, height: u32) -> Result<Hash256, ChainError> {
        self.state
            .lock()
            .unwrap()
            .block_index
            .get(&height)
            .cloned()
            .ok_or(ChainError::NotFound)
    }

    fn block_by_hash(&self, hash: &Hash256) -> Result<Block, ChainError> {
        self.state
            .lock()
            .unwrap()
            .blocks
            .get(hash)
            .cloned()
            .ok_or(ChainError::NotFound)
    }

    fn utxo(&self, outpoint: &ChannelPoint) -> Result<TxOut, ChainError> {
        self.state
            .lock()
            .unwrap()
            .utxos
            .get(outpoint)
            .cloned()
            .ok_or(ChainError::NotFound)
    }
}

struct MockNotifier {
    clients: Arc<Mutex<HashMap<u32, Sender<BlockEpoch>>>>,
    counter: Mutex<u32>,
}

impl MockNotifier {
    fn new() -> Self {
        MockNotifier {
            clients: Arc::new(Mutex::new(HashMap::new())),
            counter: Mutex::new(0),
        }
    }

    fn notify_block(&self, hash: Hash256, height: u32) {
        for sender in self.clients.lock().unwrap().values() {
            let _ = sender.send(BlockEpoch {
                hash: hash,
                height: height,
            });
        }
    }
}

impl ChainNotifier for MockNotifier {
    fn register_block_epoch_ntfn(&self) -> Result<BlockEpochEvent, ChainError> {
        let (sender, receiver) = channel();

        let mut counter = self.counter.lock().unwrap();
        let client_id = *counter;
        *counter += 1;
        self.clients.lock().unwrap().insert(client_id, sender);

        let clients = self.clients.clone();
        Ok(BlockEpochEvent::new(
            receiver,
            CancelHandle::new(move || {
                clients.lock().unwrap().remove(&client_id);
            }),
        ))
    }
}

struct TestCtx {
    router: ChannelRouter<MemoryGraph, Arc<MockChain>>,
    chain: Arc<MockChain>,
    notifier: MockNotifier,
}

fn create_test_ctx(starting_height: u32) -> TestCtx {
    let chain = MockChain::new(starting_height);
    let notifier = MockNotifier::new();
    let router = ChannelRouter::new(RouterConfig::default(), MemoryGraph::new(), chain.clone());
    router.start(notifier.register_block_epoch_ntfn().unwrap());
    TestCtx {
        router: router,
        chain: chain,
        notifier: notifier,
    }
}

fn rand_timestamp() -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(thread_rng().gen_range(1_000_000i64..500_000_000i64), 0)
        .unwrap()
}

fn create_test_node_with_key() -> (LightningNode, SecretKey) {
    let mut rng = thread_rng();
    let secret: SecretKey = rng.gen();
    let node = LightningNode {
        identity_key: PublicKey::paired(&secret),
        last_update: rand_timestamp(),
        addresses: vec![SocketAddr::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)), 9000)],
        alias: NodeAlias::try_from_string(&format!("kek-{:08x}", rng.gen::<u32>())).unwrap(),
        color: Color::from([1, 2, 3]),
        features: RawFeatureVector::new(),
        auth_signature: rng.gen(),
    };
    (node, secret)
}

fn create_test_node() -> LightningNode {
    create_test_node_with_key().0
}

fn rand_edge_policy(
    short_channel_id: ShortChannelId,
    flags: ChannelUpdateFlags,
) -> ChannelPolicy {
    let mut rng = thread_rng();
    ChannelPolicy {
        short_channel_id: short_channel_id,
        last_update: rand_timestamp(),
        flags: flags,
        time_lock_delta: rng.gen(),
        htlc_minimum: MilliSatoshi::from(rng.gen_range(0u64..100_000)),
        base_fee: rng.gen_range(0u32..1_000_000),
        fee_rate: rng.gen_range(0u32..1_000_000),
        signature: rng.gen(),
    }
}

fn funding_script(key1: &PublicKey, key2: &PublicKey) -> Vec<u8> {
    // stand-in for the 2-of-2 witness script of the funding output
    let mut script = Vec::with_capacity(66);
    script.extend_from_slice(&key1.serialize()[..]);
    script.extend_from_slice(&key2.serialize()[..]);
    script
}

/// Build the funding transaction, register its output as unspent and
/// derive the channel id of a channel confirmed at `funding_height`.
fn create_channel_edge(
    ctx: &TestCtx,
    bitcoin_key1: &PublicKey,
    bitcoin_key2: &PublicKey,
    chan_value: u64,
    funding_height: u32,
) -> (Transaction, ChannelPoint, ShortChannelId) {
    let funding_tx = Transaction {
        version: 2,
        inputs: Vec::new(),
        outputs: vec![TxOut {
            value: chan_value,
            pk_script: funding_script(bitcoin_key1, bitcoin_key2),
        }],
        lock_time: 0,
    };

    let chan_utxo = ChannelPoint::new(funding_tx.txid().unwrap(), 0);
    ctx.chain.add_utxo(chan_utxo, funding_tx.outputs[0].clone());

    let chan_id = ShortChannelId::new(funding_height, 0, 0);
    (funding_tx, chan_utxo, chan_id)
}

/// A channel edge whose four announcement signatures actually verify.
fn signed_edge(
    short_channel_id: ShortChannelId,
    node_keys: (&SecretKey, &SecretKey),
    bitcoin_keys: (&SecretKey, &SecretKey),
) -> ChannelInfo {
    let context = Secp256k1::new();
    let node_id = (
        PublicKey::paired(node_keys.0),
        PublicKey::paired(node_keys.1),
    );
    let bitcoin_key = (
        PublicKey::paired(bitcoin_keys.0),
        PublicKey::paired(bitcoin_keys.1),
    );

    let announcement = AnnouncementChannel::sign(
        AnnouncementChannelData {
            short_channel_id: short_channel_id,
            node_id: node_id,
            bitcoin_key: bitcoin_key,
        },
        &context,
        node_keys,
        bitcoin_keys,
    ).unwrap();

    ChannelInfo {
        short_channel_id: short_channel_id,
        node_id: node_id,
        bitcoin_key: bitcoin_key,
        auth_proof: ChannelAuthProof {
            node_sig: announcement.node_sig,
            bitcoin_sig: announcement.bitcoin_sig,
        },
        channel_point: ChannelPoint::default(),
        capacity: Satoshi::from(0),
    }
}

struct FundedChannel {
    chan_point: ChannelPoint,
    chan_id: ShortChannelId,
    node1: LightningNode,
    node2: LightningNode,
}

/// Full setup of an announced, funded channel between two fresh nodes.
fn announce_funded_channel(ctx: &TestCtx, funding_height: u32) -> FundedChannel {
    let mut rng = thread_rng();
    let (node1, node_key1) = create_test_node_with_key();
    let (node2, node_key2) = create_test_node_with_key();
    let bitcoin_secret1: SecretKey = rng.gen();
    let bitcoin_secret2: SecretKey = rng.gen();
    let bitcoin_key1 = PublicKey::paired(&bitcoin_secret1);
    let bitcoin_key2 = PublicKey::paired(&bitcoin_secret2);

    let (funding_tx, chan_point, chan_id) =
        create_channel_edge(ctx, &bitcoin_key1, &bitcoin_key2, CHAN_VALUE, funding_height);
    ctx.chain.add_block(
        Block {
            header: BlockHeader::default(),
            transactions: vec![funding_tx],
        },
        chan_id.block_height,
    );

    ctx.router.add_node(node1.clone()).unwrap();
    ctx.router.add_node(node2.clone()).unwrap();

    let edge = signed_edge(
        chan_id,
        (&node_key1, &node_key2),
        (&bitcoin_secret1, &bitcoin_secret2),
    );
    ctx.router.add_edge(edge).unwrap();

    FundedChannel {
        chan_point: chan_point,
        chan_id: chan_id,
        node1: node1,
        node2: node2,
    }
}

#[test]
fn edge_update_notification() {
    let ctx = create_test_ctx(0);
    let channel = announce_funded_channel(&ctx, 0);

    // with the channel edge in place, subscribe for notifications
    let ntfn_client = ctx.router.subscribe_topology();

    let edge1 = rand_edge_policy(channel.chan_id, ChannelUpdateFlags::empty());
    let edge2 = rand_edge_policy(channel.chan_id, ChannelUpdateFlags::DIRECTION);

    ctx.router.update_edge(edge1.clone()).unwrap();
    ctx.router.update_edge(edge2.clone()).unwrap();

    for i in 0..2 {
        let ntfn = ntfn_client
            .topology_changes
            .recv_timeout(Duration::from_secs(5))
            .expect("update not received");
        assert_eq!(ntfn.channel_edge_updates.len(), 1);

        let edge_update = &ntfn.channel_edge_updates[0];
        let edge_ann = if i == 0 { &edge1 } else { &edge2 };
        assert_eq!(edge_update.short_channel_id, channel.chan_id);
        assert_eq!(edge_update.channel_point, channel.chan_point);
        assert_eq!(u64::from(edge_update.capacity), CHAN_VALUE - RESERVE);
        assert_eq!(edge_update.htlc_minimum, edge_ann.htlc_minimum);
        assert_eq!(edge_update.base_fee, edge_ann.base_fee);
        assert_eq!(edge_update.fee_rate, edge_ann.fee_rate);
        assert_eq!(edge_update.time_lock_delta, edge_ann.time_lock_delta);

        if i == 0 {
            assert_eq!(edge_update.advertising_node, channel.node1.identity_key);
            assert_eq!(edge_update.connecting_node, channel.node2.identity_key);
        } else {
            assert_eq!(edge_update.advertising_node, channel.node2.identity_key);
            assert_eq!(edge_update.connecting_node, channel.node1.identity_key);
        }
    }
}

#[test]
fn node_update_notification() {
    let ctx = create_test_ctx(1);
    let ntfn_client = ctx.router.subscribe_topology();

    let node1 = create_test_node();
    let node2 = create_test_node();

    ctx.router.add_node(node1.clone()).unwrap();
    ctx.router.add_node(node2.clone()).unwrap();

    let assert_node_ntfn_correct = |ann: &LightningNode| {
        let ntfn = ntfn_client
            .topology_changes
            .recv_timeout(Duration::from_secs(5))
            .expect("notification not received");

        // a single announcement per accepted batch
        assert_eq!(ntfn.node_updates.len(), 1);
        let node_ntfn = &ntfn.node_updates[0];
        assert_eq!(node_ntfn.addresses[0], ann.addresses[0]);
        assert_eq!(node_ntfn.identity_key, ann.identity_key);
        assert_eq!(node_ntfn.alias, ann.alias);
    };

    assert_node_ntfn_correct(&node1);
    assert_node_ntfn_correct(&node2);

    // an update with a strictly greater timestamp triggers a fresh one
    let mut node_update_ann = node1.clone();
    node_update_ann.last_update = node1.last_update + chrono::Duration::milliseconds(300);
    ctx.router.add_node(node_update_ann.clone()).unwrap();

    assert_node_ntfn_correct(&node_update_ann);
}

#[test]
fn stale_node_update_is_rejected() {
    let ctx = create_test_ctx(1);

    let node = create_test_node();
    ctx.router.add_node(node.clone()).unwrap();

    let ntfn_client = ctx.router.subscribe_topology();

    // the equal timestamp is a no-op as well
    let result = ctx.router.add_node(node.clone());
    assert!(matches!(result, Err(RoutingError::StaleUpdate)));

    let mut older = node.clone();
    older.last_update = node.last_update - chrono::Duration::seconds(10);
    let result = ctx.router.add_node(older);
    assert!(matches!(result, Err(RoutingError::StaleUpdate)));

    assert!(ntfn_client.topology_changes.try_recv().is_err());
    // the stored record still carries the original timestamp
    let stored = ctx.router.node(&node.identity_key).unwrap();
    assert_eq!(stored.last_update, node.last_update);
}

#[test]
fn notification_cancellation() {
    let ctx = create_test_ctx(101);
    let ntfn_client = ctx.router.subscribe_topology();

    let node = create_test_node();

    // cancelled before the announcement is processed, so the triggered
    // notification must not reach this client
    ntfn_client.cancel();
    ctx.router.add_node(node).unwrap();

    match ntfn_client.topology_changes.recv_timeout(Duration::from_secs(5)) {
        Ok(_) => panic!("notification sent but shouldn't have been"),
        // closed, not hanging
        Err(_) => (),
    }
}

#[test]
fn channel_close_notification() {
    let starting_height = 101;
    let ctx = create_test_ctx(starting_height);
    let channel = announce_funded_channel(&ctx, starting_height);

    let ntfn_client = ctx.router.subscribe_topology();

    // a block at the next height spends the funding output
    let block_height = starting_height + 1;
    let spending_block = Block {
        header: BlockHeader::default(),
        transactions: vec![Transaction {
            version: 1,
            inputs: vec![TxIn {
                previous_output: channel.chan_point,
                script_sig: Vec::new(),
                sequence: 0xffff_ffff,
            }],
            outputs: Vec::new(),
            lock_time: 0,
        }],
    };
    let block_hash = ctx.chain.add_block(spending_block, block_height);
    ctx.notifier.notify_block(block_hash, block_height);

    let ntfn = ntfn_client
        .topology_changes
        .recv_timeout(Duration::from_secs(5))
        .expect("notification not sent");

    // exactly one closure for the channel spent above
    assert_eq!(ntfn.closed_channels.len(), 1);
    let closed_chan = &ntfn.closed_channels[0];
    assert_eq!(closed_chan.short_channel_id, channel.chan_id);
    assert_eq!(u64::from(closed_chan.capacity), CHAN_VALUE - RESERVE);
    assert_eq!(closed_chan.closed_height, block_height);
    assert_eq!(closed_chan.channel_point, channel.chan_point);

    // the channel is gone from the graph and a replay of the block
    // yields nothing further
    assert!(ctx.router.channel(channel.chan_id).is_none());
    ctx.notifier.notify_block(block_hash, block_height);
    assert!(ntfn_client
        .topology_changes
        .recv_timeout(Duration::from_millis(300))
        .is_err());
}

#[test]
fn bad_signature_leaves_no_trace() {
    let ctx = create_test_ctx(0);
    let mut rng = thread_rng();

    let (_, node_key1) = create_test_node_with_key();
    let (_, node_key2) = create_test_node_with_key();
    let bitcoin_secret1: SecretKey = rng.gen();
    let bitcoin_secret2: SecretKey = rng.gen();
    let bitcoin_key1 = PublicKey::paired(&bitcoin_secret1);
    let bitcoin_key2 = PublicKey::paired(&bitcoin_secret2);

    let (funding_tx, _, chan_id) =
        create_channel_edge(&ctx, &bitcoin_key1, &bitcoin_key2, CHAN_VALUE, 0);
    ctx.chain.add_block(
        Block {
            header: BlockHeader::default(),
            transactions: vec![funding_tx],
        },
        chan_id.block_height,
    );

    let ntfn_client = ctx.router.subscribe_topology();

    let mut edge = signed_edge(
        chan_id,
        (&node_key1, &node_key2),
        (&bitcoin_secret1, &bitcoin_secret2),
    );
    // an arbitrary signature in place of the first funding-key one
    edge.auth_proof.bitcoin_sig.0 = rng.gen();

    let result = ctx.router.add_edge(edge);
    assert!(matches!(result, Err(RoutingError::InvalidSignature(_))));

    // zero graph mutation, zero notification
    assert!(ctx.router.channel(chan_id).is_none());
    assert!(ntfn_client.topology_changes.try_recv().is_err());
}

#[test]
fn unfunded_channel_is_rejected() {
    let ctx = create_test_ctx(0);
    let mut rng = thread_rng();

    let (_, node_key1) = create_test_node_with_key();
    let (_, node_key2) = create_test_node_with_key();
    let bitcoin_secret1: SecretKey = rng.gen();
    let bitcoin_secret2: SecretKey = rng.gen();

    // nothing was ever confirmed at this channel id
    let chan_id = ShortChannelId::new(42, 0, 0);
    let edge = signed_edge(
        chan_id,
        (&node_key1, &node_key2),
        (&bitcoin_secret1, &bitcoin_secret2),
    );

    let result = ctx.router.add_edge(edge);
    assert!(matches!(result, Err(RoutingError::ChannelNotFunded)));
    assert!(ctx.router.channel(chan_id).is_none());
}

#[test]
fn spent_funding_output_is_rejected() {
    let ctx = create_test_ctx(0);
    let mut rng = thread_rng();

    let (_, node_key1) = create_test_node_with_key();
    let (_, node_key2) = create_test_node_with_key();
    let bitcoin_secret1: SecretKey = rng.gen();
    let bitcoin_secret2: SecretKey = rng.gen();
    let bitcoin_key1 = PublicKey::paired(&bitcoin_secret1);
    let bitcoin_key2 = PublicKey::paired(&bitcoin_secret2);

    // the funding transaction is confirmed, but its output is not in the
    // utxo set anymore
    let funding_tx = Transaction {
        version: 2,
        inputs: Vec::new(),
        outputs: vec![TxOut {
            value: CHAN_VALUE,
            pk_script: funding_script(&bitcoin_key1, &bitcoin_key2),
        }],
        lock_time: 0,
    };
    let chan_id = ShortChannelId::new(7, 0, 0);
    ctx.chain.add_block(
        Block {
            header: BlockHeader::default(),
            transactions: vec![funding_tx],
        },
        7,
    );

    let edge = signed_edge(
        chan_id,
        (&node_key1, &node_key2),
        (&bitcoin_secret1, &bitcoin_secret2),
    );
    let result = ctx.router.add_edge(edge);
    assert!(matches!(result, Err(RoutingError::ChannelNotFunded)));
}

#[test]
fn unknown_channel_policy_is_rejected() {
    let ctx = create_test_ctx(0);

    let policy = rand_edge_policy(ShortChannelId::new(1, 2, 3), ChannelUpdateFlags::empty());
    let result = ctx.router.update_edge(policy);
    assert!(matches!(result, Err(RoutingError::UnknownChannel(_))));
}

#[test]
fn stale_edge_policy_is_rejected() {
    let ctx = create_test_ctx(0);
    let channel = announce_funded_channel(&ctx, 0);

    let ntfn_client = ctx.router.subscribe_topology();

    let policy = rand_edge_policy(channel.chan_id, ChannelUpdateFlags::empty());
    ctx.router.update_edge(policy.clone()).unwrap();

    // the same timestamp must not be observable
    let result = ctx.router.update_edge(policy.clone());
    assert!(matches!(result, Err(RoutingError::StaleUpdate)));

    // the opposite direction has its own clock
    let mut reverse = policy.clone();
    reverse.flags = ChannelUpdateFlags::DIRECTION;
    ctx.router.update_edge(reverse).unwrap();

    let mut count = 0;
    while ntfn_client
        .topology_changes
        .recv_timeout(Duration::from_millis(300))
        .is_ok()
    {
        count += 1;
    }
    assert_eq!(count, 2);
}

#[test]
fn duplicate_channel_announcement_is_rejected() {
    let ctx = create_test_ctx(0);
    let mut rng = thread_rng();

    let (_, node_key1) = create_test_node_with_key();
    let (_, node_key2) = create_test_node_with_key();
    let bitcoin_secret1: SecretKey = rng.gen();
    let bitcoin_secret2: SecretKey = rng.gen();
    let bitcoin_key1 = PublicKey::paired(&bitcoin_secret1);
    let bitcoin_key2 = PublicKey::paired(&bitcoin_secret2);

    let (funding_tx, _, chan_id) =
        create_channel_edge(&ctx, &bitcoin_key1, &bitcoin_key2, CHAN_VALUE, 0);
    ctx.chain.add_block(
        Block {
            header: BlockHeader::default(),
            transactions: vec![funding_tx],
        },
        chan_id.block_height,
    );

    let edge = signed_edge(
        chan_id,
        (&node_key1, &node_key2),
        (&bitcoin_secret1, &bitcoin_secret2),
    );
    ctx.router.add_edge(edge.clone()).unwrap();

    let result = ctx.router.add_edge(edge);
    assert!(matches!(result, Err(RoutingError::StaleUpdate)));
}

#[test]
fn stop_detaches_from_chain_and_closes_clients() {
    let ctx = create_test_ctx(0);
    let ntfn_client = ctx.router.subscribe_topology();

    ctx.router.stop();

    // the epoch registration is gone from the backend and every
    // subscriber queue reports closure
    assert!(ctx.notifier.clients.lock().unwrap().is_empty());
    assert!(ntfn_client.topology_changes.recv().is_err());
}

#[test]
fn two_distinct_nodes_two_notifications() {
    let ctx = create_test_ctx(0);
    let ntfn_client = ctx.router.subscribe_topology();

    let node1 = create_test_node();
    let node2 = create_test_node();
    ctx.router.add_node(node1.clone()).unwrap();
    ctx.router.add_node(node2.clone()).unwrap();

    let first = ntfn_client.topology_changes.recv().unwrap();
    let second = ntfn_client.topology_changes.recv().unwrap();
    assert_eq!(first.node_updates.len(), 1);
    assert_eq!(second.node_updates.len(), 1);
    assert_eq!(first.node_updates[0].identity_key, node1.identity_key);
    assert_eq!(second.node_updates[0].identity_key, node2.identity_key);
    assert!(ntfn_client.topology_changes.try_recv().is_err());
}
