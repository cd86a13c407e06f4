use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, error, info};
use secp256k1::{Secp256k1, VerifyOnly};

use bitcoin_types::{Block, ChannelPoint};
use chainntfs::{BlockEpochEvent, CancelHandle, ChainError, ChainIO};
use common_types::PublicKey;
use wire::{AnnouncementChannel, Satoshi, ShortChannelId};

use crate::error::RoutingError;
use crate::graph::{ChannelEdge, ChannelGraph, GraphError};
use crate::topology::{
    ChannelEdgeUpdate, ChannelInfo, ChannelPolicy, ClosedChannel, LightningNode,
    NodeUpdate, TopologyChange, TopologyClient, TopologyNotifier,
};

/// Router tunables.
#[derive(Clone, Debug)]
pub struct RouterConfig {
    /// Deducted from every funding output value when the channel capacity
    /// is computed; accounts for the fees the commitment transaction will
    /// consume. A fixed constant until commitment fees become dynamic.
    pub commitment_fee_reserve: Satoshi,
}

impl Default for RouterConfig {
    fn default() -> Self {
        RouterConfig {
            commitment_fee_reserve: Satoshi::from(5000),
        }
    }
}

struct TrackedFunding {
    short_channel_id: ShortChannelId,
    capacity: Satoshi,
}

struct RouterState<G> {
    graph: G,
    // funding outputs watched for closure, each tracked at most once
    tracked: HashMap<ChannelPoint, TrackedFunding>,
}

struct RouterInner<G, C> {
    config: RouterConfig,
    state: Mutex<RouterState<G>>,
    chain: C,
    notifier: TopologyNotifier,
    secp: Secp256k1<VerifyOnly>,
    epoch_cancel: Mutex<Option<CancelHandle>>,
}

/// The mutation surface of the network graph and the producer of every
/// topology delta. All mutation is serialized behind a single lock; the
/// matching notification is published before the lock is released, so
/// subscribers observe deltas in mutation order.
pub struct ChannelRouter<G, C> {
    inner: Arc<RouterInner<G, C>>,
}

impl<G, C> Clone for ChannelRouter<G, C> {
    fn clone(&self) -> Self {
        ChannelRouter {
            inner: self.inner.clone(),
        }
    }
}

impl<G, C> ChannelRouter<G, C>
where
    G: ChannelGraph + Send + 'static,
    C: ChainIO + Send + Sync + 'static,
{
    pub fn new(config: RouterConfig, graph: G, chain: C) -> Self {
        ChannelRouter {
            inner: Arc::new(RouterInner {
                config: config,
                state: Mutex::new(RouterState {
                    graph: graph,
                    tracked: HashMap::new(),
                }),
                chain: chain,
                notifier: TopologyNotifier::new(),
                secp: Secp256k1::verification_only(),
                epoch_cancel: Mutex::new(None),
            }),
        }
    }

    /// Spawn the chain watcher over the given block subscription. For
    /// every connected block the watcher scans transaction inputs for
    /// spends of tracked funding outputs.
    pub fn start(&self, event: BlockEpochEvent) {
        let (epochs, cancel) = event.into_parts();
        *self.inner.epoch_cancel.lock().expect("poisoned cancel lock") = Some(cancel);

        let inner = self.inner.clone();
        thread::spawn(move || {
            while let Ok(epoch) = epochs.recv() {
                match inner.chain.block_by_hash(&epoch.hash) {
                    Ok(block) => inner.process_block(&block, epoch.height),
                    Err(err) => error!(
                        "unable to fetch block {} at height {}: {}",
                        epoch.hash, epoch.height, err,
                    ),
                }
            }
            debug!("block epoch feed closed, chain watcher exits");
        });
    }

    /// Detach from the block feed and close every subscriber queue.
    pub fn stop(&self) {
        if let Some(cancel) = self.inner.epoch_cancel.lock().expect("poisoned cancel lock").take() {
            cancel.cancel();
        }
        self.inner.notifier.shutdown();
    }

    pub fn add_node(&self, node: LightningNode) -> Result<(), RoutingError> {
        self.inner.add_node(node)
    }

    pub fn add_edge(&self, edge: ChannelInfo) -> Result<(), RoutingError> {
        self.inner.add_edge(edge)
    }

    pub fn update_edge(&self, policy: ChannelPolicy) -> Result<(), RoutingError> {
        self.inner.update_edge(policy)
    }

    /// Feed a connected block directly, bypassing the epoch subscription.
    pub fn process_block(&self, block: &Block, height: u32) {
        self.inner.process_block(block, height)
    }

    pub fn subscribe_topology(&self) -> TopologyClient {
        self.inner.notifier.subscribe()
    }

    pub fn node(&self, identity_key: &PublicKey) -> Option<LightningNode> {
        self.inner.state.lock().expect("poisoned graph lock").graph.node(identity_key)
    }

    pub fn channel(&self, short_channel_id: ShortChannelId) -> Option<ChannelEdge> {
        self.inner.state.lock().expect("poisoned graph lock").graph.channel(short_channel_id)
    }

    pub fn for_each_node(&self, f: &mut dyn FnMut(&LightningNode)) {
        self.inner.state.lock().expect("poisoned graph lock").graph.for_each_node(f)
    }

    pub fn for_each_channel(&self, f: &mut dyn FnMut(&ChannelEdge)) {
        self.inner.state.lock().expect("poisoned graph lock").graph.for_each_channel(f)
    }
}

impl<G, C> RouterInner<G, C>
where
    G: ChannelGraph,
    C: ChainIO,
{
    fn add_node(&self, node: LightningNode) -> Result<(), RoutingError> {
        let mut state = self.state.lock().expect("poisoned graph lock");

        let update = NodeUpdate {
            identity_key: node.identity_key,
            addresses: node.addresses.clone(),
            alias: node.alias.clone(),
            color: node.color,
        };
        state.graph.add_node(node).map_err(graph_error)?;

        debug!("node announcement accepted: {}", update.identity_key);
        self.notifier.publish(TopologyChange {
            node_updates: vec![update],
            ..TopologyChange::default()
        });
        Ok(())
    }

    fn add_edge(&self, edge: ChannelInfo) -> Result<(), RoutingError> {
        // the four signatures over the canonical announcement bytes
        let announcement = AnnouncementChannel {
            node_sig: edge.auth_proof.node_sig,
            short_channel_id: edge.short_channel_id,
            bitcoin_sig: edge.auth_proof.bitcoin_sig,
            node_id: edge.node_id,
            bitcoin_key: edge.bitcoin_key,
        };
        announcement
            .verify(&self.secp)
            .map_err(RoutingError::InvalidSignature)?;

        let (channel_point, value) = self.resolve_funding_output(edge.short_channel_id)?;
        let capacity = Satoshi::from(value).saturating_sub(self.config.commitment_fee_reserve);

        let mut edge = edge;
        edge.channel_point = channel_point;
        edge.capacity = capacity;
        let short_channel_id = edge.short_channel_id;

        let mut state = self.state.lock().expect("poisoned graph lock");
        state.graph.add_channel(edge).map_err(graph_error)?;
        state.tracked.insert(channel_point, TrackedFunding {
            short_channel_id: short_channel_id,
            capacity: capacity,
        });

        info!(
            "channel {:?} accepted, funding output {:?} now tracked for closure",
            short_channel_id, channel_point,
        );
        Ok(())
    }

    fn update_edge(&self, policy: ChannelPolicy) -> Result<(), RoutingError> {
        let short_channel_id = policy.short_channel_id;
        let direction = policy.direction();
        let disabled = policy.disabled();
        let htlc_minimum = policy.htlc_minimum;
        let base_fee = policy.base_fee;
        let fee_rate = policy.fee_rate;
        let time_lock_delta = policy.time_lock_delta;

        let mut state = self.state.lock().expect("poisoned graph lock");
        let info = state.graph.update_policy(policy).map_err(|e| match e {
            GraphError::UnknownChannel => RoutingError::UnknownChannel(short_channel_id),
            e => graph_error(e),
        })?;

        let (advertising_node, connecting_node) = if direction == 0 {
            (info.node_id.0, info.node_id.1)
        } else {
            (info.node_id.1, info.node_id.0)
        };

        debug!(
            "channel policy accepted for {:?}, direction {}",
            short_channel_id, direction,
        );
        self.notifier.publish(TopologyChange {
            channel_edge_updates: vec![ChannelEdgeUpdate {
                short_channel_id: short_channel_id,
                channel_point: info.channel_point,
                capacity: info.capacity,
                htlc_minimum: htlc_minimum,
                base_fee: base_fee,
                fee_rate: fee_rate,
                time_lock_delta: time_lock_delta,
                advertising_node: advertising_node,
                connecting_node: connecting_node,
                disabled: disabled,
            }],
            ..TopologyChange::default()
        });
        Ok(())
    }

    /// Resolve the funding output the channel id points at and make sure
    /// it exists and is still unspent.
    fn resolve_funding_output(
        &self,
        short_channel_id: ShortChannelId,
    ) -> Result<(ChannelPoint, u64), RoutingError> {
        let block_hash = self
            .chain
            .block_hash(short_channel_id.block_height)
            .map_err(chain_error)?;
        let block = self.chain.block_by_hash(&block_hash).map_err(chain_error)?;

        let transaction = block
            .transactions
            .get(short_channel_id.tx_index as usize)
            .ok_or(RoutingError::ChannelNotFunded)?;
        if transaction.outputs.len() <= short_channel_id.tx_position as usize {
            return Err(RoutingError::ChannelNotFunded);
        }

        let channel_point = ChannelPoint::new(
            transaction.txid()?,
            short_channel_id.tx_position as u32,
        );
        let output = self.chain.utxo(&channel_point).map_err(chain_error)?;
        Ok((channel_point, output.value))
    }

    fn process_block(&self, block: &Block, height: u32) {
        let mut state = self.state.lock().expect("poisoned graph lock");

        let mut closed_channels = Vec::new();
        for transaction in block.transactions.iter() {
            for input in transaction.inputs.iter() {
                let tracked = match state.tracked.remove(&input.previous_output) {
                    Some(tracked) => tracked,
                    None => continue,
                };
                state.graph.remove_channel(tracked.short_channel_id);
                info!(
                    "funding output {:?} spent, channel {:?} closed at height {}",
                    input.previous_output, tracked.short_channel_id, height,
                );
                closed_channels.push(ClosedChannel {
                    short_channel_id: tracked.short_channel_id,
                    channel_point: input.previous_output,
                    capacity: tracked.capacity,
                    closed_height: height,
                });
            }
        }

        // all closures of one block batch into a single delta
        if !closed_channels.is_empty() {
            self.notifier.publish(TopologyChange {
                closed_channels: closed_channels,
                ..TopologyChange::default()
            });
        }
    }
}

fn graph_error(e: GraphError) -> RoutingError {
    match e {
        GraphError::StaleUpdate => RoutingError::StaleUpdate,
        GraphError::UnknownChannel => RoutingError::Store("unexpected unknown channel".to_owned()),
        GraphError::Store(msg) => RoutingError::Store(msg),
    }
}

fn chain_error(e: ChainError) -> RoutingError {
    match e {
        ChainError::NotFound => RoutingError::ChannelNotFunded,
        e => RoutingError::Chain(e),
    }
}
