mod node;
mod notifier;

pub use self::node::{LightningNode, ChannelAuthProof, ChannelInfo, ChannelPolicy};
pub use self::notifier::TopologyClient;

pub(crate) use self::notifier::TopologyNotifier;

use std::net::SocketAddr;

use common_types::PublicKey;
use bitcoin_types::ChannelPoint;
use wire::{Color, NodeAlias, Satoshi, MilliSatoshi, ShortChannelId};

/// Immutable batch of topology mutations accepted in one ingestion step.
/// Produced once per accepted mutation or detected closure, never
/// mutated after construction.
#[derive(Default, Clone, Debug)]
pub struct TopologyChange {
    pub node_updates: Vec<NodeUpdate>,
    pub channel_edge_updates: Vec<ChannelEdgeUpdate>,
    pub closed_channels: Vec<ClosedChannel>,
}

/// A node joined the network or refreshed its authenticated attributes.
#[derive(Clone, Debug)]
pub struct NodeUpdate {
    pub identity_key: PublicKey,
    pub addresses: Vec<SocketAddr>,
    pub alias: NodeAlias,
    pub color: Color,
}

/// A directed routing policy of a channel was created or refreshed. The
/// advertising node is the endpoint the policy belongs to, the
/// connecting node is the other end of the channel.
#[derive(Clone, Debug)]
pub struct ChannelEdgeUpdate {
    pub short_channel_id: ShortChannelId,
    pub channel_point: ChannelPoint,
    pub capacity: Satoshi,
    pub htlc_minimum: MilliSatoshi,
    pub base_fee: u32,
    pub fee_rate: u32,
    pub time_lock_delta: u16,
    pub advertising_node: PublicKey,
    pub connecting_node: PublicKey,
    pub disabled: bool,
}

/// The funding output of a tracked channel was spent on-chain.
#[derive(Clone, Debug)]
pub struct ClosedChannel {
    pub short_channel_id: ShortChannelId,
    pub channel_point: ChannelPoint,
    pub capacity: Satoshi,
    pub closed_height: u32,
}
