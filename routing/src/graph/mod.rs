use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use common_types::PublicKey;
use wire::ShortChannelId;

use crate::topology::{LightningNode, ChannelInfo, ChannelPolicy};

#[derive(Debug, Eq, PartialEq)]
pub enum GraphError {
    /// The record is not strictly newer than the stored one, or the
    /// channel is already known.
    StaleUpdate,
    /// No channel stored under the given id.
    UnknownChannel,
    /// The underlying store failed.
    Store(String),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &GraphError::StaleUpdate => write!(f, "stale update"),
            &GraphError::UnknownChannel => write!(f, "unknown channel"),
            &GraphError::Store(ref msg) => write!(f, "store failure: {}", msg),
        }
    }
}

impl Error for GraphError {}

/// A channel together with its two directed policies, indexed by the
/// policy direction flag.
#[derive(Clone, Debug)]
pub struct ChannelEdge {
    pub info: ChannelInfo,
    pub policies: [Option<ChannelPolicy>; 2],
}

/// Key-addressable store of the authoritative network graph. The
/// monotonic-update rules live at this seam so that any durable backend
/// only has to expose atomic-enough read-modify-write per key. Reads
/// return owned snapshots, consistent per key.
pub trait ChannelGraph: Send {
    /// Insert the node, or replace the stored record when the incoming
    /// timestamp is strictly greater.
    fn add_node(&mut self, node: LightningNode) -> Result<(), GraphError>;

    /// Insert a new channel. A channel id maps to exactly one record, a
    /// re-announcement is stale by definition.
    fn add_channel(&mut self, info: ChannelInfo) -> Result<(), GraphError>;

    /// Overwrite one directed policy per the monotonic-update rule and
    /// return the owning channel for endpoint resolution.
    fn update_policy(&mut self, policy: ChannelPolicy) -> Result<ChannelInfo, GraphError>;

    fn remove_channel(&mut self, short_channel_id: ShortChannelId) -> Option<ChannelInfo>;

    fn node(&self, identity_key: &PublicKey) -> Option<LightningNode>;

    fn channel(&self, short_channel_id: ShortChannelId) -> Option<ChannelEdge>;

    fn for_each_node(&self, f: &mut dyn FnMut(&LightningNode));

    fn for_each_channel(&self, f: &mut dyn FnMut(&ChannelEdge));
}

/// The bundled in-memory store. Durable backends are external and plug
/// in through the same trait.
#[derive(Default)]
pub struct MemoryGraph {
    nodes: HashMap<PublicKey, LightningNode>,
    channels: HashMap<ShortChannelId, ChannelEdge>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        MemoryGraph::default()
    }
}

impl ChannelGraph for MemoryGraph {
    fn add_node(&mut self, node: LightningNode) -> Result<(), GraphError> {
        match self.nodes.get(&node.identity_key) {
            Some(stored) if stored.last_update >= node.last_update => Err(GraphError::StaleUpdate),
            _ => {
                self.nodes.insert(node.identity_key, node);
                Ok(())
            },
        }
    }

    fn add_channel(&mut self, info: ChannelInfo) -> Result<(), GraphError> {
        if self.channels.contains_key(&info.short_channel_id) {
            return Err(GraphError::StaleUpdate);
        }
        self.channels.insert(info.short_channel_id, ChannelEdge {
            info: info,
            policies: [None, None],
        });
        Ok(())
    }

    fn update_policy(&mut self, policy: ChannelPolicy) -> Result<ChannelInfo, GraphError> {
        let edge = self
            .channels
            .get_mut(&policy.short_channel_id)
            .ok_or(GraphError::UnknownChannel)?;

        let direction = policy.direction();
        if let Some(ref stored) = edge.policies[direction] {
            if stored.last_update >= policy.last_update {
                return Err(GraphError::StaleUpdate);
            }
        }

        edge.policies[direction] = Some(policy);
        Ok(edge.info.clone())
    }

    fn remove_channel(&mut self, short_channel_id: ShortChannelId) -> Option<ChannelInfo> {
        self.channels.remove(&short_channel_id).map(|edge| edge.info)
    }

    fn node(&self, identity_key: &PublicKey) -> Option<LightningNode> {
        self.nodes.get(identity_key).cloned()
    }

    fn channel(&self, short_channel_id: ShortChannelId) -> Option<ChannelEdge> {
        self.channels.get(&short_channel_id).cloned()
    }

    fn for_each_node(&self, f: &mut dyn FnMut(&LightningNode)) {
        for node in self.nodes.values() {
            f(node);
        }
    }

    fn for_each_channel(&self, f: &mut dyn FnMut(&ChannelEdge)) {
        for edge in self.channels.values() {
            f(edge);
        }
    }
}
