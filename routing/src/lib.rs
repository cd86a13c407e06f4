#![forbid(unsafe_code)]

mod error;
mod graph;
mod router;
pub mod topology;

#[cfg(test)]
mod test_notifications;

pub use self::error::RoutingError;
pub use self::graph::{ChannelGraph, GraphError, MemoryGraph, ChannelEdge};
pub use self::router::{ChannelRouter, RouterConfig};
pub use self::topology::{
    LightningNode, ChannelInfo, ChannelAuthProof, ChannelPolicy,
    TopologyChange, NodeUpdate, ChannelEdgeUpdate, ClosedChannel, TopologyClient,
};
