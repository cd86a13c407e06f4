use std::error::Error;
use std::fmt;

use binformat::WireError;
use chainntfs::ChainError;
use common_types::SignError;
use wire::ShortChannelId;

/// Every failure here is local to the rejected input: the graph, the
/// tracked funding set and the subscribers stay exactly as they were.
#[derive(Debug)]
pub enum RoutingError {
    /// One of the announcement signatures does not verify.
    InvalidSignature(SignError),
    /// The referenced funding output does not exist or is already spent.
    ChannelNotFunded,
    /// A policy update arrived for a channel that was never announced.
    UnknownChannel(ShortChannelId),
    /// The monotonic-update rule rejected the record: it is not strictly
    /// newer than the stored one. Not a hard error, but distinguishable
    /// from acceptance.
    StaleUpdate,
    /// The chain backend failed for a reason other than a missing entity.
    /// Not retried here.
    Chain(ChainError),
    Wire(WireError),
    Store(String),
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::RoutingError::*;

        match self {
            &InvalidSignature(ref e) => write!(f, "announcement authentication failed: {}", e),
            &ChannelNotFunded => write!(f, "the funding output does not exist or is spent"),
            &UnknownChannel(ref id) => write!(f, "no channel announced for {:?}", id),
            &StaleUpdate => write!(f, "the update is not strictly newer than the stored record"),
            &Chain(ref e) => write!(f, "chain backend error: {}", e),
            &Wire(ref e) => write!(f, "wire error: {}", e),
            &Store(ref msg) => write!(f, "graph store error: {}", msg),
        }
    }
}

impl Error for RoutingError {}

impl From<ChainError> for RoutingError {
    fn from(v: ChainError) -> Self {
        RoutingError::Chain(v)
    }
}

impl From<WireError> for RoutingError {
    fn from(v: WireError) -> Self {
        RoutingError::Wire(v)
    }
}
