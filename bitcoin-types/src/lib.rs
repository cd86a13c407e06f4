#![forbid(unsafe_code)]

use serde_derive::{Serialize, Deserialize};

use common_types::Hash256;

mod block;

pub use self::block::{TxIn, TxOut, Transaction, BlockHeader, Block};

/// Reference to a single transaction output, the settlement-chain anchor
/// of a payment channel. Spending it closes the channel.
#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Copy, Clone)]
pub struct ChannelPoint {
    hash: Hash256,
    index: u32,
}

impl ChannelPoint {
    pub fn new(hash: Hash256, index: u32) -> Self {
        ChannelPoint {
            hash: hash,
            index: index,
        }
    }

    pub fn hash(&self) -> Hash256 {
        self.hash
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}
