use serde::Serialize;
use serde::Serializer;
use serde::Deserialize;
use serde::Deserializer;

use std::fmt;

/// Channel identifier derived from the confirmed position of the funding
/// transaction: block height, transaction index within the block and
/// the funding output index. Packed into 8 bytes on the wire.
#[derive(Default, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ShortChannelId {
    pub block_height: u32,
    pub tx_index: u32,
    pub tx_position: u16,
}

impl ShortChannelId {
    pub fn new(block_height: u32, tx_index: u32, tx_position: u16) -> Self {
        ShortChannelId {
            block_height: block_height,
            tx_index: tx_index,
            tx_position: tx_position,
        }
    }

    // 3 bytes of the height, 3 bytes of the index, 2 bytes of the position
    pub fn to_u64(&self) -> u64 {
        ((self.block_height as u64 & 0xff_ff_ff) << 40)
            | ((self.tx_index as u64 & 0xff_ff_ff) << 16)
            | (self.tx_position as u64)
    }

    pub fn from_u64(v: u64) -> Self {
        ShortChannelId {
            block_height: ((v >> 40) & 0xff_ff_ff) as u32,
            tx_index: ((v >> 16) & 0xff_ff_ff) as u32,
            tx_position: (v & 0xff_ff) as u16,
        }
    }
}

impl fmt::Debug for ShortChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "ShortChannelId [ {}:{}:{} ]",
            self.block_height, self.tx_index, self.tx_position,
        )
    }
}

impl Serialize for ShortChannelId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_u64(self.to_u64())
    }
}

impl<'de> Deserialize<'de> for ShortChannelId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        u64::deserialize(deserializer).map(ShortChannelId::from_u64)
    }
}
