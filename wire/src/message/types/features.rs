use serde_derive::{Serialize, Deserialize};

/// Known feature bit positions. Even bits are required, the following
/// odd bit is the optional variant of the same feature.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum FeatureBit {
    DataLossProtectRequired = 0,
    DataLossProtectOptional = 1,
    InitialRoutingSync = 3,
    GossipQueriesRequired = 6,
    GossipQueriesOptional = 7,
}

/// Bitset of features a node advertises, encoded as a length-prefixed
/// byte string with bit 0 in the last byte.
#[derive(Default, Clone, Eq, PartialEq, Serialize, Deserialize, Debug)]
pub struct RawFeatureVector {
    bytes: Vec<u8>,
}

impl RawFeatureVector {
    pub fn new() -> Self {
        RawFeatureVector { bytes: Vec::new() }
    }

    pub fn set_bit(self, bit: FeatureBit) -> Self {
        let mut s = self;
        let bit = bit as usize;
        let width = bit / 8 + 1;
        if s.bytes.len() < width {
            let mut bytes = vec![0u8; width - s.bytes.len()];
            bytes.extend_from_slice(s.bytes.as_slice());
            s.bytes = bytes;
        }
        let last = s.bytes.len() - 1;
        s.bytes[last - bit / 8] |= 1 << (bit % 8);
        s
    }

    pub fn is_set(&self, bit: FeatureBit) -> bool {
        let bit = bit as usize;
        if self.bytes.len() < bit / 8 + 1 {
            return false;
        }
        let last = self.bytes.len() - 1;
        self.bytes[last - bit / 8] & (1 << (bit % 8)) != 0
    }
}
