use std::net::SocketAddr;

use chrono::DateTime;
use chrono::Utc;

use common_types::{PublicKey, RawSignature};
use bitcoin_types::ChannelPoint;
use wire::{Color, NodeAlias, RawFeatureVector, Satoshi, MilliSatoshi, ShortChannelId, ChannelUpdateFlags};

/// Authenticated record of a network participant. At most one live
/// record per identity key; a newer record replaces an older one only
/// when its timestamp is strictly greater.
#[derive(Clone, Debug)]
pub struct LightningNode {
    pub identity_key: PublicKey,
    pub last_update: DateTime<Utc>,
    pub addresses: Vec<SocketAddr>,
    pub alias: NodeAlias,
    pub color: Color,
    pub features: RawFeatureVector,
    pub auth_signature: RawSignature,
}

/// The four signatures of the channel announcement the edge was
/// admitted with.
#[derive(Copy, Clone, Debug)]
pub struct ChannelAuthProof {
    pub node_sig: (RawSignature, RawSignature),
    pub bitcoin_sig: (RawSignature, RawSignature),
}

/// A single announced channel. `channel_point` and `capacity` are
/// resolved against the chain on acceptance and stay fixed afterwards.
#[derive(Clone, Debug)]
pub struct ChannelInfo {
    pub short_channel_id: ShortChannelId,
    pub node_id: (PublicKey, PublicKey),
    pub bitcoin_key: (PublicKey, PublicKey),
    pub auth_proof: ChannelAuthProof,
    pub channel_point: ChannelPoint,
    pub capacity: Satoshi,
}

/// One directed routing policy of a channel, at most two per channel.
#[derive(Clone, Debug)]
pub struct ChannelPolicy {
    pub short_channel_id: ShortChannelId,
    pub last_update: DateTime<Utc>,
    pub flags: ChannelUpdateFlags,
    pub time_lock_delta: u16,
    pub htlc_minimum: MilliSatoshi,
    pub base_fee: u32,
    pub fee_rate: u32,
    pub signature: RawSignature,
}

impl ChannelPolicy {
    /// 0 means the first endpoint advertises the policy towards the
    /// second one, 1 the reverse.
    pub fn direction(&self) -> usize {
        if self.flags.contains(ChannelUpdateFlags::DIRECTION) {
            1
        } else {
            0
        }
    }

    pub fn disabled(&self) -> bool {
        self.flags.contains(ChannelUpdateFlags::DISABLED)
    }
}
