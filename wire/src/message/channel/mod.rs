mod announcement;

pub use self::announcement::{AnnouncementChannel, AnnouncementChannelData};

use serde_derive::{Serialize, Deserialize};
use bitflags::bitflags;

/// 32-byte channel identifier used by channel-scoped control messages.
#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Copy, Clone, Hash)]
pub struct ChannelId {
    data: [u8; 32],
}

impl ChannelId {
    pub const SIZE: usize = 32;

    pub fn is_all_zero(&self) -> bool {
        self.data.iter().all(|&b| b == 0)
    }
}

impl From<[u8; 32]> for ChannelId {
    fn from(data: [u8; 32]) -> Self {
        ChannelId { data: data }
    }
}

mod debug {
    use super::ChannelId;

    use std::fmt;

    impl fmt::Debug for ChannelId {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "ChannelId [ {} ]", hex::encode(&self.data[..]))
        }
    }
}

bitflags! {
    /// Flags of a directed channel policy update. The direction bit selects
    /// which endpoint the policy is advertised by.
    #[derive(Serialize, Deserialize)]
    pub struct ChannelUpdateFlags: u16 {
        const DIRECTION = 0b00000001;
        const DISABLED = 0b00000010;
    }
}
