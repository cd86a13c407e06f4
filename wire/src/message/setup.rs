use serde_derive::{Serialize, Deserialize};

use std::error;
use std::fmt;

use super::channel::ChannelId;

/// Short code that succinctly identifies the failure reported by the
/// remote peer.
#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Debug, Copy, Clone)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    /// The number of active pending channels exceeds the remote policy limit.
    pub const MAX_PENDING_CHANNELS: Self = ErrorCode(1);

    /// The remote peer is still synchronizing to the latest chain state and
    /// cannot process channel traffic yet.
    pub const SYNCHRONIZING_CHAIN: Self = ErrorCode(2);
}

/// A failure bound to an exact channel, or to the whole connection when
/// the channel id is all zeroes. The attached data is free-form; a
/// receiver should only print it verbatim if it is printable ASCII.
#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct Error {
    pub channel_id: ChannelId,
    pub code: ErrorCode,
    pub data: Vec<u8>,
}

impl Error {
    // 2 bytes of the length prefix taken out of the 16-bit domain
    pub const MAX_DATA_LENGTH: usize = (u16::max_value() as usize) - 2;

    pub const MAX_PAYLOAD_LENGTH: usize = ChannelId::SIZE + 2 + 2 + Self::MAX_DATA_LENGTH;

    pub fn new(channel_id: ChannelId, code: ErrorCode, data: Vec<u8>) -> Self {
        Error {
            channel_id: channel_id,
            code: code,
            data: data,
        }
    }

    /// The error applies to the whole connection rather than a single
    /// channel.
    pub fn is_connection_wide(&self) -> bool {
        self.channel_id.is_all_zero()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.data.len() > Self::MAX_DATA_LENGTH {
            return Err(ValidationError::TooLongData {
                length: self.data.len(),
                limit: Self::MAX_DATA_LENGTH,
            });
        }

        Ok(())
    }
}

/// Post-decode domain violation; the message is dropped, the connection
/// survives.
#[derive(Debug, Eq, PartialEq)]
pub enum ValidationError {
    TooLongData { length: usize, limit: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &ValidationError::TooLongData { length, limit } => write!(
                f,
                "attached data of {} bytes overflows the {} bytes limit",
                length, limit,
            ),
        }
    }
}

impl error::Error for ValidationError {}
