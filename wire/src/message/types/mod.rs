mod units;
mod color;
mod alias;
mod short_channel_id;
mod features;

pub use common_types::*;
pub use bitcoin_types::*;

pub use self::units::Satoshi;
pub use self::units::MilliSatoshi;
pub use self::color::Color;
pub use self::alias::NodeAlias;
pub use self::short_channel_id::ShortChannelId;
pub use self::features::FeatureBit;
pub use self::features::RawFeatureVector;
