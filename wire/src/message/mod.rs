pub mod types;

mod setup;
mod channel;

pub use self::setup::{Error, ErrorCode, ValidationError};
pub use self::channel::{ChannelId, ChannelUpdateFlags, AnnouncementChannel, AnnouncementChannelData};

use serde::Serialize;
use serde::Serializer;
use serde::Deserialize;
use serde::Deserializer;
use serde::ser;
use serde::de;

pub type MessageSize = u16;

macro_rules! message {
    (pub enum $name:ident { $($variant:ident($rtt:literal)),* }) => {
        /// Tagged union of every gossip message; the 16-bit runtime type
        /// tag on the wire selects the variant.
        #[derive(Eq, PartialEq, Debug)]
        pub enum $name {
            $($variant($variant),)*
        }

        impl $name {
            /// No payload fits the transport frame beyond this bound.
            pub const SIZE_LIMIT: usize = (u16::max_value() as usize) - 2;

            /// The per-type payload bound, keyed by the runtime type tag,
            /// so the transport can reject an oversized frame before it
            /// tries to decode it. `None` for unknown tags.
            pub fn max_payload_length(runtime_type: u16) -> Option<usize> {
                match runtime_type {
                    $($rtt => Some($variant::MAX_PAYLOAD_LENGTH),)*
                    _ => None,
                }
            }

            fn read_from<'de, A>(payload: A) -> Result<Self, A::Error> where
                A: de::SeqAccess<'de>
            {
                let mut payload = payload;

                let absent_tag = <A::Error as de::Error>::custom(
                    "cannot read the 16-bit runtime type tag of the message");

                let absent_value = |s| {
                    <A::Error as de::Error>::custom(
                        format!("cannot interpret the payload as an instance of: `{}`", s))
                };

                let unknown_tag = |t| {
                    <A::Error as de::Error>::custom(
                        format!("the runtime type tag `{}` is unknown", t))
                };

                let runtime_type: u16 = payload.next_element()?.ok_or(absent_tag)?;

                use self::$name::*;
                match runtime_type {
                    $(
                        $rtt => {
                            let error = absent_value(stringify!($variant));
                            payload.next_element()
                                .and_then(|value| {
                                    value.ok_or(error).map(|x| $variant(x))
                                })
                        },
                    )*
                    t => Err(unknown_tag(t)),
                }
            }

            fn write_into<A>(&self, consumer: &mut A) -> Result<(), A::Error> where
                A: ser::SerializeStruct
            {
                use self::$name::*;
                match self {
                    $(
                        &$variant(ref payload) => {
                            consumer.serialize_field("type", &($rtt as u16))?;
                            consumer.serialize_field("payload", payload)
                        },
                    )*
                }
            }
        }
    }
}

message! {
    pub enum Message {
        Error(17u16),
        AnnouncementChannel(256u16)
    }
}

impl Message {
    /// Domain checks that decoding alone does not cover; called after
    /// decode and before the message is acted upon.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            &Message::Error(ref error) => error.validate(),
            &Message::AnnouncementChannel(_) => Ok(()),
        }
    }
}

impl Serialize for Message {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        use self::ser::SerializeStruct;

        // the field names are dropped by the binary serializer
        let mut s_struct = serializer.serialize_struct("Message", 2)?;
        self.write_into(&mut s_struct)?;
        s_struct.end()
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
        use std::fmt;

        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = Message;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "pair: 16-bit runtime type tag, \
                     the binary representation of the message"
                )
            }

            fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error> where
                A: de::SeqAccess<'de>,
            {
                Message::read_from(seq)
            }
        }

        deserializer.deserialize_tuple(2, Visitor)
    }
}
