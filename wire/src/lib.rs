#![forbid(unsafe_code)]

mod message;

pub use self::message::*;
pub use self::message::types::*;

pub use binformat::{BinarySD, WireError};
