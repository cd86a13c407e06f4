use serde_derive::{Serialize, Deserialize};

/// RGB color a node advertises for itself, three bytes on the wire.
#[derive(Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct Color {
    data: [u8; 3],
}

impl From<[u8; 3]> for Color {
    fn from(data: [u8; 3]) -> Self {
        Color { data: data }
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        c.data
    }
}
