/// Human-readable node name, zero-padded to 32 bytes on the wire.
#[derive(Default, Clone, Eq, PartialEq, Debug)]
pub struct NodeAlias(String);

const SIZE: usize = 32;

impl NodeAlias {
    pub fn try_from_string(s: &str) -> Option<Self> {
        if s.len() < SIZE {
            Some(NodeAlias(s.to_owned()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn string(self) -> String {
        self.0
    }
}

mod serde_m {
    use super::NodeAlias;
    use super::SIZE;

    use serde::ser;
    use serde::de;
    use serde::Serialize;
    use serde::Serializer;
    use serde::Deserialize;
    use serde::Deserializer;

    impl Serialize for NodeAlias {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
            let &NodeAlias(ref s) = self;
            let v = s.as_bytes();

            if v.len() >= SIZE {
                Err(<S::Error as ser::Error>::custom(format!(
                    "the alias of {} bytes overflows {} bytes limit",
                    v.len(),
                    SIZE - 1,
                )))
            } else {
                let mut buffer = [0u8; SIZE];
                buffer[0..v.len()].copy_from_slice(v);
                buffer.serialize(serializer)
            }
        }
    }

    impl<'de> Deserialize<'de> for NodeAlias {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
            let buffer: [u8; SIZE] = Deserialize::deserialize(deserializer)?;
            let length = buffer.iter().position(|&b| b == 0).unwrap_or(SIZE);
            let string = String::from_utf8((&buffer[0..length]).to_owned())
                .map_err(<D::Error as de::Error>::custom)?;
            Ok(NodeAlias(string))
        }
    }
}
