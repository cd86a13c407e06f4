use serde_derive::{Serialize, Deserialize};

#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash, Copy, Clone)]
pub struct Hash256 {
    data: [u8; 32],
}

impl Hash256 {
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut data = [0u8; 32];
        data.copy_from_slice(bytes.as_slice());
        Ok(Hash256 { data: data })
    }
}

impl From<[u8; 32]> for Hash256 {
    fn from(data: [u8; 32]) -> Self {
        Hash256 { data: data }
    }
}

impl From<Hash256> for [u8; 32] {
    fn from(h: Hash256) -> Self {
        h.data
    }
}

impl AsRef<[u8]> for Hash256 {
    fn as_ref(&self) -> &[u8] {
        &self.data[..]
    }
}

/// SHA256 applied twice, the hash flavor every authenticated gossip
/// payload and every chain identifier is built from.
pub fn double_sha256(input: &[u8]) -> Hash256 {
    use sha2::{Digest, Sha256};

    let first = Sha256::digest(input);
    let second = Sha256::digest(first.as_slice());
    let mut data = [0u8; 32];
    data.copy_from_slice(second.as_slice());
    Hash256 { data: data }
}

mod debug {
    use super::Hash256;

    use hex::encode;
    use std::fmt;

    impl fmt::Debug for Hash256 {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "Hash256 [ {} ]", encode(&self.data[0..]))
        }
    }

    impl fmt::Display for Hash256 {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "{}", encode(&self.data[0..]))
        }
    }
}

#[cfg(any(test, feature = "testing"))]
mod rand_m {
    use super::Hash256;

    use rand::distributions::Distribution;
    use rand::distributions::Standard;
    use rand::Rng;

    impl Distribution<Hash256> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Hash256 {
            Hash256 { data: rng.gen() }
        }
    }
}
