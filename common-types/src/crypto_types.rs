use secp256k1::PublicKey as Secp256k1PublicKey;
use secp256k1::SecretKey as Secp256k1SecretKey;
use secp256k1::ecdsa::Signature as Secp256k1Signature;
pub use secp256k1::Error as Secp256k1Error;

pub use secp256k1::constants::PUBLIC_KEY_SIZE;
pub use secp256k1::constants::SECRET_KEY_SIZE;
pub const SIGNATURE_SIZE: usize = 64;

/// Compressed secp256k1 public key, 33 bytes on the wire.
#[derive(Copy, Eq, PartialEq, Clone)]
pub struct PublicKey {
    raw: Secp256k1PublicKey,
}

impl AsRef<Secp256k1PublicKey> for PublicKey {
    fn as_ref(&self) -> &Secp256k1PublicKey {
        &self.raw
    }
}

impl PublicKey {
    pub fn from_slice(data: &[u8]) -> Result<Self, Secp256k1Error> {
        Secp256k1PublicKey::from_slice(data).map(|raw| PublicKey { raw: raw })
    }

    pub fn serialize(&self) -> [u8; PUBLIC_KEY_SIZE] {
        self.raw.serialize()
    }

    /// The public key corresponding to the given secret key.
    pub fn paired(private: &SecretKey) -> Self {
        use secp256k1::Secp256k1;

        let context = Secp256k1::new();
        Secp256k1PublicKey::from_secret_key(&context, &private.raw).into()
    }
}

#[derive(Copy, Eq, PartialEq, Clone)]
pub struct SecretKey {
    raw: Secp256k1SecretKey,
}

impl AsRef<Secp256k1SecretKey> for SecretKey {
    fn as_ref(&self) -> &Secp256k1SecretKey {
        &self.raw
    }
}

impl SecretKey {
    pub fn from_slice(data: &[u8]) -> Result<Self, Secp256k1Error> {
        Secp256k1SecretKey::from_slice(data).map(|raw| SecretKey { raw: raw })
    }
}

/// 64-byte compact representation of an ECDSA signature.
#[derive(Copy, Clone)]
pub struct RawSignature {
    data: Secp256k1Signature,
}

impl AsRef<Secp256k1Signature> for RawSignature {
    fn as_ref(&self) -> &Secp256k1Signature {
        &self.data
    }
}

impl RawSignature {
    pub fn from_compact(data: &[u8]) -> Result<Self, Secp256k1Error> {
        Secp256k1Signature::from_compact(data).map(|data| RawSignature { data: data })
    }

    pub fn serialize_compact(&self) -> [u8; SIGNATURE_SIZE] {
        self.data.serialize_compact()
    }
}

mod ord {
    use super::PublicKey;

    use std::cmp::Ordering;
    use std::hash;

    // comparison and hashing go through the compressed serialization,
    // the same bytes the key has on the wire
    impl PartialOrd for PublicKey {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    impl Ord for PublicKey {
        fn cmp(&self, other: &Self) -> Ordering {
            self.serialize().cmp(&other.serialize())
        }
    }

    impl hash::Hash for PublicKey {
        fn hash<H: hash::Hasher>(&self, state: &mut H) {
            self.serialize().hash(state)
        }
    }
}

mod serde_m {
    use super::RawSignature;
    use super::SIGNATURE_SIZE;
    use super::Secp256k1Signature;

    use super::PublicKey;
    use super::PUBLIC_KEY_SIZE;
    use super::Secp256k1PublicKey;

    use serde::Serialize;
    use serde::Serializer;
    use serde::Deserialize;
    use serde::Deserializer;
    use serde::de::Visitor;
    use serde::de::SeqAccess;
    use serde::de::Error;
    use std::fmt;

    impl Serialize for RawSignature {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
            use serde::ser::SerializeTuple;

            let mut tuple = serializer.serialize_tuple(SIGNATURE_SIZE)?;
            let data = self.data.serialize_compact();
            for i in 0..SIGNATURE_SIZE {
                tuple.serialize_element(&data[i])?;
            }

            tuple.end()
        }
    }

    impl<'de> Deserialize<'de> for RawSignature {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
            struct V;

            impl<'de> Visitor<'de> for V {
                type Value = RawSignature;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "{} bytes of a compact signature", SIGNATURE_SIZE)
                }

                fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error> where A: SeqAccess<'de> {
                    let mut seq = seq;
                    let mut data = [0u8; SIGNATURE_SIZE];
                    for i in 0..SIGNATURE_SIZE {
                        data[i] = seq.next_element()?
                            .ok_or(<A::Error as Error>::custom("unexpected end"))?;
                    }

                    Secp256k1Signature::from_compact(&data[..])
                        .map(|data| RawSignature { data: data })
                        .map_err(A::Error::custom)
                }
            }

            deserializer.deserialize_tuple(SIGNATURE_SIZE, V)
        }
    }

    impl Serialize for PublicKey {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
            use serde::ser::SerializeTuple;

            let mut tuple = serializer.serialize_tuple(PUBLIC_KEY_SIZE)?;
            let array = self.raw.serialize();
            for i in 0..PUBLIC_KEY_SIZE {
                tuple.serialize_element(&array[i])?;
            }

            tuple.end()
        }
    }

    impl<'de> Deserialize<'de> for PublicKey {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: Deserializer<'de> {
            struct V;

            impl<'de> Visitor<'de> for V {
                type Value = PublicKey;

                fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                    write!(formatter, "{} bytes of a compressed public key", PUBLIC_KEY_SIZE)
                }

                fn visit_seq<A>(self, seq: A) -> Result<Self::Value, A::Error> where A: SeqAccess<'de> {
                    let mut seq = seq;
                    let mut data = [0u8; PUBLIC_KEY_SIZE];
                    for i in 0..PUBLIC_KEY_SIZE {
                        data[i] = seq.next_element()?
                            .ok_or(<A::Error as Error>::custom("unexpected end"))?;
                    }

                    Secp256k1PublicKey::from_slice(&data[..])
                        .map(|raw| PublicKey { raw: raw })
                        .map_err(|e| <A::Error as Error>::custom(
                            format!("not a compressed public key: {:?}", e),
                        ))
                }
            }

            deserializer.deserialize_tuple(PUBLIC_KEY_SIZE, V)
        }
    }
}

mod eq {
    use super::RawSignature;

    use std::cmp::Eq;
    use std::cmp::PartialEq;

    impl PartialEq for RawSignature {
        fn eq(&self, other: &Self) -> bool {
            self.data == other.data
        }
    }

    impl Eq for RawSignature {
    }
}

mod debug {
    use super::RawSignature;
    use super::PublicKey;
    use super::SecretKey;

    use std::fmt::{Debug, Display};
    use std::fmt::Formatter;
    use std::fmt::Result;

    use hex::encode;

    impl Debug for RawSignature {
        fn fmt(&self, f: &mut Formatter) -> Result {
            write!(f, "RawSignature [ {} ]", encode(&self.data.serialize_compact()[..]))
        }
    }

    impl Display for RawSignature {
        fn fmt(&self, f: &mut Formatter) -> Result {
            write!(f, "{}", encode(&self.data.serialize_compact()[..]))
        }
    }

    impl Debug for PublicKey {
        fn fmt(&self, f: &mut Formatter) -> Result {
            write!(f, "{:?}", self.raw)
        }
    }

    impl Display for PublicKey {
        fn fmt(&self, f: &mut Formatter) -> Result {
            write!(f, "{}", encode(&self.raw.serialize()[..]))
        }
    }

    impl Debug for SecretKey {
        fn fmt(&self, f: &mut Formatter) -> Result {
            write!(f, "SecretKey [ ... ]")
        }
    }
}

mod secp256k1_c {
    use super::PublicKey;
    use super::SecretKey;
    use super::RawSignature;

    use super::Secp256k1PublicKey;
    use super::Secp256k1SecretKey;
    use super::Secp256k1Signature;

    impl From<Secp256k1PublicKey> for PublicKey {
        fn from(v: Secp256k1PublicKey) -> Self {
            PublicKey { raw: v }
        }
    }

    impl From<PublicKey> for Secp256k1PublicKey {
        fn from(v: PublicKey) -> Self {
            v.raw
        }
    }

    impl From<Secp256k1SecretKey> for SecretKey {
        fn from(v: Secp256k1SecretKey) -> Self {
            SecretKey { raw: v }
        }
    }

    impl From<Secp256k1Signature> for RawSignature {
        fn from(v: Secp256k1Signature) -> Self {
            RawSignature { data: v }
        }
    }

    impl From<RawSignature> for Secp256k1Signature {
        fn from(v: RawSignature) -> Self {
            v.data
        }
    }
}

#[cfg(any(test, feature = "testing"))]
mod rand_m {
    use super::PublicKey;
    use super::SecretKey;
    use super::RawSignature;

    use super::SECRET_KEY_SIZE;
    use super::SIGNATURE_SIZE;

    use rand::distributions::Distribution;
    use rand::distributions::Standard;
    use rand::Rng;

    impl Distribution<SecretKey> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SecretKey {
            loop {
                let data: [u8; SECRET_KEY_SIZE] = rng.gen();
                if let Ok(secret) = SecretKey::from_slice(&data[..]) {
                    return secret;
                }
            }
        }
    }

    impl Distribution<PublicKey> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PublicKey {
            let secret: SecretKey = self.sample(rng);
            PublicKey::paired(&secret)
        }
    }

    impl Distribution<RawSignature> for Standard {
        fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RawSignature {
            loop {
                let mut data = [0u8; SIGNATURE_SIZE];
                rng.fill(&mut data[..]);
                if let Ok(signature) = RawSignature::from_compact(&data[..]) {
                    return signature;
                }
            }
        }
    }
}
