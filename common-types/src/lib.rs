#![forbid(unsafe_code)]

mod hash;
mod crypto_types;
mod secp256k1_m;

pub use self::hash::{Hash256, double_sha256};
pub use self::crypto_types::{
    PublicKey, SecretKey, RawSignature, Secp256k1Error,
    PUBLIC_KEY_SIZE, SECRET_KEY_SIZE, SIGNATURE_SIZE,
};
pub use self::secp256k1_m::{Data, Signed, SignError};
