use secp256k1::{Secp256k1, Message, Signing, Verification};
use secp256k1::ecdsa::Signature as Secp256k1Signature;
use serde::Serialize;
use serde_derive::{Serialize, Deserialize};

use binformat::{BinarySD, WireError};

use crate::hash::double_sha256;
use crate::crypto_types::{PublicKey, SecretKey, Secp256k1Error};

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum SignError {
    Wire(WireError),
    Crypto(Secp256k1Error),
    IncorrectSignature,
}

impl fmt::Display for SignError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::SignError::*;

        match self {
            &Wire(ref e) => write!(f, "cannot produce canonical bytes: {}", e),
            &Crypto(ref e) => write!(f, "crypto error: {}", e),
            &IncorrectSignature => write!(f, "incorrect signature"),
        }
    }
}

impl Error for SignError {}

impl From<WireError> for SignError {
    fn from(v: WireError) -> Self {
        SignError::Wire(v)
    }
}

/// The content of an authenticated message. What gets signed is the
/// double-SHA256 of its canonical `BinarySD` encoding, so the hash
/// depends only on final field values, never on construction order.
#[derive(Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct Data<T>(pub T)
where
    T: Serialize;

impl<T> Data<T>
where
    T: Serialize,
{
    pub fn double_hash(&self) -> Result<Message, SignError> {
        let mut bytes = Vec::new();
        BinarySD::serialize(&mut bytes, &self.0)?;
        let hash = double_sha256(bytes.as_slice());
        Message::from_slice(hash.as_ref()).map_err(SignError::Crypto)
    }
}

/// A message content together with a signature over its canonical bytes.
#[derive(Clone, Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct Signed<T, S> {
    pub signature: S,
    pub data: T,
}

impl<T, S> Signed<Data<T>, S>
where
    T: Serialize,
    S: From<Secp256k1Signature> + AsRef<Secp256k1Signature>,
{
    pub fn sign<C>(
        data: Data<T>,
        context: &Secp256k1<C>,
        secret_key: &SecretKey,
    ) -> Result<Self, SignError>
    where
        C: Signing,
    {
        let message = data.double_hash()?;
        let signature = context.sign_ecdsa(&message, secret_key.as_ref());
        Ok(Signed {
            signature: signature.into(),
            data: data,
        })
    }

    pub fn check<C>(
        &self,
        context: &Secp256k1<C>,
        public_key: &PublicKey,
    ) -> Result<(), SignError>
    where
        C: Verification,
    {
        let message = self.data.double_hash()?;
        context
            .verify_ecdsa(&message, self.signature.as_ref(), public_key.as_ref())
            .map_err(|e| match e {
                Secp256k1Error::IncorrectSignature => SignError::IncorrectSignature,
                e => SignError::Crypto(e),
            })
    }

    pub fn verify<C>(
        self,
        context: &Secp256k1<C>,
        public_key: &PublicKey,
    ) -> Result<Data<T>, SignError>
    where
        C: Verification,
    {
        self.check(context, public_key)?;
        Ok(self.data)
    }

    /// Verify using a public key carried inside the signed content itself.
    pub fn verify_key_inside<C, F>(
        self,
        context: &Secp256k1<C>,
        get_public_key: F,
    ) -> Result<Data<T>, SignError>
    where
        C: Verification,
        F: FnOnce(&T) -> &PublicKey,
    {
        let public_key = *get_public_key(&self.data.0);
        self.verify(context, &public_key)
    }
}
