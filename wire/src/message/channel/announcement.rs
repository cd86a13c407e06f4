use serde_derive::{Serialize, Deserialize};

use secp256k1::{Secp256k1, Signing, Verification};

use common_types::{PublicKey, SecretKey, RawSignature, Data, SignError, Secp256k1Error};
use common_types::{PUBLIC_KEY_SIZE, SIGNATURE_SIZE};

use super::super::types::ShortChannelId;

/// Announcement of a funded channel between two nodes. Carries four
/// signatures over the unsigned remainder of the message: one per node
/// identity key and one per funding key, so that both channel parties
/// prove both who they are and that they control the funding output.
#[derive(Clone, Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct AnnouncementChannel {
    pub node_sig: (RawSignature, RawSignature),
    pub short_channel_id: ShortChannelId,
    pub bitcoin_sig: (RawSignature, RawSignature),
    pub node_id: (PublicKey, PublicKey),
    pub bitcoin_key: (PublicKey, PublicKey),
}

/// The unsigned portion of the announcement. Its canonical `BinarySD`
/// encoding is the exact byte sequence all four signatures commit to.
#[derive(Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Debug)]
pub struct AnnouncementChannelData {
    pub short_channel_id: ShortChannelId,
    pub node_id: (PublicKey, PublicKey),
    pub bitcoin_key: (PublicKey, PublicKey),
}

impl AnnouncementChannel {
    // fixed-size message, four signatures, the 8-byte channel id and
    // four compressed public keys
    pub const MAX_PAYLOAD_LENGTH: usize = 4 * SIGNATURE_SIZE + 8 + 4 * PUBLIC_KEY_SIZE;

    /// The unsigned portion of this announcement.
    pub fn data_to_sign(&self) -> AnnouncementChannelData {
        AnnouncementChannelData {
            short_channel_id: self.short_channel_id,
            node_id: self.node_id,
            bitcoin_key: self.bitcoin_key,
        }
    }

    /// Produce the fully signed announcement. The caller holds both
    /// node identity keys and both funding keys, which is only the case
    /// for announcements this node originates itself and for tests.
    pub fn sign<C>(
        data: AnnouncementChannelData,
        context: &Secp256k1<C>,
        node_keys: (&SecretKey, &SecretKey),
        bitcoin_keys: (&SecretKey, &SecretKey),
    ) -> Result<Self, SignError>
    where
        C: Signing,
    {
        let message = Data(data).double_hash()?;
        let sign = |key: &SecretKey| RawSignature::from(context.sign_ecdsa(&message, key.as_ref()));

        Ok(AnnouncementChannel {
            node_sig: (sign(node_keys.0), sign(node_keys.1)),
            short_channel_id: data.short_channel_id,
            bitcoin_sig: (sign(bitcoin_keys.0), sign(bitcoin_keys.1)),
            node_id: data.node_id,
            bitcoin_key: data.bitcoin_key,
        })
    }

    /// Check all four signatures against the double hash of the canonical
    /// bytes. Fails closed: the first signature that does not verify
    /// rejects the whole announcement.
    pub fn verify<C>(&self, context: &Secp256k1<C>) -> Result<(), SignError>
    where
        C: Verification,
    {
        let message = Data(self.data_to_sign()).double_hash()?;

        let pairs = [
            (&self.node_sig.0, &self.node_id.0),
            (&self.node_sig.1, &self.node_id.1),
            (&self.bitcoin_sig.0, &self.bitcoin_key.0),
            (&self.bitcoin_sig.1, &self.bitcoin_key.1),
        ];
        for &(signature, public_key) in pairs.iter() {
            context
                .verify_ecdsa(&message, signature.as_ref(), public_key.as_ref())
                .map_err(|e| match e {
                    Secp256k1Error::IncorrectSignature => SignError::IncorrectSignature,
                    e => SignError::Crypto(e),
                })?;
        }

        Ok(())
    }
}
