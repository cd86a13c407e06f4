use serde_derive::{Serialize, Deserialize};

use binformat::{BinarySD, WireError};
use common_types::{Hash256, double_sha256};

use crate::ChannelPoint;

#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct TxIn {
    pub previous_output: ChannelPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

#[derive(Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct TxOut {
    pub value: u64,
    pub pk_script: Vec<u8>,
}

#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Identifier of the transaction, the double-SHA256 of its
    /// canonical encoding.
    pub fn txid(&self) -> Result<Hash256, WireError> {
        let mut bytes = Vec::new();
        BinarySD::serialize(&mut bytes, self)?;
        Ok(double_sha256(bytes.as_slice()))
    }
}

#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block: Hash256,
    pub merkle_root: Hash256,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

#[derive(Default, Serialize, Deserialize, Eq, PartialEq, Debug, Clone)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    /// The block is addressed by the hash of its header only.
    pub fn block_hash(&self) -> Result<Hash256, WireError> {
        let mut bytes = Vec::new();
        BinarySD::serialize(&mut bytes, &self.header)?;
        Ok(double_sha256(bytes.as_slice()))
    }
}
