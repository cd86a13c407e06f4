#![forbid(unsafe_code)]

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::Receiver;

use common_types::Hash256;
use bitcoin_types::{Block, ChannelPoint, TxOut};

/// A new block connected to the best chain. The backend is trusted to
/// deliver best-chain blocks only, in order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BlockEpoch {
    pub hash: Hash256,
    pub height: u32,
}

/// Callable handle detaching a registered subscription from its backend.
/// Safe to invoke any number of times.
#[derive(Clone)]
pub struct CancelHandle {
    inner: Arc<dyn Fn() + Send + Sync>,
}

impl CancelHandle {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        CancelHandle { inner: Arc::new(f) }
    }

    pub fn cancel(&self) {
        (self.inner)()
    }
}

/// An active block subscription: the stream of new best-chain blocks
/// plus the handle that tears the registration down. Once cancelled the
/// receiver drains whatever was queued and then reports disconnection.
pub struct BlockEpochEvent {
    pub epochs: Receiver<BlockEpoch>,
    cancel: CancelHandle,
}

impl BlockEpochEvent {
    pub fn new(epochs: Receiver<BlockEpoch>, cancel: CancelHandle) -> Self {
        BlockEpochEvent {
            epochs: epochs,
            cancel: cancel,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel()
    }

    pub fn into_parts(self) -> (Receiver<BlockEpoch>, CancelHandle) {
        (self.epochs, self.cancel)
    }
}

#[derive(Debug)]
pub enum ChainError {
    /// The requested entity is unknown to the backend, or the output is
    /// already spent.
    NotFound,
    Backend(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            &ChainError::NotFound => write!(f, "not found"),
            &ChainError::Backend(ref msg) => write!(f, "chain backend failure: {}", msg),
        }
    }
}

impl Error for ChainError {}

/// Read access to the settlement chain. Any conforming implementation,
/// real backend or test double, is interchangeable.
pub trait ChainIO {
    fn best_block(&self) -> Result<(Hash256, u32), ChainError>;

    fn block_hash(&self, height: u32) -> Result<Hash256, ChainError>;

    fn block_by_hash(&self, hash: &Hash256) -> Result<Block, ChainError>;

    /// The funding output, if it exists and is still unspent.
    fn utxo(&self, outpoint: &ChannelPoint) -> Result<TxOut, ChainError>;
}

impl<C> ChainIO for Arc<C>
where
    C: ChainIO + ?Sized,
{
    fn best_block(&self) -> Result<(Hash256, u32), ChainError> {
        (**self).best_block()
    }

    fn block_hash(&self, height: u32) -> Result<Hash256, ChainError> {
        (**self).block_hash(height)
    }

    fn block_by_hash(&self, hash: &Hash256) -> Result<Block, ChainError> {
        (**self).block_by_hash(hash)
    }

    fn utxo(&self, outpoint: &ChannelPoint) -> Result<TxOut, ChainError> {
        (**self).utxo(outpoint)
    }
}

/// Push-based chain event source.
pub trait ChainNotifier {
    fn register_block_epoch_ntfn(&self) -> Result<BlockEpochEvent, ChainError>;
}
