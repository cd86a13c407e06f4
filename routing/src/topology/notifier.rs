use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::sync::mpsc::{channel, Receiver, Sender};

use log::debug;

use super::TopologyChange;

struct ClientRegistry {
    next_id: u64,
    senders: HashMap<u64, Sender<TopologyChange>>,
}

/// The single fan-out point for topology deltas. The registry holds only
/// the sender half of each delivery queue; the client owns the receiver.
/// Queues are unbounded, so publishing never blocks a producer and an
/// unready consumer cannot disturb delivery to the other subscribers.
pub(crate) struct TopologyNotifier {
    registry: Arc<Mutex<ClientRegistry>>,
}

impl TopologyNotifier {
    pub fn new() -> Self {
        TopologyNotifier {
            registry: Arc::new(Mutex::new(ClientRegistry {
                next_id: 0,
                senders: HashMap::new(),
            })),
        }
    }

    pub fn subscribe(&self) -> TopologyClient {
        let (sender, receiver) = channel();

        let mut registry = self.registry.lock().expect("poisoned registry lock");
        let client_id = registry.next_id;
        registry.next_id += 1;
        registry.senders.insert(client_id, sender);
        debug!("topology client {} subscribed", client_id);

        TopologyClient {
            topology_changes: receiver,
            client_id: client_id,
            registry: self.registry.clone(),
        }
    }

    /// Deliver the batch to every active subscriber, in subscriber-FIFO
    /// order relative to other `publish` calls. A subscriber whose
    /// receiver is gone is dropped from the registry on the way.
    pub fn publish(&self, change: TopologyChange) {
        let mut registry = self.registry.lock().expect("poisoned registry lock");
        registry
            .senders
            .retain(|_, sender| sender.send(change.clone()).is_ok());
    }

    /// Close every delivery queue; any blocked or future read on a
    /// subscriber observes end-of-stream.
    pub fn shutdown(&self) {
        let mut registry = self.registry.lock().expect("poisoned registry lock");
        registry.senders.clear();
        debug!("topology notifier shut down");
    }
}

/// Subscription handle. The client exclusively owns its delivery queue;
/// cancellation detaches it without touching any other subscription or
/// the graph itself.
pub struct TopologyClient {
    pub topology_changes: Receiver<TopologyChange>,
    client_id: u64,
    registry: Arc<Mutex<ClientRegistry>>,
}

impl TopologyClient {
    /// Active to Cancelled, the only transition there is. Safe to call
    /// concurrently with an in-flight publish: once the registration is
    /// gone no further delta reaches this queue, already queued deltas
    /// may still be drained, and the queue then reports disconnection.
    pub fn cancel(&self) {
        let mut registry = self.registry.lock().expect("poisoned registry lock");
        if registry.senders.remove(&self.client_id).is_some() {
            debug!("topology client {} cancelled", self.client_id);
        }
    }
}
