//! Synchronous message bus implementation over `std::sync::mpsc`.

use super::events::EventType;
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors that can occur within the message bus
#[derive(Error, Debug)]
pub enum MessageBusError {
    /// Failed to deliver a message to one or more subscribers
    #[error("Failed to send message: {reason}")]
    SendFailed { reason: String },
}

/// Result type for message bus operations
pub type MessageBusResult<T> = Result<T, MessageBusError>;

/// Consumer handle for receiving events of a specific type
pub struct Consumer<T: EventType> {
    receiver: Receiver<T>,
}

impl<T: EventType> Consumer<T> {
    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<T, mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive an event, blocking until one is available
    pub fn recv(&mut self) -> Result<T, mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Receive an event with a timeout
    pub fn recv_timeout(&mut self, timeout: std::time::Duration) -> Result<T, mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }
}

/// Internal registry of subscribers, keyed by event type id.
///
/// Senders are type-erased so one map can hold channels for every event
/// type; each lookup downcasts back to the concrete `Sender<T>`.
struct SubscriberRegistry {
    subscribers: HashMap<String, Vec<Box<dyn std::any::Any + Send>>>,
}

impl SubscriberRegistry {
    fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    fn add_subscriber<T: EventType>(&mut self, sender: Sender<T>) {
        self.subscribers
            .entry(T::type_id().to_string())
            .or_default()
            .push(Box::new(sender));
    }

    fn get_subscribers<T: EventType>(&self) -> Vec<&Sender<T>> {
        self.subscribers
            .get(T::type_id())
            .map(|senders| {
                senders
                    .iter()
                    .filter_map(|boxed| boxed.downcast_ref::<Sender<T>>())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Typed pub/sub message bus shared by the stores and ingestion handlers
pub struct MessageBus {
    registry: Arc<Mutex<SubscriberRegistry>>,
}

impl MessageBus {
    /// Create a new message bus instance
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(SubscriberRegistry::new())),
        }
    }

    /// Subscribe to events of a specific type.
    /// Returns a Consumer that receives every event published after this call.
    pub fn subscribe<T: EventType>(&self) -> Consumer<T> {
        let (sender, receiver) = mpsc::channel();

        let mut registry = self.registry.lock().unwrap();
        registry.add_subscriber(sender);

        Consumer { receiver }
    }

    /// Publish an event to all subscribers of that event type.
    ///
    /// Publishing with zero subscribers is a successful no-op; the sink side
    /// of the bus is fire-and-forget.
    pub fn publish<T: EventType>(&self, event: T) -> MessageBusResult<()> {
        let registry = self.registry.lock().unwrap();
        let subscribers = registry.get_subscribers::<T>();

        if subscribers.is_empty() {
            return Ok(());
        }

        let total = subscribers.len();
        let mut failed = 0;
        for subscriber in subscribers {
            if subscriber.send(event.clone()).is_err() {
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(MessageBusError::SendFailed {
                reason: format!("{} of {} subscribers failed to receive event", failed, total),
            });
        }

        Ok(())
    }

    /// Get the number of subscribers for a given event type
    pub fn subscriber_count<T: EventType>(&self) -> usize {
        let registry = self.registry.lock().unwrap();
        registry.get_subscribers::<T>().len()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
