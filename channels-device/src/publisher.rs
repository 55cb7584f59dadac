//! Fan-out of attribute snapshots to the host's entities
//!
//! Two ways to consume updates:
//! - push: register an [`AttributeSink`], called synchronously on every publish
//! - pull: [`AttributePublisher::subscribe`] for a `tokio::sync::watch` receiver

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

use crate::attributes::PlaybackAttributes;

/// Consumer of attribute updates for one device, e.g. a media-player entity
pub trait AttributeSink: Send + Sync {
    fn update(&self, device_id: &str, attributes: &PlaybackAttributes);
}

impl<F> AttributeSink for F
where
    F: Fn(&str, &PlaybackAttributes) + Send + Sync,
{
    fn update(&self, device_id: &str, attributes: &PlaybackAttributes) {
        self(device_id, attributes)
    }
}

/// Pushes snapshots to every registered consumer
pub struct AttributePublisher {
    device_id: String,
    sinks: RwLock<Vec<Arc<dyn AttributeSink>>>,
    sender: watch::Sender<PlaybackAttributes>,
}

impl AttributePublisher {
    pub fn new(device_id: impl Into<String>, initial: PlaybackAttributes) -> Self {
        let (sender, _receiver) = watch::channel(initial);
        Self {
            device_id: device_id.into(),
            sinks: RwLock::new(Vec::new()),
            sender,
        }
    }

    pub fn register(&self, sink: Arc<dyn AttributeSink>) {
        self.sinks.write().push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.read().len()
    }

    /// Receiver that always holds the last published snapshot
    pub fn subscribe(&self) -> watch::Receiver<PlaybackAttributes> {
        self.sender.subscribe()
    }

    /// Push one snapshot to all sinks and watchers
    pub fn publish(&self, attributes: &PlaybackAttributes) {
        // Clone the list so a sink may register another sink without deadlocking
        let sinks: Vec<Arc<dyn AttributeSink>> = self.sinks.read().clone();
        for sink in &sinks {
            sink.update(&self.device_id, attributes);
        }

        // send_replace never fails, even with no receivers
        self.sender.send_replace(attributes.clone());
    }
}

impl std::fmt::Debug for AttributePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributePublisher")
            .field("device_id", &self.device_id)
            .field("sinks", &self.sink_count())
            .field("watchers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::PlayerState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_sinks_and_watchers() {
        let publisher = AttributePublisher::new("10_0_0_2", PlaybackAttributes::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        publisher.register(Arc::new(move |device_id: &str, attributes: &PlaybackAttributes| {
            assert_eq!(device_id, "10_0_0_2");
            assert_eq!(attributes.state, PlayerState::Paused);
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let mut receiver = publisher.subscribe();

        let attributes = PlaybackAttributes {
            state: PlayerState::Paused,
            ..Default::default()
        };
        publisher.publish(&attributes);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().state, PlayerState::Paused);
    }

    #[test]
    fn test_publish_without_consumers() {
        let publisher = AttributePublisher::new("dev", PlaybackAttributes::default());
        publisher.publish(&PlaybackAttributes::default());
        assert_eq!(publisher.sink_count(), 0);
    }
}
