//! In-process event bus
//!
//! Consumers register for a set of event kinds and are invoked, one after
//! another, on the task that publishes the event. The bus never spawns tasks
//! and keeps no per-event state.

use super::{Event, EventKind};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Receives the events it registered for
#[async_trait]
pub trait EventConsumer: Send + Sync {
    /// Unique name used for registration bookkeeping
    fn name(&self) -> &str;

    async fn event_received(&self, event: &Event);
}

struct Registration {
    consumer: Arc<dyn EventConsumer>,
    kinds: HashSet<EventKind>,
}

/// Registration table plus dispatch
#[derive(Default)]
pub struct EventBus {
    registrations: Vec<Registration>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `consumer` for `kinds`. Registering the same consumer name again
    /// widens its existing subscription instead of adding a duplicate.
    pub fn register_consumer(&mut self, consumer: Arc<dyn EventConsumer>, kinds: &[EventKind]) {
        if let Some(existing) = self
            .registrations
            .iter_mut()
            .find(|r| r.consumer.name() == consumer.name())
        {
            existing.kinds.extend(kinds.iter().copied());
            debug!(consumer = consumer.name(), "Extended consumer registration");
            return;
        }

        debug!(consumer = consumer.name(), ?kinds, "Registered consumer");
        self.registrations.push(Registration {
            consumer,
            kinds: kinds.iter().copied().collect(),
        });
    }

    /// Remove a consumer by name, returns false if it was not registered
    pub fn unregister_consumer(&mut self, name: &str) -> bool {
        let before = self.registrations.len();
        self.registrations.retain(|r| r.consumer.name() != name);
        let removed = self.registrations.len() != before;
        if removed {
            debug!(consumer = name, "Unregistered consumer");
        }
        removed
    }

    pub fn is_registered(&self, name: &str, kind: EventKind) -> bool {
        self.registrations
            .iter()
            .any(|r| r.consumer.name() == name && r.kinds.contains(&kind))
    }

    pub fn consumer_count(&self) -> usize {
        self.registrations.len()
    }

    /// Deliver `event` to every consumer registered for its kind.
    /// Returns how many consumers received it.
    pub async fn publish(&self, event: &Event) -> usize {
        let mut delivered = 0;
        for registration in self.registrations.iter().filter(|r| r.kinds.contains(&event.kind)) {
            registration.consumer.event_received(event).await;
            delivered += 1;
        }

        if delivered == 0 {
            warn!(event = %event.kind, "No consumer registered for event");
        }
        delivered
    }

    /// Publish everything arriving on `events` until all senders are dropped.
    /// Returns the number of events read from the channel.
    pub async fn run(&self, mut events: mpsc::Receiver<Event>) -> usize {
        let mut processed = 0;
        while let Some(event) = events.recv().await {
            self.publish(&event).await;
            processed += 1;
        }
        debug!(processed, "Event channel closed");
        processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: String,
        seen: Mutex<Vec<EventKind>>,
    }

    impl Recorder {
        fn new(name: &str) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<EventKind> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EventConsumer for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        async fn event_received(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind);
        }
    }

    #[tokio::test]
    async fn test_publish_only_reaches_subscribed_kinds() {
        let scans = Recorder::new("scans");
        let alerts = Recorder::new("alerts");

        let mut bus = EventBus::new();
        bus.register_consumer(scans.clone(), &[EventKind::ScanCompleted]);
        bus.register_consumer(alerts.clone(), &[EventKind::AlertAdded]);

        assert_eq!(bus.publish(&Event::scan_completed("1")).await, 1);
        assert_eq!(bus.publish(&Event::alert_added("9")).await, 1);

        assert_eq!(scans.seen(), vec![EventKind::ScanCompleted]);
        assert_eq!(alerts.seen(), vec![EventKind::AlertAdded]);
    }

    #[tokio::test]
    async fn test_register_twice_extends_kinds() {
        let recorder = Recorder::new("exporter");
        let mut bus = EventBus::new();
        bus.register_consumer(recorder.clone(), &[EventKind::ScanCompleted]);
        bus.register_consumer(recorder.clone(), &[EventKind::AlertAdded]);

        assert_eq!(bus.consumer_count(), 1);
        assert!(bus.is_registered("exporter", EventKind::ScanCompleted));
        assert!(bus.is_registered("exporter", EventKind::AlertAdded));
    }

    #[tokio::test]
    async fn test_unregister_stops_delivery() {
        let recorder = Recorder::new("exporter");
        let mut bus = EventBus::new();
        bus.register_consumer(recorder.clone(), &[EventKind::ScanCompleted]);

        assert!(bus.unregister_consumer("exporter"));
        assert!(!bus.unregister_consumer("exporter"));
        assert_eq!(bus.publish(&Event::scan_completed("1")).await, 0);
        assert!(recorder.seen().is_empty());
    }

    #[tokio::test]
    async fn test_run_drains_channel_in_order() {
        let recorder = Recorder::new("exporter");
        let mut bus = EventBus::new();
        bus.register_consumer(
            recorder.clone(),
            &[EventKind::ScanCompleted, EventKind::AlertAdded],
        );

        let (tx, rx) = mpsc::channel(4);
        tx.send(Event::scan_completed("1")).await.unwrap();
        tx.send(Event::alert_added("2")).await.unwrap();
        tx.send(Event::scan_completed("3")).await.unwrap();
        drop(tx);

        assert_eq!(bus.run(rx).await, 3);
        assert_eq!(
            recorder.seen(),
            vec![
                EventKind::ScanCompleted,
                EventKind::AlertAdded,
                EventKind::ScanCompleted
            ]
        );
    }
}
