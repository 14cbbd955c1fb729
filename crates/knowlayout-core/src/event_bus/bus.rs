//! Event Bus implementation.

use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::events::{AppEvent, EventCategory};

/// Subscription handle for unsubscribing from events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sub({})", &self.0.simple().to_string()[..8])
    }
}

/// Filter to receive only specific event types
#[derive(Debug, Clone, Default)]
pub enum EventFilter {
    /// Receive all events.
    #[default]
    All,
    /// Receive events matching any of these categories.
    Categories(Vec<EventCategory>),
}

impl EventFilter {
    pub fn matches(&self, event: &AppEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Categories(categories) => categories.contains(&event.category()),
        }
    }
}

type EventHandler = Arc<dyn Fn(AppEvent) + Send + Sync>;

/// Configuration for the event bus
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// Channel capacity for broadcast.
    pub channel_capacity: usize,
    /// Maximum number of events kept for [`EventBus::history`]; zero disables history.
    pub history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 256,
            history_size: 0,
        }
    }
}

/// Central event bus for application-wide event distribution
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    handlers: RwLock<HashMap<SubscriptionId, (EventFilter, EventHandler)>>,
    history: RwLock<VecDeque<AppEvent>>,
    config: EventBusConfig,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));
        Self {
            sender,
            handlers: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
            config,
        }
    }

    /// Publish an event to all subscribers
    ///
    /// Synchronous handlers run on the publishing thread. Returns the number
    /// of handlers and async receivers that saw the event; an event nobody
    /// listens to is logged and dropped.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::debug!("{}", event.description());
        self.add_to_history(&event);

        // Handlers are cloned out so one may subscribe or publish re-entrantly.
        let handlers: Vec<EventHandler> = self
            .handlers
            .read()
            .values()
            .filter(|(filter, _)| filter.matches(&event))
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in &handlers {
            handler(event.clone());
        }

        let receivers = self.sender.send(event).unwrap_or(0);
        handlers.len() + receivers
    }

    /// Subscribe to events with a synchronous handler
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> SubscriptionId
    where
        F: Fn(AppEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId::new();
        self.handlers.write().insert(id, (filter, Arc::new(handler)));
        tracing::debug!("Subscription {} added", id);
        id
    }

    /// Get a receiver for async event polling
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Returns true if the subscription was found and removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed = self.handlers.write().remove(&id).is_some();
        if removed {
            tracing::debug!("Subscription {} removed", id);
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Recent events, oldest first
    pub fn history(&self) -> Vec<AppEvent> {
        self.history.read().iter().cloned().collect()
    }

    pub fn config(&self) -> &EventBusConfig {
        &self.config
    }

    fn add_to_history(&self, event: &AppEvent) {
        if self.config.history_size == 0 {
            return;
        }
        let mut history = self.history.write();
        history.push_back(event.clone());
        while history.len() > self.config.history_size {
            history.pop_front();
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::events::{LifecycleChange, StatusReport, WindowEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn saved(path: &str) -> AppEvent {
        AppEvent::Window(WindowEvent::Saved {
            path: path.to_string(),
        })
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(EventFilter::All, |_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert_eq!(bus.subscriber_count(), 0);
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn test_event_filtering() {
        let bus = EventBus::new();
        let window_count = Arc::new(AtomicUsize::new(0));
        let status_count = Arc::new(AtomicUsize::new(0));

        let wc = window_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Window]),
            move |_| {
                wc.fetch_add(1, Ordering::SeqCst);
            },
        );
        let sc = status_count.clone();
        bus.subscribe(
            EventFilter::Categories(vec![EventCategory::Status]),
            move |_| {
                sc.fetch_add(1, Ordering::SeqCst);
            },
        );

        assert_eq!(bus.publish(saved("/windows/w-1")), 1);
        bus.publish(AppEvent::Status(StatusReport::now("ready")));
        bus.publish(AppEvent::Lifecycle(LifecycleChange {
            from: "Starting".into(),
            to: "SelectDataSource".into(),
        }));

        assert_eq!(window_count.load(Ordering::SeqCst), 1);
        assert_eq!(status_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_publish_without_listeners_is_dropped() {
        let bus = EventBus::new();
        assert_eq!(bus.publish(saved("/w")), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let bus = EventBus::with_config(EventBusConfig {
            history_size: 2,
            ..Default::default()
        });
        for i in 0..5 {
            bus.publish(saved(&format!("/w-{i}")));
        }
        let history = bus.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1], saved("/w-4"));
    }

    #[tokio::test]
    async fn test_async_receiver() {
        let bus = EventBus::new();
        let mut rx = bus.receiver();
        bus.publish(saved("/windows/w-1"));
        let event = rx.recv().await.expect("event delivered");
        assert_eq!(event.category(), EventCategory::Window);
    }
}
