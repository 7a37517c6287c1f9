//! In-process event bus
//!
//! Explicit producer/consumer seam between the ingestion surface and
//! downstream modules: the tracking endpoints publish `TouchRecorded` /
//! `ConversionRecorded`, consumers register handlers or subscribe to the
//! broadcast stream. The bus is dependency-injected through app state;
//! there is no global registry.
//!
//! Handler failures are logged and never propagated to the publisher.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{error, warn};

/// Kinds of events the suite emits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A visitor touch was appended to the log
    TouchRecorded,
    /// A conversion was recorded by an upstream producer
    ConversionRecorded,
    /// Extension point for consumers outside this crate
    Custom(String),
}

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event id
    pub id: String,
    pub event_type: EventType,
    pub timestamp: SystemTime,
    pub payload: EventPayload,
    /// Producing module, e.g. "api"
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    Touch {
        touch_id: i64,
        visitor_id: String,
        channel_key: String,
    },
    Conversion {
        conversion_id: i64,
        visitor_id: String,
        conversion_type: String,
        value: Option<f64>,
    },
    Custom(HashMap<String, String>),
}

#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &Event) -> anyhow::Result<()>;

    fn name(&self) -> &str;

    fn interested_events(&self) -> Vec<EventType>;
}

pub struct EventBus {
    handlers: Mutex<HashMap<EventType, Vec<Arc<dyn EventHandler>>>>,
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1000);
        Self {
            handlers: Mutex::new(HashMap::new()),
            sender,
        }
    }

    pub fn register_handler(&self, handler: Arc<dyn EventHandler>) {
        let mut handlers = self.handlers.lock();
        for event_type in handler.interested_events() {
            handlers.entry(event_type).or_default().push(handler.clone());
        }
    }

    /// Deliver to registered handlers and the broadcast stream.
    ///
    /// A send error only means nobody is subscribed to the stream.
    pub async fn publish(&self, event: Event) {
        if let Err(e) = self.sender.send(event.clone()) {
            warn!("No broadcast subscribers for event: {}", e);
        }

        // Snapshot the handler list so the lock is not held across awaits
        let interested: Vec<Arc<dyn EventHandler>> = {
            let handlers = self.handlers.lock();
            handlers
                .get(&event.event_type)
                .map(|v| v.to_vec())
                .unwrap_or_default()
        };

        for handler in interested {
            if let Err(e) = handler.handle(&event).await {
                error!("Event handler '{}' failed: {}", handler.name(), e);
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Event {
    fn build(event_type: EventType, payload: EventPayload, source: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_type,
            timestamp: SystemTime::now(),
            payload,
            source: source.to_string(),
        }
    }

    pub fn touch_recorded(touch_id: i64, visitor_id: &str, channel_key: &str, source: &str) -> Self {
        Self::build(
            EventType::TouchRecorded,
            EventPayload::Touch {
                touch_id,
                visitor_id: visitor_id.to_string(),
                channel_key: channel_key.to_string(),
            },
            source,
        )
    }

    pub fn conversion_recorded(
        conversion_id: i64,
        visitor_id: &str,
        conversion_type: &str,
        value: Option<f64>,
        source: &str,
    ) -> Self {
        Self::build(
            EventType::ConversionRecorded,
            EventPayload::Conversion {
                conversion_id,
                visitor_id: visitor_id.to_string(),
                conversion_type: conversion_type.to_string(),
                value,
            },
            source,
        )
    }
}
