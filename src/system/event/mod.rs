mod events;

pub use events::{Event, EventBus, EventHandler, EventPayload, EventType};
