pub mod attribution_service;

pub use attribution_service::{AttributionService, ConversionDetail};
