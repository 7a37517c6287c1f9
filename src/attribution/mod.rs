//! Multi-touch attribution engine
//!
//! Storage-agnostic computation core:
//! - `model`: pure credit-distribution functions for the five models
//! - `calculator`: orchestration between the stores and the model library
//! - `report`: per-channel roll-up of attribution results
//!
//! Touches and conversions are read-only inputs here; the persisted
//! attribution results are the only state the engine mutates.

pub mod calculator;
pub mod model;
pub mod report;

pub use calculator::AttributionCalculator;
pub use model::{distribute, TouchWeight};
pub use report::{ChannelStats, Report};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Attribution model selector
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttributionModel {
    /// All credit to the earliest touch
    FirstTouch,
    /// All credit to the touch immediately preceding the conversion
    LastTouch,
    /// Equal credit to every qualifying touch
    Linear,
    /// Credit halves for every `half_life_days` of distance to the conversion
    TimeDecay,
    /// U-shaped: 40% first, 40% last, 20% split across the middle
    PositionBased,
}

/// Marketing channel grouping key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Channel {
    /// Traffic source (utm_source)
    pub source: String,
    /// Delivery medium (utm_medium)
    pub medium: String,
    /// Campaign name (utm_campaign)
    pub campaign: String,
}

impl Channel {
    pub fn new(source: &str, medium: &str, campaign: &str) -> Self {
        Self {
            source: source.to_string(),
            medium: medium.to_string(),
            campaign: campaign.to_string(),
        }
    }

    /// Flat key for sorting and cache keys
    pub fn key(&self) -> String {
        format!("{}/{}/{}", self.source, self.medium, self.campaign)
    }
}

/// Raw UTM query parameters as captured on the landing request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtmParams {
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub utm_term: Option<String>,
    pub utm_content: Option<String>,
}

/// Kind of visitor interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TouchType {
    FirstVisit,
    PageView,
    Click,
}

/// A single visitor interaction with a marketing channel
///
/// Append-only: touches are never edited or deleted by the engine.
/// Ordered per visitor by `occurred_at`, ties broken by insertion id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Touch {
    /// Insertion id, assigned by the store
    pub id: i64,
    /// Opaque visitor identifier
    pub visitor_id: String,
    /// When the interaction happened
    pub occurred_at: DateTime<Utc>,
    /// Derived (source, medium, campaign) grouping key
    pub channel: Channel,
    /// Interaction kind
    pub touch_type: TouchType,
    /// Raw UTM fields as captured
    pub utm: UtmParams,
}

/// Touch as submitted by the tracking endpoint, before the store assigns an id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTouch {
    pub visitor_id: String,
    pub occurred_at: DateTime<Utc>,
    pub touch_type: TouchType,
    #[serde(default)]
    pub utm: UtmParams,
}

impl NewTouch {
    pub fn new(visitor_id: &str, touch_type: TouchType) -> Self {
        Self {
            visitor_id: visitor_id.to_string(),
            occurred_at: Utc::now(),
            touch_type,
            utm: UtmParams::default(),
        }
    }

    pub fn with_utm(mut self, utm: UtmParams) -> Self {
        self.utm = utm;
        self
    }

    /// Channel key derived from the UTM fields; absent fields map to "(none)"
    pub fn channel(&self) -> Channel {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "(none)".to_string());
        Channel {
            source: field(&self.utm.utm_source),
            medium: field(&self.utm.utm_medium),
            campaign: field(&self.utm.utm_campaign),
        }
    }
}

/// A goal-completion event tied to one visitor
///
/// Created once by an upstream event producer; never mutated by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    /// Insertion id, assigned by the store
    pub id: i64,
    /// Opaque visitor identifier
    pub visitor_id: String,
    /// Goal kind, e.g. "form_submission" or "purchase"
    pub conversion_type: String,
    /// Optional monetary amount
    pub value: Option<f64>,
    /// When the goal completed
    pub occurred_at: DateTime<Utc>,
}

/// Conversion as submitted by the ingestion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewConversion {
    pub visitor_id: String,
    pub conversion_type: String,
    #[serde(default)]
    pub value: Option<f64>,
    pub occurred_at: DateTime<Utc>,
}

/// Credit assignment for one (conversion, model, touch) triple
///
/// Derived and recomputable at any time from Touch + Conversion data;
/// cached in the result store, not authoritative state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionResult {
    pub conversion_id: i64,
    pub model: AttributionModel,
    pub touch_id: i64,
    /// Credit fraction in [0, 1]; sums to 1.0 across the conversion's touches
    pub weight: f64,
    /// weight x conversion value, when the conversion carries a value
    pub credited_value: Option<f64>,
}

/// Inclusive date range filter; a missing bound means unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Unbounded range (all time)
    pub fn all_time() -> Self {
        Self::default()
    }

    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        if let Some(from) = self.from {
            if at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if at > to {
                return false;
            }
        }
        true
    }
}
