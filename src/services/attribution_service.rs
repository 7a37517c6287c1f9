//! Attribution service layer
//!
//! Unified business logic over the attribution calculator, shared by the
//! HTTP API and tests: date-range parsing, model-name validation, report
//! caching and the ingestion write paths.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::attribution::{
    AttributionCalculator, AttributionModel, AttributionResult, Conversion, DateRange,
    NewConversion, NewTouch, Report, Touch,
};
use crate::cache::{self, ReportCache};
use crate::errors::{PeanutError, Result};
use crate::storage::{ConversionStore, TouchStore};
use crate::system::event::{Event, EventBus};

/// Conversion enriched with its touch history and attribution rows
#[derive(Debug, Clone, Serialize)]
pub struct ConversionDetail {
    pub conversion: Conversion,
    pub model: AttributionModel,
    pub touches: Vec<Touch>,
    pub attribution: Vec<AttributionResult>,
}

pub struct AttributionService {
    calculator: Arc<AttributionCalculator>,
    touches: Arc<dyn TouchStore>,
    conversions: Arc<dyn ConversionStore>,
    report_cache: Arc<dyn ReportCache>,
    event_bus: Arc<EventBus>,
    cache_ttl_secs: u64,
}

impl AttributionService {
    pub fn new(
        calculator: Arc<AttributionCalculator>,
        touches: Arc<dyn TouchStore>,
        conversions: Arc<dyn ConversionStore>,
        report_cache: Arc<dyn ReportCache>,
        event_bus: Arc<EventBus>,
        cache_ttl_secs: u64,
    ) -> Self {
        Self {
            calculator,
            touches,
            conversions,
            report_cache,
            event_bus,
            cache_ttl_secs,
        }
    }

    /// Parse a date range permissively, RFC3339 or YYYY-MM-DD.
    ///
    /// Missing or malformed bounds fall back to unbounded (all time),
    /// matching the optional-filter policy used across the suite.
    pub fn parse_date_range(date_from: Option<&str>, date_to: Option<&str>) -> DateRange {
        DateRange::new(
            date_from.and_then(Self::parse_date),
            date_to.and_then(Self::parse_date_end),
        )
    }

    /// Strict variant: malformed or inverted bounds return an error
    /// instead of silently widening the range.
    pub fn parse_date_range_strict(
        date_from: Option<&str>,
        date_to: Option<&str>,
    ) -> Result<DateRange> {
        let from = date_from
            .map(|s| {
                Self::parse_date(s).ok_or_else(|| {
                    PeanutError::date_parse(format!(
                        "Invalid start date format: '{}'. Supported formats: RFC3339 or YYYY-MM-DD",
                        s
                    ))
                })
            })
            .transpose()?;
        let to = date_to
            .map(|s| {
                Self::parse_date_end(s).ok_or_else(|| {
                    PeanutError::date_parse(format!(
                        "Invalid end date format: '{}'. Supported formats: RFC3339 or YYYY-MM-DD",
                        s
                    ))
                })
            })
            .transpose()?;
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(PeanutError::validation(
                    "Start date must not be later than end date",
                ));
            }
        }
        Ok(DateRange::new(from, to))
    }

    fn parse_date(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|dt| dt.and_utc())
            })
    }

    /// Bare dates on the end bound cover the whole day (range is inclusive)
    fn parse_date_end(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|| {
                chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(23, 59, 59))
                    .map(|dt| dt.and_utc())
            })
    }

    /// Resolve a model name; unknown names surface `InvalidModel`
    pub fn parse_model(name: &str) -> Result<AttributionModel> {
        name.parse::<AttributionModel>().map_err(|_| {
            PeanutError::invalid_model(format!(
                "Unknown attribution model '{}'. Supported: first_touch, last_touch, linear, time_decay, position_based",
                name
            ))
        })
    }

    fn report_cache_key(model: AttributionModel, range: &DateRange) -> String {
        let bound = |b: Option<DateTime<Utc>>| {
            b.map(|at| at.to_rfc3339()).unwrap_or_else(|| "*".to_string())
        };
        format!("report:{}:{}:{}", model, bound(range.from), bound(range.to))
    }

    /// Channel report for one model, served from cache when fresh
    pub async fn get_report(&self, model_name: &str, range: DateRange) -> Result<Report> {
        let model = Self::parse_model(model_name)?;
        info!(
            "Attribution: get_report model={} from {:?} to {:?}",
            model, range.from, range.to
        );

        let key = Self::report_cache_key(model, &range);
        let report = cache::get_or_compute(
            self.report_cache.as_ref(),
            &key,
            Some(self.cache_ttl_secs),
            || self.calculator.get_report(model, range),
        )
        .await?;

        debug!(
            "Attribution: get_report returned {} channels, {} attributed conversions",
            report.channels.len(),
            report.attributed_conversions
        );
        Ok(report)
    }

    /// Side-by-side reports for all five models over the same range.
    ///
    /// Composed from per-model cached reports, so a following single-model
    /// request hits the same cache entries.
    pub async fn compare_models(&self, range: DateRange) -> Result<BTreeMap<AttributionModel, Report>> {
        info!(
            "Attribution: compare_models from {:?} to {:?}",
            range.from, range.to
        );

        let mut reports = BTreeMap::new();
        for model in AttributionModel::iter() {
            let report = self.get_report(&model.to_string(), range).await?;
            reports.insert(model, report);
        }
        Ok(reports)
    }

    /// Conversion enriched with touches and lazily computed attribution
    pub async fn get_conversion_detail(
        &self,
        conversion_id: i64,
        model_name: &str,
    ) -> Result<ConversionDetail> {
        let model = Self::parse_model(model_name)?;
        let conversion = self.conversions.get(conversion_id).await?.ok_or_else(|| {
            PeanutError::conversion_not_found(format!(
                "Conversion {} does not exist",
                conversion_id
            ))
        })?;

        let touches = self
            .touches
            .get_visitor_touches(&conversion.visitor_id, Some(conversion.occurred_at))
            .await?;
        let attribution = self.calculator.ensure_results(conversion_id, model).await?;

        debug!(
            "Attribution: conversion {} detail with {} touches, {} result rows",
            conversion_id,
            touches.len(),
            attribution.len()
        );

        Ok(ConversionDetail {
            conversion,
            model,
            touches,
            attribution,
        })
    }

    /// Force recomputation for one (conversion, model) pair
    pub async fn recalculate(
        &self,
        conversion_id: i64,
        model_name: &str,
    ) -> Result<Vec<AttributionResult>> {
        let model = Self::parse_model(model_name)?;
        self.calculator
            .calculate_for_conversion(conversion_id, model)
            .await
    }

    /// Append a touch and publish `TouchRecorded`
    pub async fn record_touch(&self, touch: NewTouch) -> Result<Touch> {
        if touch.visitor_id.is_empty() {
            return Err(PeanutError::validation("visitor_id must not be empty"));
        }
        let stored = self.touches.record_touch(touch).await?;
        self.event_bus
            .publish(Event::touch_recorded(
                stored.id,
                &stored.visitor_id,
                &stored.channel.key(),
                "api",
            ))
            .await;
        Ok(stored)
    }

    /// Record a conversion and publish `ConversionRecorded`
    pub async fn record_conversion(&self, conversion: NewConversion) -> Result<Conversion> {
        if conversion.visitor_id.is_empty() {
            return Err(PeanutError::validation("visitor_id must not be empty"));
        }
        if conversion.conversion_type.is_empty() {
            return Err(PeanutError::validation("conversion_type must not be empty"));
        }
        let stored = self.conversions.record_conversion(conversion).await?;
        self.event_bus
            .publish(Event::conversion_recorded(
                stored.id,
                &stored.visitor_id,
                &stored.conversion_type,
                stored.value,
                "api",
            ))
            .await;
        info!(
            "Attribution: recorded conversion {} ({}) for visitor {}",
            stored.id, stored.conversion_type, stored.visitor_id
        );
        Ok(stored)
    }
}
