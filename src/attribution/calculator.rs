//! Attribution calculator
//!
//! Orchestrates between the stores and the model library; the only
//! component permitted to read or write attribution result state.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::attribution::{
    model, report, AttributionModel, AttributionResult, Channel, Conversion, DateRange, Report,
    Touch,
};
use crate::errors::{PeanutError, Result};
use crate::storage::{AttributionResultStore, ConversionStore, TouchStore};

use strum::IntoEnumIterator;

pub struct AttributionCalculator {
    touches: Arc<dyn TouchStore>,
    conversions: Arc<dyn ConversionStore>,
    results: Arc<dyn AttributionResultStore>,
    half_life_days: f64,
}

impl AttributionCalculator {
    pub fn new(
        touches: Arc<dyn TouchStore>,
        conversions: Arc<dyn ConversionStore>,
        results: Arc<dyn AttributionResultStore>,
        half_life_days: f64,
    ) -> Self {
        Self {
            touches,
            conversions,
            results,
            half_life_days,
        }
    }

    /// Compute and persist attribution for one (conversion, model) pair.
    ///
    /// Replaces any stale cached rows for the exact pair; this is the only
    /// mutation path in the engine. Recomputation with unchanged inputs is
    /// idempotent. Zero qualifying touches produce zero rows, not an error.
    pub async fn calculate_for_conversion(
        &self,
        conversion_id: i64,
        attr_model: AttributionModel,
    ) -> Result<Vec<AttributionResult>> {
        let conversion = self
            .conversions
            .get(conversion_id)
            .await?
            .ok_or_else(|| {
                PeanutError::conversion_not_found(format!(
                    "Conversion {} does not exist",
                    conversion_id
                ))
            })?;

        let touches = self
            .touches
            .get_visitor_touches(&conversion.visitor_id, Some(conversion.occurred_at))
            .await?;

        let rows = self.build_rows(&conversion, attr_model, &touches);
        self.results
            .replace(conversion_id, attr_model, rows.clone())
            .await?;

        debug!(
            "Attribution: conversion {} model {} -> {} rows over {} touches",
            conversion_id,
            attr_model,
            rows.len(),
            touches.len()
        );

        Ok(rows)
    }

    fn build_rows(
        &self,
        conversion: &Conversion,
        attr_model: AttributionModel,
        touches: &[Touch],
    ) -> Vec<AttributionResult> {
        model::distribute(
            attr_model,
            touches,
            conversion.occurred_at,
            self.half_life_days,
        )
        .into_iter()
        .map(|tw| AttributionResult {
            conversion_id: conversion.id,
            model: attr_model,
            touch_id: tw.touch_id,
            weight: tw.weight,
            credited_value: conversion.value.map(|v| v * tw.weight),
        })
        .collect()
    }

    /// Stored rows for the pair, computing lazily when none exist yet.
    ///
    /// Stale rows are served as-is; recomputation only happens through an
    /// explicit `calculate_for_conversion` call.
    pub async fn ensure_results(
        &self,
        conversion_id: i64,
        attr_model: AttributionModel,
    ) -> Result<Vec<AttributionResult>> {
        let cached = self.results.get(conversion_id, attr_model).await?;
        if !cached.is_empty() {
            return Ok(cached);
        }
        self.calculate_for_conversion(conversion_id, attr_model).await
    }

    /// Channel report for one model over an inclusive date range.
    ///
    /// Conversions are processed in id order so the output is deterministic
    /// regardless of how results were computed before this call.
    pub async fn get_report(
        &self,
        attr_model: AttributionModel,
        range: DateRange,
    ) -> Result<Report> {
        let conversions = self.conversions.list_in_range(&range).await?;
        info!(
            "Attribution: building {} report over {} conversions",
            attr_model,
            conversions.len()
        );

        let mut joined: Vec<(AttributionResult, Channel)> = Vec::new();
        let mut attributed = 0u64;
        let mut unattributed = 0u64;

        for conversion in &conversions {
            let rows = self.ensure_results(conversion.id, attr_model).await?;
            if rows.is_empty() {
                unattributed += 1;
                continue;
            }
            attributed += 1;
            for row in rows {
                let touch = self.touches.get_touch(row.touch_id).await?.ok_or_else(|| {
                    PeanutError::storage_operation(format!(
                        "Touch {} referenced by attribution result is missing",
                        row.touch_id
                    ))
                })?;
                joined.push((row, touch.channel));
            }
        }

        Ok(report::aggregate(
            attr_model,
            range,
            &joined,
            attributed,
            unattributed,
        ))
    }

    /// Reports for all five models over the same range, keyed by model
    pub async fn compare_models(
        &self,
        range: DateRange,
    ) -> Result<BTreeMap<AttributionModel, Report>> {
        let mut reports = BTreeMap::new();
        for attr_model in AttributionModel::iter() {
            let report = self.get_report(attr_model, range).await?;
            reports.insert(attr_model, report);
        }
        Ok(reports)
    }
}
