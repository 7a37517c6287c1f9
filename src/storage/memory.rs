//! In-memory store backend
//!
//! DashMap-backed implementation of all three store traits. Ids are
//! assigned from per-entity atomic counters, so insertion order is the
//! tie-breaker the touch ordering contract requires. `replace` swaps the
//! whole row vector for a key in one map insert, which satisfies the
//! atomic replace-all-for-key contract.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::attribution::{
    AttributionModel, AttributionResult, Conversion, DateRange, NewConversion, NewTouch, Touch,
};
use crate::errors::Result;
use crate::storage::{AttributionResultStore, ConversionStore, TouchStore};

#[derive(Default)]
pub struct MemoryStore {
    touches: DashMap<i64, Touch>,
    visitor_touches: DashMap<String, Vec<i64>>,
    conversions: DashMap<i64, Conversion>,
    results: DashMap<(i64, AttributionModel), Vec<AttributionResult>>,
    next_touch_id: AtomicI64,
    next_conversion_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_touch_id: AtomicI64::new(1),
            next_conversion_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    pub fn touch_count(&self) -> usize {
        self.touches.len()
    }

    pub fn conversion_count(&self) -> usize {
        self.conversions.len()
    }
}

#[async_trait]
impl TouchStore for MemoryStore {
    async fn record_touch(&self, touch: NewTouch) -> Result<Touch> {
        let id = self.next_touch_id.fetch_add(1, Ordering::SeqCst);
        let stored = Touch {
            id,
            visitor_id: touch.visitor_id.clone(),
            occurred_at: touch.occurred_at,
            channel: touch.channel(),
            touch_type: touch.touch_type,
            utm: touch.utm,
        };
        self.touches.insert(id, stored.clone());
        self.visitor_touches
            .entry(touch.visitor_id)
            .or_default()
            .push(id);
        debug!("MemoryStore: recorded touch {} for visitor {}", id, stored.visitor_id);
        Ok(stored)
    }

    async fn get_touch(&self, touch_id: i64) -> Result<Option<Touch>> {
        Ok(self.touches.get(&touch_id).map(|t| t.value().clone()))
    }

    async fn get_visitor_touches(
        &self,
        visitor_id: &str,
        before_or_at: Option<DateTime<Utc>>,
    ) -> Result<Vec<Touch>> {
        let ids = match self.visitor_touches.get(visitor_id) {
            Some(ids) => ids.value().clone(),
            None => return Ok(Vec::new()),
        };

        let mut touches: Vec<Touch> = ids
            .iter()
            .filter_map(|id| self.touches.get(id).map(|t| t.value().clone()))
            .filter(|t| before_or_at.is_none_or(|cutoff| t.occurred_at <= cutoff))
            .collect();
        touches.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at).then(a.id.cmp(&b.id)));
        Ok(touches)
    }
}

#[async_trait]
impl ConversionStore for MemoryStore {
    async fn record_conversion(&self, conversion: NewConversion) -> Result<Conversion> {
        let id = self.next_conversion_id.fetch_add(1, Ordering::SeqCst);
        let stored = Conversion {
            id,
            visitor_id: conversion.visitor_id,
            conversion_type: conversion.conversion_type,
            value: conversion.value,
            occurred_at: conversion.occurred_at,
        };
        self.conversions.insert(id, stored.clone());
        debug!(
            "MemoryStore: recorded conversion {} for visitor {}",
            id, stored.visitor_id
        );
        Ok(stored)
    }

    async fn get(&self, conversion_id: i64) -> Result<Option<Conversion>> {
        Ok(self.conversions.get(&conversion_id).map(|c| c.value().clone()))
    }

    async fn list_in_range(&self, range: &DateRange) -> Result<Vec<Conversion>> {
        let mut conversions: Vec<Conversion> = self
            .conversions
            .iter()
            .filter(|entry| range.contains(entry.occurred_at))
            .map(|entry| entry.value().clone())
            .collect();
        conversions.sort_by_key(|c| c.id);
        Ok(conversions)
    }
}

#[async_trait]
impl AttributionResultStore for MemoryStore {
    async fn replace(
        &self,
        conversion_id: i64,
        model: AttributionModel,
        results: Vec<AttributionResult>,
    ) -> Result<()> {
        self.results.insert((conversion_id, model), results);
        Ok(())
    }

    async fn get(
        &self,
        conversion_id: i64,
        model: AttributionModel,
    ) -> Result<Vec<AttributionResult>> {
        Ok(self
            .results
            .get(&(conversion_id, model))
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}
