//! Attribution model library
//!
//! Pure, deterministic credit-distribution functions. Each model consumes a
//! chronological touch sequence (oldest first, already restricted to touches
//! at or before the conversion) and yields one weight per touch, summing to
//! 1.0 whenever at least one touch qualifies.
//!
//! No storage access and no side effects here; calling twice with the same
//! input yields bit-identical output.

use chrono::{DateTime, Utc};

use super::{AttributionModel, Touch};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Credit fraction assigned to one touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchWeight {
    pub touch_id: i64,
    pub weight: f64,
}

/// Distribute conversion credit over `touches` according to `model`.
///
/// `touches` must be ordered ascending by (occurred_at, id); the calculator
/// guarantees this. `half_life_days` only affects `TimeDecay`.
///
/// Zero-weight touches are still emitted so every qualifying touch has a
/// result row. An empty slice yields an empty vector, not an error.
pub fn distribute(
    model: AttributionModel,
    touches: &[Touch],
    conversion_at: DateTime<Utc>,
    half_life_days: f64,
) -> Vec<TouchWeight> {
    if touches.is_empty() {
        return Vec::new();
    }
    if touches.len() == 1 {
        // Every model gives a lone touch full credit
        return vec![TouchWeight {
            touch_id: touches[0].id,
            weight: 1.0,
        }];
    }

    match model {
        AttributionModel::FirstTouch => single_winner(touches, 0),
        AttributionModel::LastTouch => single_winner(touches, touches.len() - 1),
        AttributionModel::Linear => linear(touches),
        AttributionModel::TimeDecay => time_decay(touches, conversion_at, half_life_days),
        AttributionModel::PositionBased => position_based(touches),
    }
}

/// Weight 1.0 to the touch at `winner`, 0 to all others
fn single_winner(touches: &[Touch], winner: usize) -> Vec<TouchWeight> {
    touches
        .iter()
        .enumerate()
        .map(|(i, t)| TouchWeight {
            touch_id: t.id,
            weight: if i == winner { 1.0 } else { 0.0 },
        })
        .collect()
}

/// Equal weight 1/N to each touch
fn linear(touches: &[Touch]) -> Vec<TouchWeight> {
    let share = 1.0 / touches.len() as f64;
    touches
        .iter()
        .map(|t| TouchWeight {
            touch_id: t.id,
            weight: share,
        })
        .collect()
}

/// Weight proportional to 2^(-age_days / half_life), normalized to sum 1.
///
/// Ages are taken relative to the newest touch, so the newest touch always
/// has a raw weight of exactly 1.0 and the normalizing total can never
/// underflow to zero, no matter how far the sequence lies in the past.
/// The shift cancels out under normalization.
fn time_decay(
    touches: &[Touch],
    conversion_at: DateTime<Utc>,
    half_life_days: f64,
) -> Vec<TouchWeight> {
    let newest = touches
        .iter()
        .map(|t| t.occurred_at)
        .max()
        .unwrap_or(conversion_at);
    let raw: Vec<f64> = touches
        .iter()
        .map(|t| {
            let age_days = (newest - t.occurred_at).num_seconds() as f64 / SECONDS_PER_DAY;
            (-age_days / half_life_days).exp2()
        })
        .collect();
    let total: f64 = raw.iter().sum();

    touches
        .iter()
        .zip(raw)
        .map(|(t, w)| TouchWeight {
            touch_id: t.id,
            weight: w / total,
        })
        .collect()
}

/// U-shaped: 40% first, 40% last, remaining 20% split across the middle.
/// Two touches degrade to 50/50; the single-touch case is handled upstream.
fn position_based(touches: &[Touch]) -> Vec<TouchWeight> {
    let n = touches.len();
    if n == 2 {
        return touches
            .iter()
            .map(|t| TouchWeight {
                touch_id: t.id,
                weight: 0.5,
            })
            .collect();
    }

    let middle_share = 0.2 / (n - 2) as f64;
    touches
        .iter()
        .enumerate()
        .map(|(i, t)| TouchWeight {
            touch_id: t.id,
            weight: if i == 0 || i == n - 1 {
                0.4
            } else {
                middle_share
            },
        })
        .collect()
}
