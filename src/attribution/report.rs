//! Report aggregation
//!
//! Rolls a flat stream of attribution result rows (each joined with its
//! touch's channel) into per-channel totals.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{AttributionModel, AttributionResult, Channel, DateRange};

/// Per-channel roll-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStats {
    pub channel: Channel,
    /// Distinct conversions that routed weight > 0 to this channel
    pub conversions: u64,
    /// Sum of credited value over the channel's result rows
    pub credited_value: f64,
    /// Result rows attributed to this channel
    pub touches: u64,
}

/// Channel report for one model over one date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub model: AttributionModel,
    pub date_range: DateRange,
    /// Sorted by credited value descending, channel key ascending on ties
    pub channels: Vec<ChannelStats>,
    /// Conversions in range that had at least one qualifying touch
    pub attributed_conversions: u64,
    /// Conversions in range with no touch history
    pub unattributed_conversions: u64,
}

#[derive(Default)]
struct ChannelAccumulator {
    credited_value: f64,
    touches: u64,
    // Summed weight per conversion; a conversion counts once its total
    // weight for this channel exceeds zero, however small the fraction.
    conversion_weights: BTreeMap<i64, f64>,
}

/// Aggregate result rows into per-channel totals.
///
/// Input order does not affect the output: accumulation is keyed by channel
/// and the final sort is total. One conversion can contribute fractional
/// credit to several channels under the multi-touch models.
pub fn aggregate(
    model: AttributionModel,
    date_range: DateRange,
    rows: &[(AttributionResult, Channel)],
    attributed_conversions: u64,
    unattributed_conversions: u64,
) -> Report {
    let mut by_channel: BTreeMap<Channel, ChannelAccumulator> = BTreeMap::new();

    for (row, channel) in rows {
        let acc = by_channel.entry(channel.clone()).or_default();
        acc.credited_value += row.credited_value.unwrap_or(0.0);
        acc.touches += 1;
        *acc.conversion_weights.entry(row.conversion_id).or_insert(0.0) += row.weight;
    }

    let mut channels: Vec<ChannelStats> = by_channel
        .into_iter()
        .map(|(channel, acc)| ChannelStats {
            channel,
            conversions: acc
                .conversion_weights
                .values()
                .filter(|w| **w > 0.0)
                .count() as u64,
            credited_value: acc.credited_value,
            touches: acc.touches,
        })
        .collect();

    channels.sort_by(|a, b| {
        b.credited_value
            .total_cmp(&a.credited_value)
            .then_with(|| a.channel.key().cmp(&b.channel.key()))
    });

    Report {
        model,
        date_range,
        channels,
        attributed_conversions,
        unattributed_conversions,
    }
}

impl Report {
    /// Total credited value across all channels
    pub fn total_credited_value(&self) -> f64 {
        self.channels.iter().map(|c| c.credited_value).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        conversion_id: i64,
        touch_id: i64,
        weight: f64,
        credited: f64,
        channel: Channel,
    ) -> (AttributionResult, Channel) {
        (
            AttributionResult {
                conversion_id,
                model: AttributionModel::Linear,
                touch_id,
                weight,
                credited_value: Some(credited),
            },
            channel,
        )
    }

    #[test]
    fn test_fractional_credit_counts_distinct_conversions() {
        let email = Channel::new("newsletter", "email", "spring");
        let cpc = Channel::new("google", "cpc", "spring");

        // One conversion splits credit across two channels
        let rows = vec![
            row(1, 10, 0.5, 50.0, email.clone()),
            row(1, 11, 0.5, 50.0, cpc.clone()),
            row(2, 12, 1.0, 30.0, cpc.clone()),
        ];
        let report = aggregate(
            AttributionModel::Linear,
            DateRange::all_time(),
            &rows,
            2,
            0,
        );

        let cpc_stats = report
            .channels
            .iter()
            .find(|c| c.channel == cpc)
            .unwrap();
        assert_eq!(cpc_stats.conversions, 2);
        assert_eq!(cpc_stats.touches, 2);
        assert!((cpc_stats.credited_value - 80.0).abs() < 1e-9);

        let email_stats = report
            .channels
            .iter()
            .find(|c| c.channel == email)
            .unwrap();
        assert_eq!(email_stats.conversions, 1);
    }

    #[test]
    fn test_zero_weight_rows_do_not_count_as_conversions() {
        let organic = Channel::new("(none)", "(none)", "(none)");
        let rows = vec![row(1, 10, 0.0, 0.0, organic.clone())];
        let report = aggregate(
            AttributionModel::FirstTouch,
            DateRange::all_time(),
            &rows,
            1,
            0,
        );
        assert_eq!(report.channels[0].conversions, 0);
        assert_eq!(report.channels[0].touches, 1);
    }

    #[test]
    fn test_sort_by_value_then_channel_key() {
        let a = Channel::new("a", "m", "c");
        let b = Channel::new("b", "m", "c");
        let c = Channel::new("c", "m", "c");

        let rows = vec![
            row(1, 1, 1.0, 10.0, c.clone()),
            row(2, 2, 1.0, 10.0, a.clone()),
            row(3, 3, 1.0, 25.0, b.clone()),
        ];
        let report = aggregate(
            AttributionModel::LastTouch,
            DateRange::all_time(),
            &rows,
            3,
            0,
        );
        let keys: Vec<String> = report.channels.iter().map(|s| s.channel.key()).collect();
        assert_eq!(keys, vec!["b/m/c", "a/m/c", "c/m/c"]);
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let x = Channel::new("x", "m", "c");
        let y = Channel::new("y", "m", "c");
        let mut rows = vec![
            row(1, 1, 0.4, 12.0, x.clone()),
            row(1, 2, 0.6, 18.0, y.clone()),
            row(2, 3, 1.0, 7.0, x.clone()),
        ];
        let forward = aggregate(
            AttributionModel::Linear,
            DateRange::all_time(),
            &rows,
            2,
            0,
        );
        rows.reverse();
        let backward = aggregate(
            AttributionModel::Linear,
            DateRange::all_time(),
            &rows,
            2,
            0,
        );
        assert_eq!(
            serde_json::to_string(&forward.channels).unwrap(),
            serde_json::to_string(&backward.channels).unwrap()
        );
    }
}
