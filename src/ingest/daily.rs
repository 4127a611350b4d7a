//! Normalization of sparse dated samples onto a contiguous daily grid.

use crate::github::TrafficSample;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Spread samples over every day from the earliest to the latest one observed.
///
/// Days with no sample get `T::default()`. When a day occurs more than once, the sample that
/// comes last wins. The result is in date order and empty only when the input is.
pub fn reindex_daily<T>(samples: impl IntoIterator<Item = (NaiveDate, T)>) -> Vec<(NaiveDate, T)>
where
    T: Copy + Default,
{
    let by_day: BTreeMap<NaiveDate, T> = samples.into_iter().collect();

    let (Some((&first, _)), Some((&last, _))) = (by_day.first_key_value(), by_day.last_key_value()) else {
        return Vec::new();
    };

    first
        .iter_days()
        .take_while(|day| *day <= last)
        .map(|day| (day, by_day.get(&day).copied().unwrap_or_default()))
        .collect()
}

/// Total and unique counts of a traffic response laid out on the daily grid
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTraffic {
    pub count: Vec<(NaiveDate, f64)>,
    pub uniques: Vec<(NaiveDate, f64)>,
}

impl DailyTraffic {
    #[must_use]
    pub fn from_samples(samples: &[TrafficSample]) -> Self {
        let grid = reindex_daily(samples.iter().map(|s| (s.timestamp, (s.count, s.uniques))));

        #[expect(clippy::cast_precision_loss, reason = "traffic counts stay far below 2^52")]
        let (count, uniques) = grid
            .into_iter()
            .map(|(day, (count, uniques))| ((day, count as f64), (day, uniques as f64)))
            .unzip();

        Self { count, uniques }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample(d: u32, count: u64, uniques: u64) -> TrafficSample {
        TrafficSample {
            timestamp: day(d),
            count,
            uniques,
        }
    }

    #[test]
    fn test_reindex_fills_gaps_with_zero() {
        let grid = reindex_daily([(day(1), 5_u64), (day(3), 2)]);
        assert_eq!(grid, vec![(day(1), 5), (day(2), 0), (day(3), 2)]);
    }

    #[test]
    fn test_reindex_empty_input() {
        assert!(reindex_daily(Vec::<(NaiveDate, u64)>::new()).is_empty());
    }

    #[test]
    fn test_reindex_single_sample() {
        assert_eq!(reindex_daily([(day(7), 4_u64)]), vec![(day(7), 4)]);
    }

    #[test]
    fn test_reindex_sorts_input() {
        let grid = reindex_daily([(day(4), 1_u64), (day(2), 3)]);
        assert_eq!(grid, vec![(day(2), 3), (day(3), 0), (day(4), 1)]);
    }

    #[test]
    fn test_reindex_last_duplicate_wins() {
        let grid = reindex_daily([(day(1), 1_u64), (day(2), 9), (day(1), 4)]);
        assert_eq!(grid, vec![(day(1), 4), (day(2), 9)]);
    }

    #[test]
    fn test_reindex_crosses_month_boundary() {
        let jan31 = day(31);
        let feb2 = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let grid = reindex_daily([(jan31, 1_u64), (feb2, 1)]);
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[1], (NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(), 0));
    }

    #[test]
    fn test_daily_traffic_splits_counts() {
        let traffic = DailyTraffic::from_samples(&[sample(1, 3, 1), sample(3, 2, 2)]);
        assert_eq!(traffic.count, vec![(day(1), 3.0), (day(2), 0.0), (day(3), 2.0)]);
        assert_eq!(traffic.uniques, vec![(day(1), 1.0), (day(2), 0.0), (day(3), 2.0)]);
    }

    #[test]
    fn test_daily_traffic_empty() {
        assert!(DailyTraffic::from_samples(&[]).is_empty());
    }
}
