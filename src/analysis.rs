//! Peak-hour window detection and weekly trend classification.

use crate::models::{
    DailyCount, HOURS_PER_DAY, HourlyDistribution, HourlyPoint, PeakWindow, TrendLabel,
    TrendResult,
};
use crate::stats::weekly_totals;

/// Orders per week.
const TREND_THRESHOLD: f64 = 0.5;

/// Finds the narrowest contiguous hour range holding at least `coverage_target`
/// of the day's orders. Among equally narrow ranges the one with the most
/// orders wins, then the earliest. Returns `None` when there are no orders.
pub fn find_peak_window(hourly: &HourlyDistribution, coverage_target: f64) -> Option<PeakWindow> {
    let total = hourly.total();
    if total == 0 {
        return None;
    }

    let target = total as f64 * coverage_target;
    let counts = hourly.counts();
    let mut best: Option<(usize, usize, u64)> = None;

    for width in 1..=HOURS_PER_DAY {
        for start in 0..=HOURS_PER_DAY - width {
            let end = start + width - 1;
            let sum: u64 = counts[start..=end].iter().sum();
            if (sum as f64) < target {
                continue;
            }
            match best {
                Some((_, _, best_sum)) if best_sum >= sum => {}
                _ => best = Some((start, end, sum)),
            }
        }
        if best.is_some() {
            break;
        }
    }

    let (start, end, sum) = best?;
    Some(PeakWindow {
        start_hour: start as u8,
        end_hour: end as u8,
        coverage_pct: 100.0 * sum as f64 / total as f64,
        total_orders: total,
    })
}

pub fn peak_hour(hourly: &HourlyDistribution) -> Option<HourlyPoint> {
    hourly
        .active_points()
        .into_iter()
        .fold(None, |best: Option<HourlyPoint>, point| match best {
            Some(b) if b.orders >= point.orders => Some(b),
            _ => Some(point),
        })
}

/// Expects one month of days; weeks are ordered by ISO week number.
pub fn classify_trend(daily: &[DailyCount]) -> Option<TrendResult> {
    let weeks = weekly_totals(daily);
    let first = weeks.first()?;
    let last = weeks.last()?;

    let peak = weeks
        .iter()
        .fold(first, |best, week| if week.orders > best.orders { week } else { best });

    let label = if weeks.len() < 2 {
        TrendLabel::Stable
    } else {
        let slope = (last.orders as f64 - first.orders as f64) / weeks.len() as f64;
        if slope > TREND_THRESHOLD {
            TrendLabel::Growth
        } else if slope < -TREND_THRESHOLD {
            TrendLabel::Decline
        } else {
            TrendLabel::Stable
        }
    };

    Some(TrendResult {
        peak_week: peak.week_number,
        peak_week_orders: peak.orders,
        label,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, NaiveDate};

    fn hours(pairs: &[(u32, u64)]) -> HourlyDistribution {
        HourlyDistribution::from_pairs(pairs.iter().copied())
    }

    /// One Monday per week starting 2025-03-03 (ISO week 10).
    fn weeks(totals: &[u64]) -> Vec<DailyCount> {
        let monday = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        totals
            .iter()
            .enumerate()
            .map(|(i, orders)| DailyCount {
                date: monday + Duration::weeks(i as i64),
                orders: *orders,
            })
            .collect()
    }

    fn width(window: &PeakWindow) -> u8 {
        window.end_hour - window.start_hour + 1
    }

    fn every_day(year: i32, month: u32, orders: impl Fn(u32) -> u64) -> Vec<DailyCount> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
        first
            .iter_days()
            .take_while(|date| date.month() == month)
            .map(|date| DailyCount {
                date,
                orders: orders(date.day()),
            })
            .collect()
    }

    fn window_sum(hourly: &HourlyDistribution, window: &PeakWindow) -> u64 {
        hourly.counts()[window.start_hour as usize..=window.end_hour as usize]
            .iter()
            .sum()
    }

    #[test]
    fn no_orders_means_no_window() {
        assert_eq!(find_peak_window(&HourlyDistribution::default(), 0.8), None);
        assert_eq!(find_peak_window(&hours(&[(3, 0), (4, 0)]), 0.5), None);
    }

    #[test]
    fn single_hour_covers_everything() {
        let hourly = hours(&[(19, 42)]);
        for target in [0.1, 0.5, 0.8, 1.0] {
            let window = find_peak_window(&hourly, target).unwrap();
            assert_eq!((window.start_hour, window.end_hour), (19, 19));
            assert_eq!(window.coverage_pct, 100.0);
            assert_eq!(window.total_orders, 42);
        }
    }

    #[test]
    fn lunch_rush_example() {
        let hourly = hours(&[(11, 5), (12, 20), (13, 15)]);
        let window = find_peak_window(&hourly, 0.8).unwrap();
        assert_eq!(
            window,
            PeakWindow {
                start_hour: 12,
                end_hour: 13,
                coverage_pct: 87.5,
                total_orders: 40,
            }
        );
    }

    #[test]
    fn equal_width_prefers_larger_sum() {
        // Target 5.85: no single hour qualifies, (1,2)=6 and (4,5)=9 both do.
        let hourly = hours(&[(1, 3), (2, 3), (4, 4), (5, 5)]);
        let window = find_peak_window(&hourly, 0.39).unwrap();
        assert_eq!((window.start_hour, window.end_hour), (4, 5));
    }

    #[test]
    fn equal_width_and_sum_prefers_earliest() {
        let hourly = hours(&[(2, 5), (20, 5)]);
        let window = find_peak_window(&hourly, 0.5).unwrap();
        assert_eq!((window.start_hour, window.end_hour), (2, 2));
        assert_eq!(window.coverage_pct, 50.0);
    }

    #[test]
    fn full_coverage_spans_first_to_last_active_hour() {
        let hourly = hours(&[(0, 1), (23, 1), (12, 10)]);
        let window = find_peak_window(&hourly, 1.0).unwrap();
        assert_eq!((window.start_hour, window.end_hour), (0, 23));
    }

    #[test]
    fn window_meets_target_and_is_minimal() {
        let hourly = hours(&[
            (7, 2),
            (8, 9),
            (11, 14),
            (12, 31),
            (13, 27),
            (14, 6),
            (18, 12),
            (19, 25),
            (20, 18),
            (21, 3),
        ]);
        let total = hourly.total() as f64;
        let mut last_width = 0;
        for step in 1..=20 {
            let target = step as f64 / 20.0;
            let window = find_peak_window(&hourly, target).unwrap();
            assert!(window_sum(&hourly, &window) as f64 >= target * total);
            assert!(width(&window) >= last_width, "width shrank at target {target}");
            last_width = width(&window);

            let narrower = width(&window) as usize - 1;
            if narrower > 0 {
                for start in 0..=HOURS_PER_DAY - narrower {
                    let sum: u64 = hourly.counts()[start..start + narrower].iter().sum();
                    assert!((sum as f64) < target * total);
                }
            }
        }
    }

    #[test]
    fn hours_out_of_range_are_ignored() {
        let hourly = hours(&[(24, 100), (5, 1)]);
        assert_eq!(hourly.total(), 1);
    }

    #[test]
    fn peak_hour_picks_first_maximum() {
        let hourly = hours(&[(9, 4), (13, 12), (20, 12)]);
        assert_eq!(
            peak_hour(&hourly),
            Some(HourlyPoint {
                hour: 13,
                orders: 12
            })
        );
        assert_eq!(peak_hour(&HourlyDistribution::default()), None);
    }

    #[test]
    fn empty_series_has_no_trend() {
        assert_eq!(classify_trend(&[]), None);
    }

    #[test]
    fn flat_weeks_are_stable() {
        let trend = classify_trend(&weeks(&[10, 10, 10, 10])).unwrap();
        assert_eq!(trend.label, TrendLabel::Stable);
        assert_eq!(trend.peak_week, 10);
        assert_eq!(trend.peak_week_orders, 10);
    }

    #[test]
    fn rising_weeks_grow() {
        let trend = classify_trend(&weeks(&[5, 6, 7, 20])).unwrap();
        assert_eq!(trend.label, TrendLabel::Growth);
        assert_eq!(trend.peak_week, 13);
        assert_eq!(trend.peak_week_orders, 20);
    }

    #[test]
    fn falling_weeks_decline() {
        let trend = classify_trend(&weeks(&[30, 12, 9, 4])).unwrap();
        assert_eq!(trend.label, TrendLabel::Decline);
        assert_eq!(trend.peak_week, 10);
    }

    #[test]
    fn slope_at_threshold_is_stable() {
        // (12 - 10) / 4 = 0.5, not above the threshold.
        let trend = classify_trend(&weeks(&[10, 40, 40, 12])).unwrap();
        assert_eq!(trend.label, TrendLabel::Stable);
        assert_eq!(trend.peak_week, 11);
    }

    #[test]
    fn single_week_is_stable() {
        let trend = classify_trend(&weeks(&[99])).unwrap();
        assert_eq!(trend.label, TrendLabel::Stable);
        assert_eq!(trend.peak_week_orders, 99);
    }

    #[test]
    fn december_tail_in_week_one_sorts_first() {
        // Dec 29-31 2025 fall in ISO week 1: [1: 30, 49..=52: 70], slope 8.
        let trend = classify_trend(&every_day(2025, 12, |_| 10)).unwrap();
        assert_eq!(trend.label, TrendLabel::Growth);
        assert_eq!(trend.peak_week, 49);
        assert_eq!(trend.peak_week_orders, 70);
    }

    #[test]
    fn january_head_in_week_53_sorts_last() {
        // Jan 1-3 2021 fall in ISO week 53: [1..=4: 70, 53: 150], slope 16.
        let daily = every_day(2021, 1, |day| if day <= 3 { 50 } else { 10 });
        let trend = classify_trend(&daily).unwrap();
        assert_eq!(trend.label, TrendLabel::Growth);
        assert_eq!(trend.peak_week, 53);
        assert_eq!(trend.peak_week_orders, 150);
    }

    #[test]
    fn analysis_is_repeatable() {
        let hourly = hours(&[(11, 5), (12, 20), (13, 15)]);
        assert_eq!(find_peak_window(&hourly, 0.8), find_peak_window(&hourly, 0.8));
        let daily = weeks(&[5, 6, 7, 20]);
        assert_eq!(classify_trend(&daily), classify_trend(&daily));
    }
}
