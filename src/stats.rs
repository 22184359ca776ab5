use crate::models::{
    Coordinate, DailyCount, HeatMap, MonthPeriod, MonthSummary, MonthlyPoint, PeriodComparison,
    RestaurantMetrics, WeekdayCount, WeeklyTotal,
};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = next_month_start(first)?;
        Some(Self {
            year,
            month,
            start: first.and_hms_opt(0, 0, 0)?,
            end: next.and_hms_opt(0, 0, 0)? - Duration::seconds(1),
        })
    }

    pub fn containing(date: NaiveDate) -> Option<Self> {
        Self::new(date.year(), date.month())
    }

    pub fn previous(&self) -> Option<Self> {
        Self::containing(self.first_day() - Duration::days(1))
    }

    pub fn first_day(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end.date()
    }

    pub fn end_exclusive(&self) -> chrono::NaiveDateTime {
        self.end + Duration::seconds(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

fn next_month_start(first: NaiveDate) -> Option<NaiveDate> {
    if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_slice(daily: &[DailyCount], period: &MonthPeriod) -> Vec<DailyCount> {
    daily
        .iter()
        .filter(|day| period.contains(day.date))
        .copied()
        .collect()
}

/// Sums daily counts per ISO week number, ascending by week number. Within one
/// month the numbers never repeat, so a December tail in week 1 sorts first.
pub fn weekly_totals(daily: &[DailyCount]) -> Vec<WeeklyTotal> {
    let mut weeks: BTreeMap<u32, u64> = BTreeMap::new();
    for day in daily {
        let entry = weeks.entry(day.date.iso_week().week()).or_default();
        *entry = entry.saturating_add(day.orders);
    }

    weeks
        .into_iter()
        .map(|(week_number, orders)| WeeklyTotal {
            week_number,
            orders,
        })
        .collect()
}

/// Months without orders between the first and last active month count as zero.
pub fn monthly_totals(daily: &[DailyCount]) -> Vec<MonthlyPoint> {
    let mut months: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for day in daily {
        let entry = months.entry((day.date.year(), day.date.month())).or_default();
        *entry = entry.saturating_add(day.orders);
    }

    let (Some(&first), Some(&last)) = (months.keys().next(), months.keys().next_back()) else {
        return Vec::new();
    };

    let mut points = Vec::new();
    let mut previous: Option<u64> = None;
    let (mut year, mut month) = first;
    while (year, month) <= last {
        let orders = months.get(&(year, month)).copied().unwrap_or(0);
        points.push(MonthlyPoint {
            year,
            month,
            label: format!("{} {}", month_name(month), year),
            orders,
            variation_pct: previous.and_then(|prev| pct_change(orders as f64, prev as f64)),
        });
        previous = Some(orders);
        (year, month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    }

    points
}

pub fn weekday_distribution(metrics: &RestaurantMetrics) -> Vec<WeekdayCount> {
    let mut days: Vec<WeekdayCount> = WEEKDAYS
        .iter()
        .zip(metrics.weekday_orders.iter())
        .map(|(weekday, orders)| WeekdayCount {
            weekday: *weekday,
            orders: *orders,
        })
        .collect();
    days.sort_by(|a, b| b.orders.cmp(&a.orders));
    days
}

pub fn compare_periods(current: MonthSummary, previous: MonthSummary) -> PeriodComparison {
    let avg_per_day = average_per_day(&current);
    let previous_avg_per_day = average_per_day(&previous);

    PeriodComparison {
        current,
        previous,
        avg_per_day,
        previous_avg_per_day,
        orders_delta_pct: pct_change(current.orders as f64, previous.orders as f64),
        active_days_delta_pct: pct_change(current.active_days as f64, previous.active_days as f64),
        avg_per_day_delta_pct: pct_change(avg_per_day, previous_avg_per_day),
        credits_delta_pct: pct_change(current.credits, previous.credits),
    }
}

fn average_per_day(summary: &MonthSummary) -> f64 {
    if summary.active_days == 0 {
        0.0
    } else {
        summary.orders as f64 / summary.active_days as f64
    }
}

// None unless previous is positive.
pub fn pct_change(current: f64, previous: f64) -> Option<f64> {
    if previous > 0.0 {
        Some((current - previous) / previous * 100.0)
    } else {
        None
    }
}

/// Buckets coordinates into a `resolution` x `resolution` grid over their
/// bounding box. Non-finite coordinates are skipped.
pub fn heat_map(coords: &[Coordinate], resolution: usize) -> Option<HeatMap> {
    let resolution = resolution.max(1);
    let points: Vec<Coordinate> = coords
        .iter()
        .filter(|c| c.lat.is_finite() && c.lon.is_finite())
        .copied()
        .collect();
    if points.is_empty() {
        return None;
    }

    let mut south_west = points[0];
    let mut north_east = points[0];
    let (mut lat_sum, mut lon_sum) = (0.0, 0.0);
    for point in &points {
        south_west.lat = south_west.lat.min(point.lat);
        south_west.lon = south_west.lon.min(point.lon);
        north_east.lat = north_east.lat.max(point.lat);
        north_east.lon = north_east.lon.max(point.lon);
        lat_sum += point.lat;
        lon_sum += point.lon;
    }

    let lat_span = north_east.lat - south_west.lat;
    let lon_span = north_east.lon - south_west.lon;
    let mut cells = vec![0u64; resolution * resolution];
    for point in &points {
        let row = bucket(north_east.lat - point.lat, lat_span, resolution);
        let col = bucket(point.lon - south_west.lon, lon_span, resolution);
        cells[row * resolution + col] += 1;
    }

    let count = points.len() as f64;
    Some(HeatMap {
        center: Coordinate {
            lat: lat_sum / count,
            lon: lon_sum / count,
        },
        south_west,
        north_east,
        resolution,
        max_cell: cells.iter().copied().max().unwrap_or(0),
        cells,
        points: points.len(),
    })
}

fn bucket(offset: f64, span: f64, resolution: usize) -> usize {
    if span <= 0.0 {
        return 0;
    }
    let index = (offset / span * resolution as f64).floor() as usize;
    index.min(resolution - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32, orders: u64) -> DailyCount {
        DailyCount {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            orders,
        }
    }

    #[test]
    fn month_period_bounds() {
        let feb = MonthPeriod::new(2024, 2).unwrap();
        assert_eq!(feb.start.to_string(), "2024-02-01 00:00:00");
        assert_eq!(feb.end.to_string(), "2024-02-29 23:59:59");
        assert_eq!(feb.end_exclusive().to_string(), "2024-03-01 00:00:00");

        let dec = MonthPeriod::new(2025, 12).unwrap();
        assert_eq!(dec.end.to_string(), "2025-12-31 23:59:59");
        assert!(MonthPeriod::new(2025, 13).is_none());
        assert!(MonthPeriod::new(2025, 0).is_none());
    }

    #[test]
    fn previous_month_crosses_year() {
        let jan = MonthPeriod::new(2025, 1).unwrap();
        let prev = jan.previous().unwrap();
        assert_eq!((prev.year, prev.month), (2024, 12));
        assert_eq!(jan.label(), "January 2025");
    }

    #[test]
    fn weekly_totals_group_by_iso_week() {
        // 2025-03-02 is a Sunday (W09), 03-03 a Monday (W10).
        let daily = vec![day(2025, 3, 1, 2), day(2025, 3, 2, 3), day(2025, 3, 3, 7)];
        let weeks = weekly_totals(&daily);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_number, 9);
        assert_eq!(weeks[0].orders, 5);
        assert_eq!(weeks[1].week_number, 10);
        assert_eq!(weeks[1].orders, 7);
    }

    #[test]
    fn weekly_totals_sort_by_week_number() {
        // 2021-01-01 belongs to ISO week 53, 2025-12-29 to week 1.
        let january = vec![day(2021, 1, 1, 4), day(2021, 1, 4, 1)];
        let weeks: Vec<u32> = weekly_totals(&january).iter().map(|w| w.week_number).collect();
        assert_eq!(weeks, vec![1, 53]);

        let december = vec![day(2025, 12, 22, 4), day(2025, 12, 29, 1)];
        let weeks: Vec<u32> = weekly_totals(&december).iter().map(|w| w.week_number).collect();
        assert_eq!(weeks, vec![1, 52]);
    }

    #[test]
    fn monthly_totals_fill_gaps_and_skip_variation_after_zero() {
        let daily = vec![day(2025, 1, 10, 10), day(2025, 1, 11, 10), day(2025, 3, 5, 30)];
        let months = monthly_totals(&daily);
        assert_eq!(months.len(), 3);
        assert_eq!(months[0].orders, 20);
        assert_eq!(months[0].variation_pct, None);
        assert_eq!(months[1].label, "February 2025");
        assert_eq!(months[1].orders, 0);
        assert_eq!(months[1].variation_pct, Some(-100.0));
        assert_eq!(months[2].orders, 30);
        assert_eq!(months[2].variation_pct, None);
    }

    #[test]
    fn monthly_totals_empty() {
        assert!(monthly_totals(&[]).is_empty());
    }

    #[test]
    fn weekday_distribution_sorted_descending() {
        let metrics = RestaurantMetrics {
            id: 1,
            name: "Taqueria".into(),
            orders: 21,
            unique_clients: 4,
            avg_ticket: None,
            avg_delivery_minutes: None,
            avg_wait_minutes: None,
            card_payments: 0,
            cash_payments: 0,
            transfer_payments: 0,
            weekday_orders: [1, 2, 3, 0, 8, 5, 2],
        };
        let days = weekday_distribution(&metrics);
        assert_eq!(days[0].weekday, Weekday::Fri);
        assert_eq!(days[1].weekday, Weekday::Sat);
        // Tuesday and Sunday tie; Tuesday came first.
        assert_eq!(days[3].weekday, Weekday::Tue);
        assert_eq!(days[4].weekday, Weekday::Sun);
        assert_eq!(days[6].weekday, Weekday::Thu);
    }

    #[test]
    fn compare_periods_omits_deltas_without_baseline() {
        let current = MonthSummary {
            orders: 30,
            active_days: 10,
            credits: 12.0,
        };
        let comparison = compare_periods(current, MonthSummary::default());
        assert_eq!(comparison.avg_per_day, 3.0);
        assert_eq!(comparison.orders_delta_pct, None);
        assert_eq!(comparison.credits_delta_pct, None);

        let previous = MonthSummary {
            orders: 20,
            active_days: 10,
            credits: 0.0,
        };
        let comparison = compare_periods(current, previous);
        assert_eq!(comparison.orders_delta_pct, Some(50.0));
        assert_eq!(comparison.active_days_delta_pct, Some(0.0));
        assert_eq!(comparison.avg_per_day_delta_pct, Some(50.0));
        assert_eq!(comparison.credits_delta_pct, None);
    }

    #[test]
    fn heat_map_buckets_points() {
        let coords = vec![
            Coordinate { lat: 10.0, lon: -80.0 },
            Coordinate { lat: 10.0, lon: -80.0 },
            Coordinate { lat: 11.0, lon: -79.0 },
            Coordinate { lat: f64::NAN, lon: -79.5 },
        ];
        let map = heat_map(&coords, 4).unwrap();
        assert_eq!(map.points, 3);
        assert_eq!(map.cells.len(), 16);
        // South-west corner lands in the last row, first column.
        assert_eq!(map.cells[12], 2);
        // North-east corner lands in the first row, last column.
        assert_eq!(map.cells[3], 1);
        assert_eq!(map.max_cell, 2);
        assert!((map.center.lat - 31.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn heat_map_single_point_and_empty() {
        let map = heat_map(&[Coordinate { lat: 1.0, lon: 2.0 }], 8).unwrap();
        assert_eq!(map.cells[0], 1);
        assert!(heat_map(&[], 8).is_none());
    }
}
