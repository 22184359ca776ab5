use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const HOURS_PER_DAY: usize = 24;

/// Order counts per hour of day, zero-filled for hours without orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HourlyDistribution {
    counts: [u64; HOURS_PER_DAY],
}

impl HourlyDistribution {
    /// Builds a distribution from `(hour, orders)` rows. Hours outside 0..=23
    /// are ignored and repeated hours accumulate.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, u64)>,
    {
        let mut counts = [0u64; HOURS_PER_DAY];
        for (hour, orders) in pairs {
            if let Some(slot) = counts.get_mut(hour as usize) {
                *slot = slot.saturating_add(orders);
            }
        }
        Self { counts }
    }

    pub fn counts(&self) -> &[u64; HOURS_PER_DAY] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Hours that actually saw orders, in hour order.
    pub fn active_points(&self) -> Vec<HourlyPoint> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, orders)| **orders > 0)
            .map(|(hour, orders)| HourlyPoint {
                hour: hour as u8,
                orders: *orders,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub hour: u8,
    pub orders: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub orders: u64,
}

/// Daily order counts, dates strictly increasing.
pub type DailySeries = Vec<DailyCount>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakWindow {
    pub start_hour: u8,
    pub end_hour: u8,
    pub coverage_pct: f64,
    pub total_orders: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Growth,
    Decline,
    Stable,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TrendLabel::Growth => "Growth",
            TrendLabel::Decline => "Decline",
            TrendLabel::Stable => "Stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendResult {
    pub peak_week: u32,
    pub peak_week_orders: u64,
    pub label: TrendLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeklyTotal {
    pub week_number: u32,
    pub orders: u64,
}

/// A calendar month, bounded by its first and last second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantMetrics {
    pub id: i64,
    pub name: String,
    pub orders: u64,
    pub unique_clients: u64,
    pub avg_ticket: Option<f64>,
    pub avg_delivery_minutes: Option<f64>,
    pub avg_wait_minutes: Option<f64>,
    pub card_payments: u64,
    pub cash_payments: u64,
    pub transfer_payments: u64,
    /// Monday through Sunday.
    pub weekday_orders: [u64; 7],
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthSummary {
    pub orders: u64,
    pub active_days: u64,
    pub credits: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodComparison {
    pub current: MonthSummary,
    pub previous: MonthSummary,
    pub avg_per_day: f64,
    pub previous_avg_per_day: f64,
    pub orders_delta_pct: Option<f64>,
    pub active_days_delta_pct: Option<f64>,
    pub avg_per_day_delta_pct: Option<f64>,
    pub credits_delta_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub year: i32,
    pub month: u32,
    pub label: String,
    pub orders: u64,
    pub variation_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdayCount {
    pub weekday: Weekday,
    pub orders: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Delivery density over the bounding box of a month's coordinates.
/// `cells` is row-major with row 0 at the northern edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMap {
    pub center: Coordinate,
    pub south_west: Coordinate,
    pub north_east: Coordinate,
    pub resolution: usize,
    pub cells: Vec<u64>,
    pub max_cell: u64,
    pub points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestaurantReport {
    pub period: MonthPeriod,
    pub restaurant: RestaurantMetrics,
    pub comparison: PeriodComparison,
    pub hourly: Vec<HourlyPoint>,
    pub peak_window: Option<PeakWindow>,
    pub peak_hour: Option<HourlyPoint>,
    pub trend: Option<TrendResult>,
    pub daily: DailySeries,
    pub monthly: Vec<MonthlyPoint>,
    pub weekdays: Vec<WeekdayCount>,
    pub heat_map: Option<HeatMap>,
}

#[derive(Debug, Serialize)]
pub struct TopResponse {
    pub period: MonthPeriod,
    pub restaurants: Vec<RestaurantMetrics>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub restaurant: Option<i64>,
}
