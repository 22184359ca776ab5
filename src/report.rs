use crate::analysis::{classify_trend, find_peak_window, peak_hour};
use crate::errors::AppError;
use crate::models::{
    Coordinate, DailySeries, HourlyDistribution, MonthPeriod, MonthSummary, RestaurantMetrics,
    RestaurantReport,
};
use crate::state::AppState;
use crate::stats::{compare_periods, heat_map, month_slice, monthly_totals, weekday_distribution};
use crate::storage;
use chrono::NaiveDate;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{debug, info};

const HEAT_MAP_RESOLUTION: usize = 24;

#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub coordinates: Vec<Coordinate>,
    pub hourly: HourlyDistribution,
    // Whole calendar year, for the monthly table.
    pub daily: DailySeries,
    pub current: MonthSummary,
    pub previous: MonthSummary,
}

impl ReportInputs {
    pub fn load(conn: &Connection, restaurant_id: i64, period: &MonthPeriod) -> rusqlite::Result<Self> {
        let year_start = NaiveDate::from_ymd_opt(period.year, 1, 1).unwrap_or(period.first_day());
        let year_end = NaiveDate::from_ymd_opt(period.year, 12, 31).unwrap_or(period.last_day());
        let previous = match period.previous() {
            Some(previous) => storage::month_summary(conn, restaurant_id, &previous)?,
            None => MonthSummary::default(),
        };

        Ok(Self {
            coordinates: storage::coordinates(conn, restaurant_id, period)?,
            hourly: storage::hourly_orders(conn, restaurant_id, period)?,
            daily: storage::daily_orders(conn, restaurant_id, year_start, year_end)?,
            current: storage::month_summary(conn, restaurant_id, period)?,
            previous,
        })
    }
}

pub fn build_report(
    period: MonthPeriod,
    restaurant: RestaurantMetrics,
    inputs: ReportInputs,
    peak_coverage: f64,
) -> RestaurantReport {
    let month_days = month_slice(&inputs.daily, &period);

    RestaurantReport {
        period,
        comparison: compare_periods(inputs.current, inputs.previous),
        hourly: inputs.hourly.active_points(),
        peak_window: find_peak_window(&inputs.hourly, peak_coverage),
        peak_hour: peak_hour(&inputs.hourly),
        trend: classify_trend(&month_days),
        daily: month_days,
        monthly: monthly_totals(&inputs.daily),
        weekdays: weekday_distribution(&restaurant),
        heat_map: heat_map(&inputs.coordinates, HEAT_MAP_RESOLUTION),
        restaurant,
    }
}

pub async fn ranked_restaurants(
    state: &AppState,
    period: MonthPeriod,
) -> Result<Arc<Vec<RestaurantMetrics>>, AppError> {
    if let Some(hit) = state.cache.ranking(period.year, period.month) {
        debug!(year = period.year, month = period.month, "ranking cache hit");
        return Ok(hit);
    }

    let limit = state.settings.top_limit;
    let ranking = state
        .store
        .query(move |conn| storage::top_restaurants(conn, &period, limit))
        .await?;
    let ranking = Arc::new(ranking);
    state
        .cache
        .insert_ranking(period.year, period.month, Arc::clone(&ranking));
    Ok(ranking)
}

/// Full report for one ranked restaurant, memoized per restaurant and month.
pub async fn restaurant_report(
    state: &AppState,
    restaurant_id: i64,
    period: MonthPeriod,
) -> Result<Arc<RestaurantReport>, AppError> {
    if let Some(hit) = state.cache.report(restaurant_id, period.year, period.month) {
        debug!(restaurant_id, year = period.year, month = period.month, "report cache hit");
        return Ok(hit);
    }

    let ranking = ranked_restaurants(state, period).await?;
    let restaurant = ranking
        .iter()
        .find(|r| r.id == restaurant_id)
        .cloned()
        .ok_or_else(|| {
            AppError::not_found(format!(
                "restaurant {restaurant_id} has no orders in {}",
                period.label()
            ))
        })?;

    let inputs = state
        .store
        .query(move |conn| ReportInputs::load(conn, restaurant_id, &period))
        .await?;

    let report = Arc::new(build_report(
        period,
        restaurant,
        inputs,
        state.settings.peak_coverage,
    ));
    info!(
        restaurant_id,
        year = period.year,
        month = period.month,
        orders = report.comparison.current.orders,
        "built restaurant report"
    );
    state.cache.insert_report(Arc::clone(&report));
    Ok(report)
}
