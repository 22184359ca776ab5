use crate::errors::AppError;
use crate::models::{DashboardQuery, MonthPeriod, RestaurantReport, TopResponse};
use crate::report::{ranked_restaurants, restaurant_report};
use crate::state::AppState;
use crate::ui::{DashboardView, render_dashboard, render_empty};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use chrono::{Datelike, Local, NaiveDate};

/// How many years before the current one the year picker offers.
const YEARS_BACK: i32 = 3;

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Html<String>, AppError> {
    let today = Local::now().date_naive();
    let period = resolve_period(&query, today)?;
    let years = year_choices(today.year());

    let ranking = ranked_restaurants(&state, period).await?;
    let Some(first) = ranking.first() else {
        return Ok(Html(render_empty(&period, &years)));
    };
    let selected = query
        .restaurant
        .and_then(|id| ranking.iter().find(|r| r.id == id))
        .unwrap_or(first);

    let report = restaurant_report(&state, selected.id, period).await?;
    Ok(Html(render_dashboard(&DashboardView {
        period: &period,
        years: &years,
        ranking: &ranking,
        report: &report,
    })))
}

pub async fn get_top(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<TopResponse>, AppError> {
    let period = resolve_period(&query, Local::now().date_naive())?;
    let ranking = ranked_restaurants(&state, period).await?;
    Ok(Json(TopResponse {
        period,
        restaurants: (*ranking).clone(),
    }))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i64>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<RestaurantReport>, AppError> {
    let period = resolve_period(&query, Local::now().date_naive())?;
    let report = restaurant_report(&state, restaurant_id, period).await?;
    Ok(Json((*report).clone()))
}

pub async fn healthz() -> &'static str {
    "ok"
}

/// Period named by the query, defaulting to the month containing `today`.
fn resolve_period(query: &DashboardQuery, today: NaiveDate) -> Result<MonthPeriod, AppError> {
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("month must be between 1 and 12"));
    }
    MonthPeriod::new(year, month)
        .ok_or_else(|| AppError::bad_request(format!("invalid period {year}-{month:02}")))
}

fn year_choices(current: i32) -> Vec<i32> {
    ((current - YEARS_BACK)..=current).collect()
}
