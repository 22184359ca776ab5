//! SQLite access: schema setup and the per-restaurant aggregation queries.

use crate::errors::AppError;
use crate::models::{
    Coordinate, DailyCount, DailySeries, HourlyDistribution, MonthPeriod, MonthSummary,
    RestaurantMetrics,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, params, types::Type};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Order status of a delivered order; nothing else is counted.
pub const COMPLETED_STATUS: i64 = 24;

/// Payment method name recorded for cash payments.
pub const CASH_PAYMENT: &str = "Efectivo";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS restaurants (
    id_restaurant   INTEGER PRIMARY KEY,
    name_restaurant TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS payment_methods (
    id_payment INTEGER PRIMARY KEY,
    payment    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS client_addresses (
    id_address INTEGER PRIMARY KEY,
    latitude   REAL,
    longitude  REAL
);
CREATE TABLE IF NOT EXISTS addresses (
    ad_id        INTEGER PRIMARY KEY,
    ad_latitude  REAL,
    ad_longitude REAL
);
CREATE TABLE IF NOT EXISTS orders (
    id_order                INTEGER PRIMARY KEY,
    restaurant              INTEGER NOT NULL REFERENCES restaurants(id_restaurant),
    payment                 INTEGER NOT NULL REFERENCES payment_methods(id_payment),
    id_address              INTEGER,
    addresses_id            INTEGER,
    status                  INTEGER NOT NULL,
    total                   REAL NOT NULL DEFAULT 0,
    delivery_cost           REAL NOT NULL DEFAULT 0,
    credits_cost            REAL,
    order_acceptance_date   TEXT,
    start_delivery_datetime TEXT,
    arrival_client_date     TEXT,
    order_completion_date   TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_orders_completion ON orders(order_completion_date);
CREATE INDEX IF NOT EXISTS idx_orders_restaurant_completion
    ON orders(restaurant, order_completion_date);
";

/// Handle on the order database. Each query batch opens its own short-lived
/// connection on the blocking pool.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;
        Ok(conn)
    }

    pub async fn init(&self) -> Result<(), AppError> {
        self.query(init_schema).await
    }

    /// Runs `f` against a fresh connection on tokio's blocking pool.
    pub async fn query<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        let result = tokio::task::spawn_blocking(move || {
            let conn = store.open()?;
            f(&conn)
        })
        .await?;
        Ok(result?)
    }
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

fn timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

fn count(value: i64) -> u64 {
    value.max(0) as u64
}

/// Restaurants ranked by completed orders in `period`, busiest first.
pub fn top_restaurants(
    conn: &Connection,
    period: &MonthPeriod,
    limit: usize,
) -> rusqlite::Result<Vec<RestaurantMetrics>> {
    // Payment ids 3, 4 and 7 are bank transfers; 3 and 4 carry no ticket value.
    let mut stmt = conn.prepare_cached(
        "SELECT
            r.id_restaurant,
            r.name_restaurant,
            COUNT(o.id_order) AS orders,
            COUNT(DISTINCT ac.id_address),
            AVG(CASE WHEN o.payment NOT IN (3, 4) THEN o.total + o.delivery_cost END),
            AVG((julianday(o.arrival_client_date) - julianday(o.start_delivery_datetime)) * 1440.0),
            AVG((julianday(o.start_delivery_datetime) - julianday(o.order_acceptance_date)) * 1440.0),
            SUM(CASE WHEN p.payment <> ?3 AND o.payment NOT IN (3, 4, 7) THEN 1 ELSE 0 END),
            SUM(CASE WHEN p.payment = ?3 THEN 1 ELSE 0 END),
            SUM(CASE WHEN p.id_payment IN (3, 4, 7) THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '1' THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '2' THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '3' THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '4' THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '5' THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '6' THEN 1 ELSE 0 END),
            SUM(CASE strftime('%w', o.order_completion_date) WHEN '0' THEN 1 ELSE 0 END)
         FROM restaurants r
         JOIN orders o ON o.restaurant = r.id_restaurant
         JOIN payment_methods p ON p.id_payment = o.payment
         JOIN client_addresses ac ON ac.id_address = o.id_address
         WHERE o.order_completion_date >= ?1
           AND o.order_completion_date < ?2
           AND o.status = ?4
         GROUP BY r.id_restaurant, r.name_restaurant
         ORDER BY orders DESC, r.name_restaurant
         LIMIT ?5",
    )?;

    let rows = stmt.query_map(
        params![
            timestamp(period.start),
            timestamp(period.end_exclusive()),
            CASH_PAYMENT,
            COMPLETED_STATUS,
            limit as i64,
        ],
        |row| {
            let mut weekday_orders = [0u64; 7];
            for (i, slot) in weekday_orders.iter_mut().enumerate() {
                *slot = count(row.get(10 + i)?);
            }
            Ok(RestaurantMetrics {
                id: row.get(0)?,
                name: row.get(1)?,
                orders: count(row.get(2)?),
                unique_clients: count(row.get(3)?),
                avg_ticket: row.get(4)?,
                avg_delivery_minutes: row.get(5)?,
                avg_wait_minutes: row.get(6)?,
                card_payments: count(row.get(7)?),
                cash_payments: count(row.get(8)?),
                transfer_payments: count(row.get(9)?),
                weekday_orders,
            })
        },
    )?;

    let restaurants = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    debug!(
        year = period.year,
        month = period.month,
        rows = restaurants.len(),
        "ranked restaurants"
    );
    Ok(restaurants)
}

/// Delivery coordinates for a restaurant's completed orders. The client
/// address wins over the generic address; rows without either are dropped.
pub fn coordinates(
    conn: &Connection,
    restaurant_id: i64,
    period: &MonthPeriod,
) -> rusqlite::Result<Vec<Coordinate>> {
    let mut stmt = conn.prepare_cached(
        "SELECT
            COALESCE(ac.latitude, ad.ad_latitude),
            COALESCE(ac.longitude, ad.ad_longitude)
         FROM orders o
         LEFT JOIN client_addresses ac ON ac.id_address = o.id_address
         LEFT JOIN addresses ad ON ad.ad_id = o.addresses_id
         WHERE o.status = ?1
           AND o.restaurant = ?2
           AND o.order_completion_date >= ?3
           AND o.order_completion_date < ?4",
    )?;

    let rows = stmt.query_map(
        params![
            COMPLETED_STATUS,
            restaurant_id,
            timestamp(period.start),
            timestamp(period.end_exclusive()),
        ],
        |row| Ok((row.get::<_, Option<f64>>(0)?, row.get::<_, Option<f64>>(1)?)),
    )?;

    let mut coords = Vec::new();
    for row in rows {
        if let (Some(lat), Some(lon)) = row? {
            if lat.is_finite() && lon.is_finite() {
                coords.push(Coordinate { lat, lon });
            }
        }
    }
    Ok(coords)
}

pub fn hourly_orders(
    conn: &Connection,
    restaurant_id: i64,
    period: &MonthPeriod,
) -> rusqlite::Result<HourlyDistribution> {
    let mut stmt = conn.prepare_cached(
        "SELECT CAST(strftime('%H', order_completion_date) AS INTEGER) AS hour, COUNT(*)
         FROM orders
         WHERE order_completion_date >= ?1
           AND order_completion_date < ?2
           AND status = ?3
           AND restaurant = ?4
         GROUP BY hour
         ORDER BY hour",
    )?;

    let rows = stmt.query_map(
        params![
            timestamp(period.start),
            timestamp(period.end_exclusive()),
            COMPLETED_STATUS,
            restaurant_id,
        ],
        |row| {
            let hour: Option<i64> = row.get(0)?;
            Ok((hour, count(row.get(1)?)))
        },
    )?;

    let mut pairs = Vec::new();
    for row in rows {
        if let (Some(hour), orders) = row? {
            if let Ok(hour) = u32::try_from(hour) {
                pairs.push((hour, orders));
            }
        }
    }
    Ok(HourlyDistribution::from_pairs(pairs))
}

/// Completed orders per calendar day, `from` through `to` inclusive.
pub fn daily_orders(
    conn: &Connection,
    restaurant_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> rusqlite::Result<DailySeries> {
    let mut stmt = conn.prepare_cached(
        "SELECT date(order_completion_date) AS day, COUNT(id_order)
         FROM orders
         WHERE order_completion_date >= ?1
           AND order_completion_date < ?2
           AND status = ?3
           AND restaurant = ?4
         GROUP BY day
         ORDER BY day",
    )?;

    let start = from.format("%Y-%m-%d").to_string();
    let end = (to + Duration::days(1)).format("%Y-%m-%d").to_string();
    let rows = stmt.query_map(
        params![start, end, COMPLETED_STATUS, restaurant_id],
        |row| {
            let day: String = row.get(0)?;
            let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(err)))?;
            Ok(DailyCount {
                date,
                orders: count(row.get(1)?),
            })
        },
    )?;

    rows.collect()
}

pub fn month_summary(
    conn: &Connection,
    restaurant_id: i64,
    period: &MonthPeriod,
) -> rusqlite::Result<MonthSummary> {
    conn.query_row(
        "SELECT
            COUNT(*),
            COUNT(DISTINCT date(order_completion_date)),
            SUM(credits_cost)
         FROM orders
         WHERE status = ?1
           AND restaurant = ?2
           AND order_completion_date >= ?3
           AND order_completion_date < ?4",
        params![
            COMPLETED_STATUS,
            restaurant_id,
            timestamp(period.start),
            timestamp(period.end_exclusive()),
        ],
        |row| {
            Ok(MonthSummary {
                orders: count(row.get(0)?),
                active_days: count(row.get(1)?),
                credits: row.get::<_, Option<f64>>(2)?.unwrap_or(0.0),
            })
        },
    )
}
