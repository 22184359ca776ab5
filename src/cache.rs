use crate::models::{RestaurantMetrics, RestaurantReport};
use moka::sync::Cache;
use std::sync::Arc;
use std::time::Duration;

/// Memoized query results. Rankings are keyed on `(year, month)`, reports on
/// `(restaurant, year, month)`; entries expire after the configured TTL.
#[derive(Clone)]
pub struct ReportCache {
    rankings: Cache<(i32, u32), Arc<Vec<RestaurantMetrics>>>,
    reports: Cache<(i64, i32, u32), Arc<RestaurantReport>>,
}

impl ReportCache {
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = Duration::from_secs(ttl_secs);
        Self {
            rankings: Cache::builder().time_to_live(ttl).max_capacity(64).build(),
            reports: Cache::builder().time_to_live(ttl).max_capacity(512).build(),
        }
    }

    pub fn ranking(&self, year: i32, month: u32) -> Option<Arc<Vec<RestaurantMetrics>>> {
        self.rankings.get(&(year, month))
    }

    pub fn insert_ranking(&self, year: i32, month: u32, ranking: Arc<Vec<RestaurantMetrics>>) {
        self.rankings.insert((year, month), ranking);
    }

    pub fn report(&self, restaurant_id: i64, year: i32, month: u32) -> Option<Arc<RestaurantReport>> {
        self.reports.get(&(restaurant_id, year, month))
    }

    pub fn insert_report(&self, report: Arc<RestaurantReport>) {
        let key = (report.restaurant.id, report.period.year, report.period.month);
        self.reports.insert(key, report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rankings_are_keyed_by_month() {
        let cache = ReportCache::new(60);
        cache.insert_ranking(2025, 3, Arc::new(Vec::new()));
        assert!(cache.ranking(2025, 3).is_some());
        assert!(cache.ranking(2025, 4).is_none());
    }
}
