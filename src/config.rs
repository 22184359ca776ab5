use std::{env, path::PathBuf, str::FromStr};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_PATH: &str = "data/orders.db";
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_PEAK_COVERAGE: f64 = 0.8;
const DEFAULT_TOP_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub port: u16,
    pub db_path: PathBuf,
    pub cache_ttl_secs: u64,
    /// Share of a day's orders the peak window must hold, in (0, 1].
    pub peak_coverage: f64,
    pub top_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            peak_coverage: DEFAULT_PEAK_COVERAGE,
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();
        let settings = Self {
            port: parse(&lookup, "PORT", defaults.port)?,
            db_path: lookup("APP_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            cache_ttl_secs: parse(&lookup, "CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            peak_coverage: parse(&lookup, "PEAK_COVERAGE", defaults.peak_coverage)?,
            top_limit: parse(&lookup, "TOP_LIMIT", defaults.top_limit)?,
        };

        if !(settings.peak_coverage > 0.0 && settings.peak_coverage <= 1.0) {
            return Err(format!(
                "PEAK_COVERAGE must be in (0, 1], got {}",
                settings.peak_coverage
            ));
        }
        if settings.top_limit == 0 {
            return Err("TOP_LIMIT must be at least 1".to_string());
        }

        Ok(settings)
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|err| format!("invalid {key} {raw:?}: {err}")),
        None => Ok(default),
    }
}
