use anyhow::{anyhow, Result};
use chrono_tz::Tz;
use dashboard_core::Coordinates;
use std::env;

/// Runtime configuration, loaded from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Timezone for wall-clock hour/minute used in time budgets
    pub tz: Tz,
    pub owm_api_key: String,
    pub kakao_api_key: String,
    pub tago_service_key: String,
    /// Trip origin for every commute estimate
    pub home: Coordinates,
    /// TAGO city code of the home bus stop
    pub bus_city_code: Option<String>,
    /// TAGO node id of the home bus stop
    pub bus_node_id: Option<String>,
    pub subway_station_id: Option<String>,
    /// Default keyword for station search
    pub subway_station_name: String,
    pub bind_addr: String,
    pub route_cache_capacity: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let optional = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tz_name = get("TZ", "Asia/Seoul");
        let tz: Tz = tz_name
            .parse()
            .map_err(|e| anyhow!("Invalid TZ '{}': {}", tz_name, e))?;

        let home_lat: f64 = get("HOME_LAT", "0.0")
            .parse()
            .map_err(|e| anyhow!("Invalid HOME_LAT: {}", e))?;
        let home_lon: f64 = get("HOME_LON", "0.0")
            .parse()
            .map_err(|e| anyhow!("Invalid HOME_LON: {}", e))?;

        let config = Self {
            tz,
            owm_api_key: get("OWM_API_KEY", ""),
            kakao_api_key: get("KAKAO_REST_API_KEY", ""),
            tago_service_key: get("TAGO_SERVICE_KEY", ""),
            home: Coordinates::new(home_lat, home_lon),
            bus_city_code: optional("BUS_CITY_CODE"),
            bus_node_id: optional("BUS_NODE_ID"),
            subway_station_id: optional("SUBWAY_STATION_ID"),
            subway_station_name: get("SUBWAY_STATION_NAME", "부산"),
            bind_addr: get("BIND_ADDR", "0.0.0.0:8080"),
            route_cache_capacity: get("ROUTE_CACHE_CAPACITY", "256")
                .parse()
                .map_err(|e| anyhow!("Invalid ROUTE_CACHE_CAPACITY: {}", e))?,
        };

        config.warn_missing();
        Ok(config)
    }

    fn warn_missing(&self) {
        if self.owm_api_key.is_empty() {
            tracing::warn!("OWM_API_KEY not set - weather disabled");
        }
        if self.kakao_api_key.is_empty() {
            tracing::warn!("KAKAO_REST_API_KEY not set - taxi routing and place search disabled");
        }
        if self.tago_service_key.is_empty() {
            tracing::warn!("TAGO_SERVICE_KEY not set - bus and subway lookups disabled");
        }
        if self.home.is_unset() {
            tracing::warn!("HOME_LAT/HOME_LON not set - commute estimates will be unavailable");
        }
    }
}
