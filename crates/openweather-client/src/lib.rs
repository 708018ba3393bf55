use async_trait::async_trait;
use dashboard_core::{Coordinates, DashboardError, WeatherProvider, WeatherReport};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const BASE_URL: &str = "https://api.openweathermap.org";
const REQUEST_TIMEOUT_SECS: u64 = 8;
/// Condition descriptions in Korean
const LANG: &str = "kr";
/// Forecast slots are 3 hours apart; two slots cover the next 6 hours.
const FORECAST_SLOTS: usize = 2;

#[derive(Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            api_key,
            client,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DashboardError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| DashboardError::Api(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DashboardError::Api(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| DashboardError::Parse(e.to_string()))
    }

    /// Current conditions (`/data/2.5/weather`)
    pub async fn get_current(&self, at: Coordinates) -> Result<WeatherReport, DashboardError> {
        let current: CurrentResponse = self
            .get_json(
                "/data/2.5/weather",
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", "metric".to_string()),
                    ("lang", LANG.to_string()),
                ],
            )
            .await?;

        Ok(current.into_report())
    }

    /// Max probability of precipitation over the next 6 hours (`/data/2.5/forecast`)
    pub async fn get_precip_prob(&self, at: Coordinates) -> Result<f64, DashboardError> {
        let forecast: ForecastResponse = self
            .get_json(
                "/data/2.5/forecast",
                &[
                    ("lat", at.lat.to_string()),
                    ("lon", at.lon.to_string()),
                    ("appid", self.api_key.clone()),
                    ("units", "metric".to_string()),
                    ("cnt", "4".to_string()),
                ],
            )
            .await?;

        Ok(forecast.max_pop(FORECAST_SLOTS))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    /// Current weather with the forecast's precipitation probability folded in.
    ///
    /// A failed forecast lookup only leaves `precip_prob` at 0.
    async fn current_weather(&self, at: Coordinates) -> Result<WeatherReport, DashboardError> {
        if self.api_key.is_empty() {
            return Err(DashboardError::Config("OWM_API_KEY missing".to_string()));
        }

        let mut report = self.get_current(at).await?;

        match self.get_precip_prob(at).await {
            Ok(pop) => report.precip_prob = pop,
            Err(e) => tracing::warn!("OpenWeather forecast lookup failed: {}", e),
        }

        Ok(report)
    }
}

#[derive(Debug, Deserialize)]
struct CurrentResponse {
    #[serde(default)]
    main: MainBlock,
    #[serde(default)]
    wind: WindBlock,
    #[serde(default)]
    weather: Vec<ConditionBlock>,
    #[serde(default)]
    rain: PrecipBlock,
    #[serde(default)]
    snow: PrecipBlock,
}

#[derive(Debug, Default, Deserialize)]
struct MainBlock {
    temp: Option<f64>,
    feels_like: Option<f64>,
    humidity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct WindBlock {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ConditionBlock {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    main: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct PrecipBlock {
    #[serde(rename = "1h", default)]
    one_hour: f64,
}

impl CurrentResponse {
    fn into_report(self) -> WeatherReport {
        let mut report = WeatherReport {
            temp: self.main.temp,
            feels_like: self.main.feels_like,
            humidity: self.main.humidity,
            wind: self.wind.speed,
            rain_1h: self.rain.one_hour,
            snow_1h: self.snow.one_hour,
            ..WeatherReport::default()
        };

        if let Some(condition) = self.weather.into_iter().next() {
            // 2xx thunderstorm, 3xx drizzle, 5xx rain, 6xx snow
            match condition.id {
                200..=599 => report.is_rain = true,
                600..=699 => report.is_snow = true,
                _ => {}
            }
            report.weather_id = Some(condition.id);
            report.weather_main = condition.main;
            report.weather_desc = condition.description;
            report.icon = condition.icon;
        }

        if report.rain_1h > 0.0 {
            report.is_rain = true;
        }
        if report.snow_1h > 0.0 {
            report.is_snow = true;
        }

        report
    }
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    list: Vec<ForecastSlot>,
}

#[derive(Debug, Deserialize)]
struct ForecastSlot {
    #[serde(default)]
    pop: f64,
}

impl ForecastResponse {
    fn max_pop(&self, slots: usize) -> f64 {
        self.list
            .iter()
            .take(slots)
            .map(|s| s.pop)
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_current(json: serde_json::Value) -> WeatherReport {
        serde_json::from_value::<CurrentResponse>(json).unwrap().into_report()
    }

    #[test]
    fn test_clear_sky() {
        let report = parse_current(serde_json::json!({
            "main": { "temp": 21.5, "feels_like": 20.9, "humidity": 40 },
            "wind": { "speed": 2.1 },
            "weather": [{ "id": 800, "main": "Clear", "description": "맑음", "icon": "01d" }]
        }));
        assert_eq!(report.temp, Some(21.5));
        assert_eq!(report.humidity, Some(40.0));
        assert_eq!(report.weather_id, Some(800));
        assert_eq!(report.weather_main, "Clear");
        assert!(!report.is_rain);
        assert!(!report.is_snow);
    }

    #[test]
    fn test_drizzle_counts_as_rain() {
        let report = parse_current(serde_json::json!({
            "main": { "temp": 12.0 },
            "weather": [{ "id": 301, "main": "Drizzle" }]
        }));
        assert!(report.is_rain);
        assert!(!report.is_snow);
    }

    #[test]
    fn test_snow_condition_and_volume() {
        let report = parse_current(serde_json::json!({
            "weather": [{ "id": 601, "main": "Snow" }],
            "snow": { "1h": 0.8 }
        }));
        assert!(report.is_snow);
        assert_eq!(report.snow_1h, 0.8);
    }

    #[test]
    fn test_rain_volume_overrides_clear_condition() {
        let report = parse_current(serde_json::json!({
            "weather": [{ "id": 803, "main": "Clouds" }],
            "rain": { "1h": 0.3 }
        }));
        assert!(report.is_rain);
    }

    #[test]
    fn test_missing_blocks_default() {
        let report = parse_current(serde_json::json!({}));
        assert_eq!(report.temp, None);
        assert_eq!(report.weather_id, None);
        assert_eq!(report.precip_prob, 0.0);
    }

    #[test]
    fn test_forecast_uses_first_two_slots() {
        let forecast: ForecastResponse = serde_json::from_value(serde_json::json!({
            "list": [{ "pop": 0.2 }, { "pop": 0.6 }, { "pop": 0.9 }, {}]
        }))
        .unwrap();
        assert_eq!(forecast.max_pop(FORECAST_SLOTS), 0.6);
    }

    #[test]
    fn test_forecast_empty_list() {
        let forecast: ForecastResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(forecast.max_pop(FORECAST_SLOTS), 0.0);
    }

    #[tokio::test]
    async fn test_missing_api_key_is_config_error() {
        let client = OpenWeatherClient::new(String::new());
        let err = client
            .current_weather(Coordinates::new(35.1, 129.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
