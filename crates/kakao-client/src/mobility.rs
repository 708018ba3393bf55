use async_trait::async_trait;
use dashboard_core::{Coordinates, DashboardError, DrivingRoute, RoutingProvider};
use serde::Deserialize;
use std::time::Duration;

use crate::KakaoHttp;

const BASE_URL: &str = "https://apis-navi.kakaomobility.com";

#[derive(Clone)]
pub struct KakaoMobilityClient {
    http: KakaoHttp,
    base_url: String,
}

impl KakaoMobilityClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: KakaoHttp::new(api_key, Duration::from_secs(3)),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Car directions; the recommended route's summary approximates a taxi ride.
    pub async fn get_directions(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DrivingRoute, DashboardError> {
        if origin.is_unset() || destination.is_unset() {
            return Err(DashboardError::InvalidInput("Invalid coordinates".to_string()));
        }

        let url = format!("{}/v1/directions", self.base_url);
        let directions: DirectionsResponse = self
            .http
            .get_json(
                &url,
                &[
                    // Kakao expects "lon,lat"
                    ("origin", format!("{},{}", origin.lon, origin.lat)),
                    ("destination", format!("{},{}", destination.lon, destination.lat)),
                    ("priority", "RECOMMEND".to_string()),
                    ("car_type", "1".to_string()),
                    ("summary", "true".to_string()),
                ],
            )
            .await?;

        directions.into_route()
    }
}

#[async_trait]
impl RoutingProvider for KakaoMobilityClient {
    async fn driving_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DrivingRoute, DashboardError> {
        self.get_directions(origin, destination).await
    }
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Deserialize)]
struct RouteEntry {
    #[serde(default)]
    summary: RouteSummary,
}

#[derive(Debug, Default, Deserialize)]
struct RouteSummary {
    /// Seconds
    #[serde(default)]
    duration: i64,
    /// Meters
    #[serde(default)]
    distance: i64,
    #[serde(default)]
    fare: Fare,
}

#[derive(Debug, Default, Deserialize)]
struct Fare {
    #[serde(default)]
    taxi: i64,
}

impl DirectionsResponse {
    fn into_route(self) -> Result<DrivingRoute, DashboardError> {
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::NotFound("No routes found".to_string()))?;
        let summary = route.summary;

        Ok(DrivingRoute {
            // whole minutes, truncated
            duration_min: (summary.duration / 60) as f64,
            distance_m: summary.distance as f64,
            taxi_fare: summary.fare.taxi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_summary_conversion() {
        let response: DirectionsResponse = serde_json::from_value(serde_json::json!({
            "routes": [{
                "result_code": 0,
                "summary": { "duration": 1259, "distance": 9876, "fare": { "taxi": 14300, "toll": 0 } }
            }]
        }))
        .unwrap();
        let route = response.into_route().unwrap();
        assert_eq!(route.duration_min, 20.0);
        assert_eq!(route.distance_m, 9876.0);
        assert_eq!(route.taxi_fare, 14300);
    }

    #[test]
    fn test_no_routes() {
        let response: DirectionsResponse = serde_json::from_value(serde_json::json!({ "routes": [] })).unwrap();
        assert!(matches!(response.into_route(), Err(DashboardError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_zero_coordinates_rejected() {
        let client = KakaoMobilityClient::new("key".to_string());
        let err = client
            .get_directions(Coordinates::new(0.0, 0.0), Coordinates::new(35.1, 129.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let client = KakaoMobilityClient::new(String::new());
        let err = client
            .get_directions(Coordinates::new(35.2, 129.1), Coordinates::new(35.1, 129.0))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Config(_)));
    }
}
