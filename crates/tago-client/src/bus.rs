use async_trait::async_trait;
use dashboard_core::{BusArrival, BusArrivalProvider, BusStop, Coordinates, DashboardError, StopArrivals};
use serde_json::Value;
use std::sync::Arc;

use crate::route_cache::{RouteCache, RouteInfo};
use crate::{int_field, number_field, text_field, TagoHttp};

const STATION_SERVICE: &str = "BusSttnInfoInqireService";
const ARRIVAL_SERVICE: &str = "ArvlInfoInqireService";
const ROUTE_SERVICE: &str = "BusRouteInfoInqireService";

const NEARBY_ROWS: u32 = 10;
const ARRIVAL_ROWS: u32 = 30;
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct TagoBusClient {
    http: TagoHttp,
    route_cache: Arc<RouteCache>,
}

impl TagoBusClient {
    pub fn new(service_key: String) -> Self {
        Self {
            http: TagoHttp::new(service_key),
            route_cache: Arc::new(RouteCache::new(DEFAULT_ROUTE_CACHE_CAPACITY)),
        }
    }

    pub fn with_route_cache_capacity(mut self, capacity: usize) -> Self {
        self.route_cache = Arc::new(RouteCache::new(capacity));
        self
    }

    pub fn route_cache(&self) -> &RouteCache {
        &self.route_cache
    }

    /// Stops near a coordinate (`getCrdntPrxmtSttnList`)
    pub async fn get_nearby_stops(&self, at: Coordinates) -> Result<Vec<BusStop>, DashboardError> {
        let items = self
            .http
            .get_items(
                STATION_SERVICE,
                "getCrdntPrxmtSttnList",
                &[
                    ("pageNo", "1".to_string()),
                    ("numOfRows", NEARBY_ROWS.to_string()),
                    ("gpsLati", at.lat.to_string()),
                    ("gpsLong", at.lon.to_string()),
                ],
            )
            .await?;

        Ok(items.iter().map(parse_stop).collect())
    }

    /// Route terminals (`getRouteInfoIem`), served from the cache when possible.
    ///
    /// Lookup failures are logged and produce empty names; they are not cached.
    pub async fn get_route_info(&self, city_code: &str, route_id: &str) -> RouteInfo {
        if let Some(info) = self.route_cache.get(city_code, route_id) {
            return info;
        }

        let result = self
            .http
            .get_items(
                ROUTE_SERVICE,
                "getRouteInfoIem",
                &[
                    ("pageNo", "1".to_string()),
                    ("numOfRows", "1".to_string()),
                    ("cityCode", city_code.to_string()),
                    ("routeId", route_id.to_string()),
                ],
            )
            .await;

        match result {
            Ok(items) => match items.first() {
                Some(item) => {
                    let info = parse_route_info(item);
                    self.route_cache.insert(city_code, route_id, info.clone());
                    info
                }
                None => empty_route_info(),
            },
            Err(e) => {
                tracing::warn!("TAGO route info lookup failed for {}: {}", route_id, e);
                empty_route_info()
            }
        }
    }

    /// Upcoming arrivals at a stop (`getSttnAcctoArvlPrearngeInfoList`)
    pub async fn get_arrivals(&self, city_code: &str, node_id: &str) -> Result<StopArrivals, DashboardError> {
        let items = self
            .http
            .get_items(
                ARRIVAL_SERVICE,
                "getSttnAcctoArvlPrearngeInfoList",
                &[
                    ("pageNo", "1".to_string()),
                    ("numOfRows", ARRIVAL_ROWS.to_string()),
                    ("cityCode", city_code.to_string()),
                    ("nodeId", node_id.to_string()),
                ],
            )
            .await?;

        let mut arrivals = Vec::with_capacity(items.len());
        for item in &items {
            let mut arrival = parse_arrival(item);
            if arrival.end_node_nm.is_none() {
                if let Some(route_id) = arrival.route_id.clone() {
                    let info = self.get_route_info(city_code, &route_id).await;
                    arrival.end_node_nm = info.end_node_nm;
                    arrival.start_node_nm = info.start_node_nm;
                }
            }
            arrivals.push(arrival);
        }

        Ok(StopArrivals::from_arrivals(arrivals))
    }
}

#[async_trait]
impl BusArrivalProvider for TagoBusClient {
    async fn nearby_stops(&self, at: Coordinates) -> Result<Vec<BusStop>, DashboardError> {
        self.get_nearby_stops(at).await
    }

    async fn arrivals(&self, city_code: &str, node_id: &str) -> Result<StopArrivals, DashboardError> {
        self.get_arrivals(city_code, node_id).await
    }
}

fn empty_route_info() -> RouteInfo {
    RouteInfo {
        start_node_nm: None,
        end_node_nm: None,
        route_no: None,
    }
}

fn parse_stop(item: &Value) -> BusStop {
    BusStop {
        node_id: text_field(item, &["nodeid", "nodeId"]),
        node_nm: text_field(item, &["nodenm", "nodeNm"]),
        node_no: text_field(item, &["nodeno", "nodeNo"]),
        gps_lati: number_field(item, &["gpslati", "gpsLati"]),
        gps_long: number_field(item, &["gpslong", "gpsLong"]),
    }
}

fn parse_route_info(item: &Value) -> RouteInfo {
    RouteInfo {
        start_node_nm: text_field(item, &["startnodenm", "startnodename"]),
        end_node_nm: text_field(item, &["endnodenm", "endnodename"]),
        route_no: text_field(item, &["routeno"]),
    }
}

fn parse_arrival(item: &Value) -> BusArrival {
    let arr_time_sec = int_field(item, &["arrtime"]);
    BusArrival {
        route_id: text_field(item, &["routeid"]),
        route_no: text_field(item, &["routeno"]),
        route_tp: text_field(item, &["routetp"]),
        arr_prev_station_cnt: int_field(item, &["arrprevstationcnt"]),
        vehicle_tp: text_field(item, &["vehicletp"]),
        start_node_nm: None,
        end_node_nm: text_field(item, &["endnodenm"]),
        arr_time_sec,
        // seconds to whole minutes, nearest, ties to even
        arr_time_min: arr_time_sec.map(|s| (s as f64 / 60.0).round_ties_even() as i64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_arrival_rounds_minutes() {
        let arrival = parse_arrival(&json!({
            "routeid": "BSB5200179000",
            "routeno": 179,
            "routetp": "일반버스",
            "arrprevstationcnt": 3,
            "vehicletp": "저상버스",
            "arrtime": 270
        }));
        assert_eq!(arrival.route_no.as_deref(), Some("179"));
        assert_eq!(arrival.arr_time_sec, Some(270));
        // 4.5 min rounds to the even minute
        assert_eq!(arrival.arr_time_min, Some(4));
        assert_eq!(arrival.end_node_nm, None);
    }

    #[test]
    fn test_arrival_half_minutes_round_to_even() {
        let minutes = |sec: i64| parse_arrival(&json!({ "arrtime": sec })).arr_time_min;
        assert_eq!(minutes(630), Some(10));
        assert_eq!(minutes(90), Some(2));
        assert_eq!(minutes(29), Some(0));
        assert_eq!(minutes(31), Some(1));
        assert_eq!(minutes(150), Some(2));
    }

    #[test]
    fn test_parse_arrival_missing_time() {
        let arrival = parse_arrival(&json!({ "routeid": "R1", "endnodenm": "해운대" }));
        assert_eq!(arrival.arr_time_min, None);
        assert_eq!(arrival.end_node_nm.as_deref(), Some("해운대"));
    }

    #[test]
    fn test_parse_stop_lowercase_and_camel_keys() {
        let lower = parse_stop(&json!({ "nodeid": "BSB1", "nodenm": "서면", "nodeno": 5012, "gpslati": 35.15, "gpslong": 129.05 }));
        let camel = parse_stop(&json!({ "nodeId": "BSB1", "nodeNm": "서면" }));
        assert_eq!(lower.node_id, camel.node_id);
        assert_eq!(lower.node_no.as_deref(), Some("5012"));
        assert_eq!(lower.gps_lati, Some(35.15));
        assert_eq!(camel.gps_lati, None);
    }

    #[test]
    fn test_parse_route_info_alternate_keys() {
        let info = parse_route_info(&json!({ "startnodename": "기점", "endnodenm": "종점", "routeno": "10" }));
        assert_eq!(info.start_node_nm.as_deref(), Some("기점"));
        assert_eq!(info.end_node_nm.as_deref(), Some("종점"));
    }

    #[tokio::test]
    async fn test_cached_route_info_skips_lookup() {
        // no service key: any HTTP attempt would fail, so a hit must come from the cache
        let client = TagoBusClient::new(String::new()).with_route_cache_capacity(8);
        let cached = RouteInfo {
            start_node_nm: Some("a".to_string()),
            end_node_nm: Some("b".to_string()),
            route_no: Some("7".to_string()),
        };
        client.route_cache().insert("21", "R7", cached.clone());

        assert_eq!(client.get_route_info("21", "R7").await, cached);
        assert_eq!(client.get_route_info("21", "R8").await, empty_route_info());
        assert_eq!(client.route_cache().len(), 1);
    }

    #[tokio::test]
    async fn test_arrivals_without_key_is_config_error() {
        let client = TagoBusClient::new(String::new());
        assert!(matches!(
            client.get_arrivals("21", "BSB1").await,
            Err(DashboardError::Config(_))
        ));
    }
}
