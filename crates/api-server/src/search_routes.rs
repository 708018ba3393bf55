//! Place, bus stop and subway station search used by the display's pickers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use dashboard_core::{BusArrival, BusStop, DashboardError, NextTrains, Place, SubwayStation};
use serde::{Deserialize, Serialize};

use crate::{upstream_err, ApiResponse, AppError, AppState};

#[derive(Deserialize)]
pub struct DestinationQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Deserialize)]
pub struct BusStopQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "nodeId")]
    pub node_id: Option<String>,
    #[serde(default, rename = "nodeNm")]
    pub node_nm: Option<String>,
}

#[derive(Deserialize)]
pub struct SubwayStationQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default, rename = "stationId")]
    pub station_id: Option<String>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum BusStopLookup {
    Stops {
        query: String,
        place: Place,
        stops: Vec<BusStop>,
    },
    Arrivals {
        node_id: String,
        node_nm: Option<String>,
        arrivals: Vec<BusArrival>,
        eta_min: Option<i64>,
    },
}

#[derive(Serialize)]
pub struct SubwayStationLookup {
    pub stations: Vec<SubwayStation>,
    pub station: Option<SubwayStation>,
    pub next_trains: NextTrains,
}

pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/api/search_destination", get(search_destination))
        .route("/api/search_bus_stop", get(search_bus_stop))
        .route("/api/search_subway_station", get(search_subway_station))
}

async fn search_destination(
    State(state): State<AppState>,
    Query(query): Query<DestinationQuery>,
) -> Result<Json<ApiResponse<Vec<Place>>>, AppError> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(ApiResponse::success(Vec::new())));
    }

    let near = (!state.config.home.is_unset()).then_some(state.config.home);
    match state.places.search_keyword(q, near).await {
        Ok(places) => Ok(Json(ApiResponse::success(places))),
        Err(DashboardError::NotFound(_)) => Ok(Json(ApiResponse::success(address_fallback(&state, q).await?))),
        Err(e) => Err(upstream_err("Place search failed", e)),
    }
}

/// Queries that name no place may still be a street address.
async fn address_fallback(state: &AppState, q: &str) -> Result<Vec<Place>, AppError> {
    match state.places.search_address(q).await {
        Ok(found) => Ok(vec![Place {
            name: found.address.clone(),
            address: found.address,
            lat: found.lat,
            lon: found.lon,
            category: String::new(),
            phone: String::new(),
        }]),
        Err(DashboardError::NotFound(_)) => Ok(Vec::new()),
        Err(e) => Err(upstream_err("Address search failed", e)),
    }
}

/// `nodeId` returns live arrivals at that stop; `q` finds stops around the best-matching place.
async fn search_bus_stop(
    State(state): State<AppState>,
    Query(query): Query<BusStopQuery>,
) -> Result<Json<ApiResponse<BusStopLookup>>, AppError> {
    if let Some(node_id) = query.node_id.filter(|s| !s.trim().is_empty()) {
        let city_code = state.config.bus_city_code.as_deref().ok_or_else(|| {
            AppError::with_status(
                StatusCode::SERVICE_UNAVAILABLE,
                anyhow::anyhow!("BUS_CITY_CODE is not configured"),
            )
        })?;
        let arrivals = state
            .bus
            .arrivals(city_code, &node_id)
            .await
            .map_err(|e| upstream_err("Bus arrival lookup failed", e))?;

        return Ok(Json(ApiResponse::success(BusStopLookup::Arrivals {
            node_id,
            node_nm: query.node_nm,
            eta_min: arrivals.eta_min,
            arrivals: arrivals.arrivals,
        })));
    }

    let q = query.q.unwrap_or_default();
    let q = q.trim();
    if q.is_empty() {
        return Err(AppError::bad_request("Either q or nodeId is required"));
    }

    let near = (!state.config.home.is_unset()).then_some(state.config.home);
    let place = state
        .places
        .search_keyword(q, near)
        .await
        .map_err(|e| upstream_err("Place search failed", e))?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::with_status(StatusCode::NOT_FOUND, anyhow::anyhow!("No place matches '{q}'")))?;

    let stops = state
        .bus
        .nearby_stops(dashboard_core::Coordinates::new(place.lat, place.lon))
        .await
        .map_err(|e| upstream_err("Nearby stop lookup failed", e))?;

    Ok(Json(ApiResponse::success(BusStopLookup::Stops {
        query: q.to_string(),
        place,
        stops,
    })))
}

/// `stationId` returns its next trains; otherwise `q` (or the configured
/// default station name) is searched and the first hit's trains returned.
async fn search_subway_station(
    State(state): State<AppState>,
    Query(query): Query<SubwayStationQuery>,
) -> Result<Json<ApiResponse<SubwayStationLookup>>, AppError> {
    let now = state.local_now().naive_local();

    if let Some(station_id) = query.station_id.filter(|s| !s.trim().is_empty()) {
        let next_trains = state
            .subway
            .next_trains(&station_id, now)
            .await
            .map_err(|e| upstream_err("Subway schedule lookup failed", e))?;
        return Ok(Json(ApiResponse::success(SubwayStationLookup {
            stations: Vec::new(),
            station: None,
            next_trains,
        })));
    }

    let name = query
        .q
        .map(|q| q.trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| state.config.subway_station_name.clone());

    let stations = state
        .subway
        .search_stations(&name)
        .await
        .map_err(|e| upstream_err("Subway station search failed", e))?;

    let station = stations
        .iter()
        .find(|s| s.subway_station_id.is_some())
        .cloned()
        .ok_or_else(|| AppError::with_status(StatusCode::NOT_FOUND, anyhow::anyhow!("No station matches '{name}'")))?;

    let station_id = station.subway_station_id.clone().unwrap_or_default();
    let next_trains = state
        .subway
        .next_trains(&station_id, now)
        .await
        .map_err(|e| upstream_err("Subway schedule lookup failed", e))?;

    Ok(Json(ApiResponse::success(SubwayStationLookup {
        stations,
        station: Some(station),
        next_trains,
    })))
}
