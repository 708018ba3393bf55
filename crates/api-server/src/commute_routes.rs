//! Commute probability API
//!
//! Resolves the time budget from the local clock, gathers the upstream point
//! estimates concurrently and hands them to the estimator.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use chrono::DateTime;
use chrono_tz::Tz;
use commute_estimator::{compute_probabilities, CommuteInputs, CommuteProbabilities, TimeBudget};
use dashboard_core::Coordinates;
use serde::{Deserialize, Serialize};

use crate::{ApiResponse, AppError, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct CommuteRequest {
    pub arrive_hhmm: String,
    pub dest: Destination,
}

#[derive(Debug, Serialize)]
pub struct CommuteResponse {
    pub ok: bool,
    /// Local time the estimate was made, "HH:MM"
    pub now: String,
    pub arrive_hhmm: String,
    pub time_budget_min: f64,
    pub dest: Destination,
    pub probabilities: CommuteProbabilities,
    /// Best on-time probability among running modes
    pub best_p_on_time: Option<f64>,
    pub inputs: CommuteInputs,
}

pub fn commute_routes() -> Router<AppState> {
    Router::new().route("/api/commute_probability", post(commute_probability))
}

async fn commute_probability(
    State(state): State<AppState>,
    payload: Result<Json<CommuteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CommuteResponse>>, AppError> {
    let Json(req) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let dest = Coordinates::new(req.dest.lat, req.dest.lon);
    if dest.is_unset() || !dest.lat.is_finite() || !dest.lon.is_finite() {
        return Err(AppError::bad_request(
            "Destination coordinates are required; pick a place from search",
        ));
    }

    let now = state.local_now();
    let budget = TimeBudget::from_clock(&now, &req.arrive_hhmm)
        .map_err(|e| AppError::bad_request(e.to_string()))?;

    let inputs = gather_commute_inputs(&state, dest, now, &budget).await;
    let probabilities = compute_probabilities(&inputs);

    tracing::info!(
        "Commute to '{}' in {} min: taxi {:.3} / bus {:.3} / subway {:.3}",
        req.dest.name,
        budget.time_budget_min,
        probabilities.taxi.p_on_time,
        probabilities.bus.p_on_time,
        probabilities.subway.p_on_time
    );

    Ok(Json(ApiResponse::success(CommuteResponse {
        ok: true,
        now: now.format("%H:%M").to_string(),
        arrive_hhmm: req.arrive_hhmm.trim().to_string(),
        time_budget_min: budget.time_budget_min,
        dest: req.dest,
        best_p_on_time: probabilities.best_p_on_time(),
        probabilities: probabilities.rounded(),
        inputs,
    })))
}

/// Run the routing, bus and subway lookups concurrently.
///
/// Each failure degrades to a missing value (and an unavailable flag for
/// transit) instead of failing the request.
pub async fn gather_commute_inputs(
    state: &AppState,
    dest: Coordinates,
    now: DateTime<Tz>,
    budget: &TimeBudget,
) -> CommuteInputs {
    let config = &state.config;

    let taxi = async {
        match state.routing.driving_route(config.home, dest).await {
            Ok(route) => Some(route),
            Err(e) => {
                tracing::warn!("Taxi routing unavailable: {}", e);
                None
            }
        }
    };

    let bus = async {
        let (Some(city_code), Some(node_id)) = (&config.bus_city_code, &config.bus_node_id) else {
            tracing::debug!("Bus stop not configured");
            return (false, None);
        };
        match state.bus.arrivals(city_code, node_id).await {
            Ok(arrivals) => (true, arrivals.eta_min.map(|m| m as f64)),
            Err(e) => {
                tracing::warn!("Bus arrivals unavailable: {}", e);
                (false, None)
            }
        }
    };

    let subway = async {
        let Some(station_id) = &config.subway_station_id else {
            tracing::debug!("Subway station not configured");
            return (false, None);
        };
        match state.subway.next_trains(station_id, now.naive_local()).await {
            Ok(trains) => (true, trains.min_eta().map(f64::from)),
            Err(e) => {
                tracing::warn!("Subway schedule unavailable: {}", e);
                (false, None)
            }
        }
    };

    let (route, (bus_available, bus_wait_min), (subway_available, subway_wait_min)) =
        tokio::join!(taxi, bus, subway);

    CommuteInputs {
        time_budget_min: budget.time_budget_min,
        taxi_duration_min: route.as_ref().map(|r| r.duration_min),
        taxi_distance_m: route.as_ref().map(|r| r.distance_m),
        bus_wait_min,
        subway_wait_min,
        bus_available,
        subway_available,
        current_hour: budget.current_hour,
    }
}
