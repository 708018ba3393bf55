use axum::{extract::State, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{ApiResponse, AppState};

#[derive(Serialize)]
pub struct InteractionRecorded {
    pub last_interaction: DateTime<Utc>,
    /// Previous interaction, if any since startup
    pub previous: Option<DateTime<Utc>>,
}

pub fn interaction_routes() -> Router<AppState> {
    Router::new().route("/api/interaction", post(record_interaction))
}

/// The display pings this whenever someone touches it.
async fn record_interaction(State(state): State<AppState>) -> Json<ApiResponse<InteractionRecorded>> {
    let now = (state.clock)();
    let previous = state.last_interaction.write().await.replace(now);
    tracing::debug!("Interaction recorded at {}", now);

    Json(ApiResponse::success(InteractionRecorded {
        last_interaction: now,
        previous,
    }))
}
