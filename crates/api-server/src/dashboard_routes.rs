use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use briefing::{make_briefing, Briefing, BriefingInput};
use dashboard_core::WeatherReport;
use serde::{Deserialize, Serialize};

use crate::{upstream_err, ApiResponse, AppError, AppState};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub time: String,
}

#[derive(Deserialize)]
pub struct BriefingQuery {
    #[serde(default)]
    pub depart_in: Option<i64>,
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(status_page))
        .route("/health", get(health))
        .route("/api/weather", get(get_weather))
        .route("/api/briefing", get(get_briefing))
}

async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        time: state.local_now().to_rfc3339(),
    })
}

async fn get_weather(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WeatherReport>>, AppError> {
    let report = state
        .weather
        .current_weather(state.config.home)
        .await
        .map_err(|e| upstream_err("Weather lookup failed", e))?;
    Ok(Json(ApiResponse::success(report)))
}

/// Briefing never fails on weather: an unknown forecast just omits the warnings.
async fn get_briefing(
    State(state): State<AppState>,
    Query(query): Query<BriefingQuery>,
) -> Json<ApiResponse<Briefing>> {
    let weather = match state.weather.current_weather(state.config.home).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Briefing without weather: {}", e);
            WeatherReport::default()
        }
    };

    Json(ApiResponse::success(make_briefing(&BriefingInput {
        recommend_depart_in_min: query.depart_in,
        weather,
    })))
}

async fn status_page(State(state): State<AppState>) -> Html<String> {
    let now = state.local_now();
    let weather = match state.weather.current_weather(state.config.home).await {
        Ok(report) => Some(report),
        Err(e) => {
            tracing::warn!("Status page without weather: {}", e);
            None
        }
    };
    Html(render_status_page(&now.format("%Y-%m-%d %H:%M").to_string(), weather.as_ref()))
}

fn render_status_page(now: &str, weather: Option<&WeatherReport>) -> String {
    let weather_block = match weather {
        Some(w) => format!(
            "<p class=\"temp\">{}</p><p>{}</p><p>Feels like {}</p><p>Chance of rain {:.0}%</p>",
            format_temp(w.temp),
            escape_html(&w.weather_desc),
            format_temp(w.feels_like),
            w.precip_prob * 100.0
        ),
        None => "<p>Weather unavailable</p>".to_string(),
    };

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Dashboard</title>\
         <style>body{{font-family:sans-serif;background:#000;color:#eee}}.temp{{font-size:3em}}</style></head>\
         <body><h1>{}</h1>{}</body></html>",
        escape_html(now),
        weather_block
    )
}

fn format_temp(temp: Option<f64>) -> String {
    match temp {
        Some(t) => format!("{:.1}°C", t),
        None => "--".to_string(),
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
