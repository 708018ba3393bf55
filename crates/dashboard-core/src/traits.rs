use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    AddressMatch, BusStop, Coordinates, DashboardError, DrivingRoute, NextTrains, Place,
    StopArrivals, SubwayStation, WeatherReport,
};

/// Source of current weather conditions
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current_weather(&self, at: Coordinates) -> Result<WeatherReport, DashboardError>;
}

/// Driving directions used to approximate taxi trips
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn driving_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<DrivingRoute, DashboardError>;
}

/// Keyword and address search
#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    async fn search_keyword(
        &self,
        query: &str,
        near: Option<Coordinates>,
    ) -> Result<Vec<Place>, DashboardError>;

    async fn search_address(&self, query: &str) -> Result<AddressMatch, DashboardError>;
}

/// Real-time bus stop information
#[async_trait]
pub trait BusArrivalProvider: Send + Sync {
    async fn nearby_stops(&self, at: Coordinates) -> Result<Vec<BusStop>, DashboardError>;

    async fn arrivals(&self, city_code: &str, node_id: &str)
        -> Result<StopArrivals, DashboardError>;
}

/// Timetable-based subway information
#[async_trait]
pub trait SubwayScheduleProvider: Send + Sync {
    async fn search_stations(&self, name: &str) -> Result<Vec<SubwayStation>, DashboardError>;

    /// Next departures in both directions relative to `now` (local wall clock)
    async fn next_trains(
        &self,
        station_id: &str,
        now: NaiveDateTime,
    ) -> Result<NextTrains, DashboardError>;
}
