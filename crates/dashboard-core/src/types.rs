use serde::{Deserialize, Serialize};

/// WGS84 coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Unset coordinates are stored as (0, 0) throughout the dashboard
    pub fn is_unset(&self) -> bool {
        self.lat == 0.0 && self.lon == 0.0
    }
}

/// Normalized current weather plus short-range precipitation probability
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
    pub wind: Option<f64>,
    /// Max probability of precipitation (0.0 - 1.0) over the next ~6 hours
    pub precip_prob: f64,
    pub weather_desc: String,
    /// Category such as "Rain", "Snow", "Clear"
    pub weather_main: String,
    pub weather_id: Option<i64>,
    pub icon: String,
    pub is_rain: bool,
    pub is_snow: bool,
    pub rain_1h: f64,
    pub snow_1h: f64,
}

/// Driving route summary used as the taxi estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrivingRoute {
    pub duration_min: f64,
    pub distance_m: f64,
    pub taxi_fare: i64,
}

/// Place search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub phone: String,
}

/// Resolved address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressMatch {
    pub address: String,
    pub lat: f64,
    pub lon: f64,
}

/// Bus stop near a coordinate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStop {
    pub node_id: Option<String>,
    pub node_nm: Option<String>,
    pub node_no: Option<String>,
    pub gps_lati: Option<f64>,
    pub gps_long: Option<f64>,
}

/// One upcoming bus arrival at a stop
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusArrival {
    pub route_id: Option<String>,
    pub route_no: Option<String>,
    pub route_tp: Option<String>,
    pub arr_prev_station_cnt: Option<i64>,
    pub vehicle_tp: Option<String>,
    /// Origin terminal name
    pub start_node_nm: Option<String>,
    /// Destination terminal name (direction)
    pub end_node_nm: Option<String>,
    pub arr_time_sec: Option<i64>,
    pub arr_time_min: Option<i64>,
}

/// Arrivals at one stop plus the soonest ETA
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopArrivals {
    pub arrivals: Vec<BusArrival>,
    pub eta_min: Option<i64>,
}

impl StopArrivals {
    pub fn from_arrivals(arrivals: Vec<BusArrival>) -> Self {
        let eta_min = arrivals.iter().filter_map(|a| a.arr_time_min).min();
        Self { arrivals, eta_min }
    }
}

/// Subway station search hit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubwayStation {
    pub subway_station_id: Option<String>,
    pub subway_station_name: Option<String>,
    pub subway_route_name: Option<String>,
}

/// Direction of travel on a subway line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Up / inner loop
    #[serde(rename = "U")]
    Up,
    /// Down / outer loop
    #[serde(rename = "D")]
    Down,
}

impl Direction {
    pub fn code(&self) -> &'static str {
        match self {
            Direction::Up => "U",
            Direction::Down => "D",
        }
    }
}

/// Timetable day category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Saturday,
    SundayOrHoliday,
}

impl DayType {
    pub fn from_weekday(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sat => DayType::Saturday,
            chrono::Weekday::Sun => DayType::SundayOrHoliday,
            _ => DayType::Weekday,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            DayType::Weekday => "01",
            DayType::Saturday => "02",
            DayType::SundayOrHoliday => "03",
        }
    }
}

/// One scheduled departure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubwayDeparture {
    pub arr_time: Option<String>,
    pub dep_time: String,
    pub end_station_nm: Option<String>,
    pub station_nm: Option<String>,
    /// Departure as minutes since midnight
    pub minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_min: Option<u32>,
}

/// Next departures in both directions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextTrains {
    pub up: Vec<SubwayDeparture>,
    pub down: Vec<SubwayDeparture>,
    pub day_type: DayType,
}

impl NextTrains {
    /// Soonest ETA across both directions
    pub fn min_eta(&self) -> Option<u32> {
        self.up
            .iter()
            .chain(self.down.iter())
            .filter_map(|d| d.eta_min)
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrival(min: Option<i64>) -> BusArrival {
        BusArrival {
            route_id: None,
            route_no: None,
            route_tp: None,
            arr_prev_station_cnt: None,
            vehicle_tp: None,
            start_node_nm: None,
            end_node_nm: None,
            arr_time_sec: min.map(|m| m * 60),
            arr_time_min: min,
        }
    }

    fn departure(eta: Option<u32>) -> SubwayDeparture {
        SubwayDeparture {
            arr_time: None,
            dep_time: "080000".to_string(),
            end_station_nm: None,
            station_nm: None,
            minutes: 480,
            eta_min: eta,
        }
    }

    #[test]
    fn test_stop_arrivals_eta_is_minimum() {
        let arrivals = StopArrivals::from_arrivals(vec![arrival(Some(9)), arrival(None), arrival(Some(3))]);
        assert_eq!(arrivals.eta_min, Some(3));
    }

    #[test]
    fn test_stop_arrivals_without_times() {
        let arrivals = StopArrivals::from_arrivals(vec![arrival(None)]);
        assert_eq!(arrivals.eta_min, None);
    }

    #[test]
    fn test_next_trains_min_eta_spans_directions() {
        let trains = NextTrains {
            up: vec![departure(Some(7))],
            down: vec![departure(Some(2)), departure(Some(12))],
            day_type: DayType::Weekday,
        };
        assert_eq!(trains.min_eta(), Some(2));
    }

    #[test]
    fn test_day_type_codes() {
        assert_eq!(DayType::from_weekday(chrono::Weekday::Wed).code(), "01");
        assert_eq!(DayType::from_weekday(chrono::Weekday::Sat).code(), "02");
        assert_eq!(DayType::from_weekday(chrono::Weekday::Sun).code(), "03");
    }

    #[test]
    fn test_unset_coordinates() {
        assert!(Coordinates::new(0.0, 0.0).is_unset());
        assert!(!Coordinates::new(35.1, 129.0).is_unset());
    }
}
