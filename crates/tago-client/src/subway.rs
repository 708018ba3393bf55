use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use dashboard_core::{
    DashboardError, DayType, Direction, NextTrains, SubwayDeparture, SubwayScheduleProvider,
    SubwayStation,
};
use serde_json::Value;

use crate::{text_field, TagoHttp};

const SUBWAY_SERVICE: &str = "SubwayInfoService";
/// A full day's timetable fits in one page
const SCHEDULE_ROWS: u32 = 500;
const PREVIEW_TRAINS: usize = 3;

#[derive(Clone)]
pub struct TagoSubwayClient {
    http: TagoHttp,
}

impl TagoSubwayClient {
    pub fn new(service_key: String) -> Self {
        Self {
            http: TagoHttp::new(service_key),
        }
    }

    /// Station keyword search (`getKwrdFndSubwaySttnList`)
    pub async fn get_station_list(&self, name: &str) -> Result<Vec<SubwayStation>, DashboardError> {
        let items = self
            .http
            .get_items(
                SUBWAY_SERVICE,
                "getKwrdFndSubwaySttnList",
                &[
                    ("pageNo", "1".to_string()),
                    ("numOfRows", "10".to_string()),
                    ("subwayStationName", name.to_string()),
                ],
            )
            .await?;

        Ok(items
            .iter()
            .map(|it| SubwayStation {
                subway_station_id: text_field(it, &["subwayStationId"]),
                subway_station_name: text_field(it, &["subwayStationName"]),
                subway_route_name: text_field(it, &["subwayRouteName"]),
            })
            .collect())
    }

    /// Full-day timetable for one direction (`getSubwaySttnAcctoSchdulList`), sorted by departure
    pub async fn get_schedule(
        &self,
        station_id: &str,
        day_type: DayType,
        direction: Direction,
    ) -> Result<Vec<SubwayDeparture>, DashboardError> {
        let items = self
            .http
            .get_items(
                SUBWAY_SERVICE,
                "getSubwaySttnAcctoSchdulList",
                &[
                    ("pageNo", "1".to_string()),
                    ("numOfRows", SCHEDULE_ROWS.to_string()),
                    ("subwayStationId", station_id.to_string()),
                    ("dailyTypeCode", day_type.code().to_string()),
                    ("upDownTypeCode", direction.code().to_string()),
                ],
            )
            .await?;

        Ok(parse_schedule(&items))
    }

    /// Next departures in both directions, fetched concurrently.
    pub async fn get_next_trains(
        &self,
        station_id: &str,
        now: NaiveDateTime,
    ) -> Result<NextTrains, DashboardError> {
        let day_type = DayType::from_weekday(now.weekday());
        let now_min = now.hour() * 60 + now.minute();

        let (up, down) = tokio::join!(
            self.get_schedule(station_id, day_type, Direction::Up),
            self.get_schedule(station_id, day_type, Direction::Down),
        );

        Ok(NextTrains {
            up: upcoming_departures(&up?, now_min, PREVIEW_TRAINS),
            down: upcoming_departures(&down?, now_min, PREVIEW_TRAINS),
            day_type,
        })
    }
}

#[async_trait]
impl SubwayScheduleProvider for TagoSubwayClient {
    async fn search_stations(&self, name: &str) -> Result<Vec<SubwayStation>, DashboardError> {
        self.get_station_list(name).await
    }

    async fn next_trains(&self, station_id: &str, now: NaiveDateTime) -> Result<NextTrains, DashboardError> {
        self.get_next_trains(station_id, now).await
    }
}

/// First `limit` departures at or after `now_min`, with ETAs filled in.
///
/// Departures past midnight are listed by the API as 00xx and sort to the
/// start of the day; late-night service is not wrapped.
pub fn upcoming_departures(schedule: &[SubwayDeparture], now_min: u32, limit: usize) -> Vec<SubwayDeparture> {
    schedule
        .iter()
        .filter(|d| d.minutes >= now_min)
        .take(limit)
        .map(|d| SubwayDeparture {
            eta_min: Some(d.minutes.saturating_sub(now_min)),
            ..d.clone()
        })
        .collect()
}

fn parse_schedule(items: &[Value]) -> Vec<SubwayDeparture> {
    let mut schedule: Vec<SubwayDeparture> = items.iter().filter_map(parse_departure).collect();
    schedule.sort_by_key(|d| d.minutes);
    schedule
}

/// `depTime` is HHMMSS; entries without a usable time are dropped.
fn parse_departure(item: &Value) -> Option<SubwayDeparture> {
    let dep_time = text_field(item, &["depTime"])?;
    let hh: u32 = dep_time.get(0..2)?.parse().ok()?;
    let mm: u32 = dep_time.get(2..4)?.parse().ok()?;

    Some(SubwayDeparture {
        arr_time: text_field(item, &["arrTime"]),
        end_station_nm: text_field(item, &["endSubwayStationNm"]),
        station_nm: text_field(item, &["subwayStationNm"]),
        minutes: hh * 60 + mm,
        eta_min: None,
        dep_time,
    })
}
