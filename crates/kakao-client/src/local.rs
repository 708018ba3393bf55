use async_trait::async_trait;
use dashboard_core::{AddressMatch, Coordinates, DashboardError, Place, PlaceSearchProvider};
use serde::Deserialize;
use std::time::Duration;

use crate::KakaoHttp;

const BASE_URL: &str = "https://dapi.kakao.com";
/// Fetch more than we return so re-ranking has room to work
const FETCH_SIZE: u32 = 10;
const MAX_RESULTS: usize = 5;

#[derive(Clone)]
pub struct KakaoLocalClient {
    http: KakaoHttp,
    base_url: String,
}

impl KakaoLocalClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: KakaoHttp::new(api_key, Duration::from_secs(5)),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Keyword search, re-ranked so names matching the query come first.
    pub async fn keyword(
        &self,
        query: &str,
        near: Option<Coordinates>,
    ) -> Result<Vec<Place>, DashboardError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DashboardError::InvalidInput("Empty query".to_string()));
        }

        let mut params = vec![
            ("query", query.to_string()),
            ("size", FETCH_SIZE.to_string()),
            ("sort", "accuracy".to_string()),
        ];
        if let Some(center) = near {
            params.push(("x", center.lon.to_string()));
            params.push(("y", center.lat.to_string()));
        }

        let url = format!("{}/v2/local/search/keyword.json", self.base_url);
        let response: SearchResponse<KeywordDocument> = self.http.get_json(&url, &params).await?;

        if response.documents.is_empty() {
            return Err(DashboardError::NotFound("No results found".to_string()));
        }

        let places: Vec<Place> = response.documents.into_iter().map(Place::from).collect();
        let mut ranked = rerank_places(places, query);
        ranked.truncate(MAX_RESULTS);
        Ok(ranked)
    }

    /// Road or lot address to coordinates (first match)
    pub async fn address(&self, query: &str) -> Result<AddressMatch, DashboardError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(DashboardError::InvalidInput("Empty query".to_string()));
        }

        let url = format!("{}/v2/local/search/address.json", self.base_url);
        let response: SearchResponse<AddressDocument> = self
            .http
            .get_json(&url, &[("query", query.to_string())])
            .await?;

        let doc = response
            .documents
            .into_iter()
            .next()
            .ok_or_else(|| DashboardError::NotFound("No results found".to_string()))?;

        Ok(AddressMatch {
            address: doc.address_name,
            lat: parse_coord(&doc.y),
            lon: parse_coord(&doc.x),
        })
    }
}

#[async_trait]
impl PlaceSearchProvider for KakaoLocalClient {
    async fn search_keyword(
        &self,
        query: &str,
        near: Option<Coordinates>,
    ) -> Result<Vec<Place>, DashboardError> {
        self.keyword(query, near).await
    }

    async fn search_address(&self, query: &str) -> Result<AddressMatch, DashboardError> {
        self.address(query).await
    }
}

/// Stable sort by match quality: exact name, prefix, substring, then the rest.
pub fn rerank_places(mut places: Vec<Place>, query: &str) -> Vec<Place> {
    let query = query.to_lowercase();
    places.sort_by_key(|p| match_rank(&p.name.to_lowercase(), &query));
    places
}

fn match_rank(name: &str, query: &str) -> u8 {
    if name == query {
        0
    } else if name.starts_with(query) {
        1
    } else if name.contains(query) {
        2
    } else {
        3
    }
}

fn parse_coord(raw: &str) -> f64 {
    raw.parse().unwrap_or(0.0)
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    #[serde(default = "Vec::new")]
    documents: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct KeywordDocument {
    #[serde(default)]
    place_name: String,
    #[serde(default)]
    road_address_name: String,
    #[serde(default)]
    address_name: String,
    /// Longitude as text
    #[serde(default)]
    x: String,
    /// Latitude as text
    #[serde(default)]
    y: String,
    #[serde(default)]
    category_group_name: String,
    #[serde(default)]
    phone: String,
}

impl From<KeywordDocument> for Place {
    fn from(doc: KeywordDocument) -> Self {
        let address = if doc.road_address_name.is_empty() {
            doc.address_name
        } else {
            doc.road_address_name
        };
        Place {
            name: doc.place_name,
            address,
            lat: parse_coord(&doc.y),
            lon: parse_coord(&doc.x),
            category: doc.category_group_name,
            phone: doc.phone,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddressDocument {
    #[serde(default)]
    address_name: String,
    #[serde(default)]
    x: String,
    #[serde(default)]
    y: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(name: &str) -> Place {
        Place {
            name: name.to_string(),
            address: String::new(),
            lat: 0.0,
            lon: 0.0,
            category: String::new(),
            phone: String::new(),
        }
    }

    fn names(places: &[Place]) -> Vec<&str> {
        places.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_rerank_priority_order() {
        let places = vec![
            place("Central Busan Station"),
            place("Busan Tower"),
            place("Haeundae"),
            place("Busan"),
        ];
        let ranked = rerank_places(places, "busan");
        assert_eq!(
            names(&ranked),
            vec!["Busan", "Busan Tower", "Central Busan Station", "Haeundae"]
        );
    }

    #[test]
    fn test_rerank_is_stable_within_rank() {
        let places = vec![place("서면역 2번출구"), place("서면역 1번출구"), place("서면역")];
        let ranked = rerank_places(places, "서면역");
        assert_eq!(names(&ranked), vec!["서면역", "서면역 2번출구", "서면역 1번출구"]);
    }

    #[test]
    fn test_keyword_document_prefers_road_address() {
        let doc: KeywordDocument = serde_json::from_value(serde_json::json!({
            "place_name": "부산역",
            "road_address_name": "부산 동구 중앙대로 206",
            "address_name": "부산 동구 초량동 1187-1",
            "x": "129.041",
            "y": "35.115",
            "category_group_name": "지하철역"
        }))
        .unwrap();
        let p = Place::from(doc);
        assert_eq!(p.address, "부산 동구 중앙대로 206");
        assert_eq!(p.lat, 35.115);
        assert_eq!(p.lon, 129.041);
        assert_eq!(p.phone, "");
    }

    #[test]
    fn test_keyword_document_falls_back_to_lot_address() {
        let doc: KeywordDocument = serde_json::from_value(serde_json::json!({
            "place_name": "somewhere",
            "address_name": "lot 12",
            "x": "bad",
            "y": "35.0"
        }))
        .unwrap();
        let p = Place::from(doc);
        assert_eq!(p.address, "lot 12");
        assert_eq!(p.lon, 0.0);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let client = KakaoLocalClient::new("key".to_string());
        assert!(matches!(
            client.keyword("   ", None).await,
            Err(DashboardError::InvalidInput(_))
        ));
        assert!(matches!(client.address("").await, Err(DashboardError::InvalidInput(_))));
    }
}
