use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One image returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "crate::models::timestamp::option::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Search responses come either wrapped in `{results}` or as a bare list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SearchResponse {
    Wrapped { results: Vec<ImageRecord> },
    Bare(Vec<ImageRecord>),
}

impl SearchResponse {
    pub fn into_results(self) -> Vec<ImageRecord> {
        match self {
            SearchResponse::Wrapped { results } => results,
            SearchResponse::Bare(results) => results,
        }
    }
}

/// How the server ranks matches of a general search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPrinciple {
    /// Everything inside the radius, newest first.
    #[default]
    Radius,
    /// Everything, closest first.
    Nearest,
}

/// Body of `POST /search/` for a coordinate or address search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub radius_km: f64,
    pub search_principle: SearchPrinciple,
}

/// Body of `POST /search/` for a similarity search over uploaded files.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilaritySearchRequest {
    pub uploaded_files: Vec<i64>,
}

/// One entry of `GET /search/history`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHistoryEntry {
    pub id: i64,
    pub query_type: String,
    #[serde(default)]
    pub params: Option<sonic_rs::Value>,
    pub results_count: u32,
    #[serde(deserialize_with = "crate::models::timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}
