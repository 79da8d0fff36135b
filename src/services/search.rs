use crate::{
    error::Result,
    gateway::{ApiRequest, RequestBody},
    models::{
        file::{UploadFile, UploadedFile},
        search::{
            AreaSearchRequest, ImageRecord, SearchHistoryEntry, SearchPrinciple, SearchResponse,
            SimilaritySearchRequest,
        },
    },
    state::AppState,
    validation::{
        search::{CoordinateQuery, validate_area, validate_coordinates, validate_radius},
        upload::validate_batch,
    },
};

/// The outcome of the upload-then-search flow.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSearchOutcome {
    /// Files stored by the server.
    pub uploaded: Vec<UploadedFile>,
    /// Images similar to the uploaded ones.
    pub results: Vec<ImageRecord>,
}

/// A general search around an address and/or a point.
#[derive(Debug, Clone, PartialEq)]
pub struct AreaQuery {
    pub address: Option<String>,
    pub coordinates: Option<(f64, f64)>,
    pub radius_m: u32,
    pub principle: SearchPrinciple,
}

/// Finds images within a radius of a point.
pub async fn search_by_coordinates(
    state: &AppState,
    query: &CoordinateQuery,
) -> Result<Vec<ImageRecord>> {
    validate_coordinates(query)?;
    let _in_flight = state.search_flow.begin()?;

    tracing::info!(
        "📍 Searching around ({}, {}) within {} m",
        query.latitude,
        query.longitude,
        query.radius_m
    );

    let response: SearchResponse = state
        .gateway
        .send(
            ApiRequest::post("/search/by-coordinates")
                .query("latitude", query.latitude)
                .query("longitude", query.longitude)
                .query("radius_km", query.radius_km()),
        )
        .await?;

    let results = response.into_results();
    tracing::info!("✅ Found {} images", results.len());
    Ok(results)
}

/// Uploads a batch of images, then searches for similar ones.
///
/// The search only runs once the whole batch is stored; an upload failure
/// aborts the flow before the search step.
pub async fn upload_and_search(
    state: &AppState,
    files: &[UploadFile],
) -> Result<BatchSearchOutcome> {
    validate_batch(files)?;
    let _in_flight = state.search_flow.begin()?;

    tracing::info!("📤 Uploading {} files", files.len());

    let uploaded: Vec<UploadedFile> = state
        .gateway
        .send(ApiRequest::post("/upload/").body(RequestBody::Multipart {
            field: "files",
            files,
        }))
        .await?;

    if uploaded.is_empty() {
        tracing::info!("ℹ️ Upload returned no files, skipping search");
        return Ok(BatchSearchOutcome {
            uploaded,
            results: Vec::new(),
        });
    }

    let body = RequestBody::json(&SimilaritySearchRequest {
        uploaded_files: uploaded.iter().map(|f| f.id).collect(),
    })?;
    let response: SearchResponse = state
        .gateway
        .send(ApiRequest::post("/search/").body(body))
        .await?;

    let results = response.into_results();
    tracing::info!(
        "✅ {} files uploaded, {} similar images",
        uploaded.len(),
        results.len()
    );
    Ok(BatchSearchOutcome { uploaded, results })
}

/// Searches around an address or a point, or an address pinned to a point.
///
/// A blank address counts as absent; at least one of the two is required.
pub async fn search_area(state: &AppState, query: &AreaQuery) -> Result<Vec<ImageRecord>> {
    let address = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty());
    validate_area(address, query.coordinates)?;
    validate_radius(query.radius_m)?;
    if let Some((latitude, longitude)) = query.coordinates {
        validate_coordinates(&CoordinateQuery::new(latitude, longitude, query.radius_m))?;
    }
    let _in_flight = state.search_flow.begin()?;

    tracing::info!(
        "🏠 Searching around {:?} {:?}",
        address.unwrap_or("-"),
        query.coordinates
    );

    let request = AreaSearchRequest {
        latitude: query.coordinates.map(|(lat, _)| lat),
        longitude: query.coordinates.map(|(_, lon)| lon),
        address: address.map(str::to_string),
        radius_km: f64::from(query.radius_m) / 1000.0,
        search_principle: query.principle,
    };
    let response: SearchResponse = state
        .gateway
        .send(ApiRequest::post("/search/").body(RequestBody::json(&request)?))
        .await?;

    Ok(response.into_results())
}

/// Lists the user's previous searches, newest first.
pub async fn history(state: &AppState) -> Result<Vec<SearchHistoryEntry>> {
    state.gateway.send(ApiRequest::get("/search/history")).await
}
