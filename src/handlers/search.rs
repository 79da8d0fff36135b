use std::path::PathBuf;

use crate::{
    error::Result,
    models::{file::UploadFile, search::ImageRecord},
    services::search::{self as search_service, AreaQuery},
    state::AppState,
    validation::search::CoordinateQuery,
};

/// Handles `geoportal search coords`.
pub async fn by_coordinates(state: &AppState, query: CoordinateQuery) -> Result<()> {
    let results = search_service::search_by_coordinates(state, &query).await?;
    print_results(&results);
    Ok(())
}

/// Handles `geoportal search images`.
pub async fn by_images(state: &AppState, paths: &[PathBuf]) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        files.push(UploadFile::from_path(path).await?);
    }

    let outcome = search_service::upload_and_search(state, &files).await?;
    println!("Files uploaded successfully: {}", outcome.uploaded.len());
    print_results(&outcome.results);
    Ok(())
}

/// Handles `geoportal search address`.
pub async fn by_address(state: &AppState, query: AreaQuery) -> Result<()> {
    let results = search_service::search_area(state, &query).await?;
    print_results(&results);
    Ok(())
}

/// Handles `geoportal search history`.
pub async fn history(state: &AppState) -> Result<()> {
    let entries = search_service::history(state).await?;
    if entries.is_empty() {
        println!("No searches yet.");
        return Ok(());
    }

    for entry in entries {
        println!(
            "#{} {} {} ({} results)",
            entry.id,
            entry.created_at.format("%Y-%m-%d %H:%M"),
            entry.query_type,
            entry.results_count
        );
    }
    Ok(())
}

fn print_results(results: &[ImageRecord]) {
    if results.is_empty() {
        println!("No images found.");
        return;
    }

    println!("Found {} images:", results.len());
    for (index, image) in results.iter().enumerate() {
        println!(
            "{:>3}. {}",
            index + 1,
            image.filename.as_deref().unwrap_or("Image")
        );
        if let (Some(lat), Some(lon)) = (image.latitude, image.longitude) {
            println!("     📍 {:.6}, {:.6}", lat, lon);
        }
        if let Some(address) = &image.address {
            println!("     🏠 {}", address);
        }
        if let Some(distance) = image.distance_km {
            println!("     ↔ {} km", distance);
        }
        if let Some(created_at) = image.created_at {
            println!("     📅 {}", created_at.format("%Y-%m-%d"));
        }
        match &image.download_url {
            Some(url) => println!("     🔗 {}", url),
            None => println!("     (no preview)"),
        }
    }
}
