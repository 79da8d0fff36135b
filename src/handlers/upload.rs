use std::path::Path;

use crate::{
    error::Result,
    models::file::UploadFile,
    services::upload as upload_service,
    state::AppState,
};

/// Handles `geoportal analyze`.
pub async fn analyze(state: &AppState, path: &Path, content_type: Option<String>) -> Result<()> {
    let mut file = UploadFile::from_path(path).await?;
    if let Some(content_type) = content_type {
        file.content_type = content_type;
    }

    let result = upload_service::analyze(state, &file).await?;
    println!("Analysis complete! Objects found: {}", result.objects_count);

    match upload_service::record_analysis(state, &result) {
        Ok(Some(user)) => println!("Total analyses: {}", user.analysis_count),
        Ok(None) => {}
        Err(e) => {
            e.log();
            eprintln!("⚠️ Could not update the cached profile: {}", e);
        }
    }
    Ok(())
}
