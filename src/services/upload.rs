use http::Method;

use crate::{
    error::Result,
    gateway::RequestBody,
    models::{
        analysis::AnalysisResult,
        file::UploadFile,
        user::{User, UserPatch},
    },
    state::AppState,
    validation::upload::validate_image,
};

/// Sends one image for server-side analysis.
///
/// Non-image or empty files are rejected locally without a request. A
/// failed analysis leaves all prior state unchanged.
pub async fn analyze(state: &AppState, file: &UploadFile) -> Result<AnalysisResult> {
    validate_image(file)?;
    let _in_flight = state.upload_flow.begin()?;

    tracing::info!("🔬 Analyzing {} ({} bytes)", file.file_name, file.bytes.len());

    let result: AnalysisResult = state
        .gateway
        .request(
            "/upload/",
            Method::POST,
            RequestBody::Multipart {
                field: "file",
                files: std::slice::from_ref(file),
            },
        )
        .await?;

    tracing::info!("✅ Analysis complete: {} objects", result.objects_count);
    Ok(result)
}

/// Merges the analysis counter reported by `result` into the cached user.
///
/// Returns the updated user, or `None` when the result carries no counter.
pub fn record_analysis(state: &AppState, result: &AnalysisResult) -> Result<Option<User>> {
    let Some(analysis_count) = result.analysis_count else {
        return Ok(None);
    };

    let user = state.session.update_user(UserPatch {
        analysis_count: Some(analysis_count),
        ..Default::default()
    })?;
    Ok(Some(user))
}
