use serde::{Deserialize, Serialize};

/// The structured outcome of `POST /upload/` for a single image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The number of objects detected in the image.
    pub objects_count: u64,
    /// The user's analysis counter after this run, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_count: Option<u32>,
}
