use crate::error::{AppError, Result};
use crate::models::file::UploadFile;

/// Validates a file selected for analysis: non-empty and declared as an image.
pub fn validate_image(file: &UploadFile) -> Result<()> {
    if file.is_empty() {
        return Err(AppError::Validation(format!(
            "{} is empty",
            file.file_name
        )));
    }

    if !file.is_image() {
        return Err(AppError::Validation(format!(
            "{} is not an image ({})",
            file.file_name, file.content_type
        )));
    }

    Ok(())
}

/// Validates a batch of files for the upload-then-search flow.
pub fn validate_batch(files: &[UploadFile]) -> Result<()> {
    if files.is_empty() {
        return Err(AppError::Validation(
            "Select at least one file to upload".to_string(),
        ));
    }

    files.iter().try_for_each(validate_image)
}
