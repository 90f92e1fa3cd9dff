use std::path::Path;

use crate::api::errors::ApiError;

/// Returns the lowercased extension when it is on the allow-list.
pub(crate) fn validate_copy_extension(
    filename: &str,
    allowed_extensions: &[String],
) -> Result<String, ApiError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ApiError::BadRequest(format!("File '{filename}' must have an extension")))?;

    if allowed_extensions.iter().any(|allowed| allowed == &extension) {
        Ok(extension)
    } else {
        Err(ApiError::BadRequest(format!("File extension '{extension}' is not allowed")))
    }
}

pub(crate) fn sanitized_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let sanitized: String = base
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '_' || *c == '-')
        .collect();
    let sanitized = sanitized.trim_start_matches('.');

    if sanitized.is_empty() {
        "upload".to_string()
    } else {
        sanitized.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["pdf".to_string(), "png".to_string()]
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(validate_copy_extension("Scan.PDF", &allowed()).unwrap(), "pdf");
    }

    #[test]
    fn extension_check_rejects_unknown_and_missing() {
        assert!(matches!(
            validate_copy_extension("notes.docx", &allowed()),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(validate_copy_extension("README", &allowed()), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn sanitized_filename_filters_disallowed_chars() {
        assert_eq!(sanitized_filename("copy (final)!.png"), "copyfinal.png");
    }

    #[test]
    fn sanitized_filename_drops_directories() {
        assert_eq!(sanitized_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitized_filename("C:\\scans\\copy-1.pdf"), "copy-1.pdf");
    }

    #[test]
    fn sanitized_filename_falls_back_on_empty() {
        assert_eq!(sanitized_filename("###"), "upload");
        assert_eq!(sanitized_filename(".."), "upload");
    }
}
