//! Saved reporting responses on disk, one file per fetch unit.

use std::path::Path;

use adpulse_core::response::parse_records;
use adpulse_core::{CampaignRecord, InsightsResult};
use tracing::debug;

/// Read and parse one saved response body.
pub async fn load_response_file(path: impl AsRef<Path>) -> InsightsResult<Vec<CampaignRecord>> {
    let path = path.as_ref();
    let body = tokio::fs::read_to_string(path).await?;
    let records = parse_records(&body)?;
    debug!(path = %path.display(), rows = records.len(), "Loaded response file");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use adpulse_core::InsightsError;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("adpulse-{}-{name}", std::process::id()))
    }

    #[tokio::test]
    async fn test_load_response_file() {
        let path = temp_path("day.json");
        tokio::fs::write(
            &path,
            r#"{"data": [{"date_start": "2025-01-01", "spend": "12.5", "clicks": "3"}]}"#,
        )
        .await
        .unwrap();

        let records = load_response_file(&path).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].clicks, 3);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = load_response_file(temp_path("missing.json")).await.unwrap_err();
        assert!(matches!(err, InsightsError::Io(_)));
    }

    #[tokio::test]
    async fn test_garbage_file_is_invalid_response() {
        let path = temp_path("garbage.json");
        tokio::fs::write(&path, "<html>rate limited</html>").await.unwrap();
        let err = load_response_file(&path).await.unwrap_err();
        assert!(matches!(err, InsightsError::InvalidResponse(_)));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
