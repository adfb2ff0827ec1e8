//! File-backed export sink

use async_trait::async_trait;
use cdr_core::{traits::ExportSink, AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, instrument};

/// Writes each export as `{dir}/{key}.csv`, one line per record, no header
pub struct FileExportSink {
    dir: PathBuf,
}

impl FileExportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path an export with `key` is written to
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", key))
    }
}

#[async_trait]
impl ExportSink for FileExportSink {
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    async fn write_lines(&self, key: &str, lines: &[String]) -> AppResult<String> {
        let io_error = |e: std::io::Error| {
            error!("Export {} failed: {}", key, e);
            AppError::ExportIo {
                key: key.to_string(),
                reason: e.to_string(),
            }
        };

        tokio::fs::create_dir_all(&self.dir).await.map_err(io_error)?;

        let path = self.path_for(key);
        let mut contents = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
        for line in lines {
            contents.push_str(line);
            contents.push('\n');
        }

        let mut file = tokio::fs::File::create(&path).await.map_err(io_error)?;
        file.write_all(contents.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;

        debug!("Wrote {} lines to {}", lines.len(), path.display());
        Ok(path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::parse_export_line;

    #[tokio::test]
    async fn test_writes_lines_under_key() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileExportSink::new(dir.path().join("reports"));

        let lines = vec![
            "01,111,222,2024-03-01T10:00:00Z,2024-03-01T10:05:00Z".to_string(),
            "02,333,111,2024-03-02T09:00:00Z,2024-03-02T09:01:00Z".to_string(),
        ];
        let location = sink.write_lines("111_abc", &lines).await.unwrap();

        let path = sink.path_for("111_abc");
        assert_eq!(location, path.display().to_string());
        assert!(path.ends_with("reports/111_abc.csv"));

        let written = std::fs::read_to_string(&path).unwrap();
        let read_back: Vec<&str> = written.lines().collect();
        assert_eq!(read_back, lines);
        for line in read_back {
            assert!(parse_export_line(line).is_ok());
        }
    }

    #[tokio::test]
    async fn test_unwritable_dir_is_export_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let sink = FileExportSink::new(&blocker);
        let result = sink.write_lines("k", &["x".to_string()]).await;

        assert!(matches!(result, Err(AppError::ExportIo { ref key, .. }) if key == "k"));
    }
}
