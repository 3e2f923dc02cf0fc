//! File Log Handler Implementation
//!
//! LogFileHandlerのファイルシステム実装（JSON Lines 形式で追記）

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use log::debug;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::entities::LogEntry;
use crate::domain::errors::ValidationError;
use crate::domain::repositories::LogFileHandler;
use crate::domain::value_objects::LogFilePath;

/// ファイルシステムベースのログファイルハンドラ
///
/// `<log_directory>/yyyy-MM-dd.log`（対象タイムゾーンの今日）に追記する。
pub struct FileLogHandler {
    log_directory: PathBuf,
    offset: FixedOffset,
}

impl FileLogHandler {
    /// 新しいハンドラを作成
    ///
    /// # Arguments
    ///
    /// * `log_directory` - ログディレクトリ（`~` は展開される）
    /// * `offset` - 対象タイムゾーン
    pub fn new(log_directory: impl AsRef<Path>, offset: FixedOffset) -> Self {
        let raw = log_directory.as_ref().to_string_lossy();
        let expanded = shellexpand::tilde(raw.as_ref());
        Self {
            log_directory: PathBuf::from(expanded.as_ref()),
            offset,
        }
    }

    pub fn log_directory(&self) -> &Path {
        &self.log_directory
    }

    /// 1行追記する（内部実装）
    fn append_line_internal(path: &LogFilePath, line: &str) -> Result<()> {
        path.ensure_directory_exists().with_context(|| {
            format!(
                "Failed to create log directory for {}",
                path.as_path().display()
            )
        })?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_path())
            .with_context(|| format!("Failed to open log file: {}", path))?;
        writeln!(file, "{}", line).with_context(|| format!("Failed to write log file: {}", path))?;
        Ok(())
    }
}

#[async_trait]
impl LogFileHandler for FileLogHandler {
    fn current_log_file_path(&self) -> Result<LogFilePath, ValidationError> {
        let today = Utc::now().with_timezone(&self.offset).date_naive();
        LogFilePath::for_date(&self.log_directory, today)
    }

    async fn append_log_entry(&self, entry: &LogEntry) -> Result<()> {
        let path = self.current_log_file_path()?;
        let line = entry
            .in_zone(self.offset)
            .to_json_line()
            .context("Failed to serialize log entry")?;

        debug!("Appending to {}: {}", path, line);

        // 同期I/Oなので、tokio::task::spawn_blockingでラップ
        tokio::task::spawn_blocking(move || Self::append_line_internal(&path, &line))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to spawn blocking task: {}", e))?
    }
}
