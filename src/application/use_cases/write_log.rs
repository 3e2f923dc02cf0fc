//! # Write Log Use Case
//!
//! ログエントリを生成して日次ログファイルへ追記するユースケース

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::application::dto::Outcome;
use crate::application::factories::LogEntryFactory;
use crate::application::services::EventDispatcher;
use crate::domain::entities::{LogEntry, LogFile};
use crate::domain::errors::ValidationError;
use crate::domain::repositories::LogFileHandler;

/// ログ書き込みユースケース
///
/// 当日の `LogFile` 集約を保持し、対象タイムゾーンで日付が変わると新しい集約に切り替える。
pub struct WriteLogCommandHandler<L: LogFileHandler> {
    log_files: Arc<L>,
    factory: Arc<LogEntryFactory>,
    dispatcher: EventDispatcher,
    current: Mutex<Option<LogFile>>,
}

impl<L: LogFileHandler> WriteLogCommandHandler<L> {
    /// 新しいユースケースを作成
    ///
    /// # Arguments
    ///
    /// * `log_files` - ログファイルハンドラ
    /// * `factory` - エントリファクトリ（対象タイムゾーンを保持）
    /// * `dispatcher` - ドメインイベントの配信先
    pub fn new(
        log_files: Arc<L>,
        factory: Arc<LogEntryFactory>,
        dispatcher: EventDispatcher,
    ) -> Self {
        Self {
            log_files,
            factory,
            dispatcher,
            current: Mutex::new(None),
        }
    }

    /// 現在時刻でエントリを1件書き込む
    pub async fn execute(&self, cancel: &CancellationToken) -> Outcome<LogEntry> {
        self.execute_at(Utc::now(), cancel).await
    }

    /// 指定時刻でエントリを1件書き込む
    ///
    /// # Returns
    ///
    /// 書き込んだエントリ。イベント配信の失敗は書き込みの失敗にはしない。
    pub async fn execute_at(
        &self,
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Outcome<LogEntry> {
        if cancel.is_cancelled() {
            return Outcome::failure("write cancelled");
        }

        let entry = self.factory.create_random(now);
        let events = {
            let mut current = self.current.lock().await;
            let log_file = match self.log_file_for(&mut current, &entry) {
                Ok(log_file) => log_file,
                Err(e) => return Outcome::failure(e.to_string()),
            };

            if let Err(e) = log_file.check_entry(&entry) {
                return Outcome::failure(e.to_string());
            }

            // ファイルへの追記が成功してから集約に反映する
            if let Err(e) = self.log_files.append_log_entry(&entry).await {
                return Outcome::failure(format!("failed to write log entry: {:#}", e));
            }

            if let Err(e) = log_file.add_entry(entry.clone()) {
                return Outcome::failure(e.to_string());
            }

            log_file.take_pending_events()
        };

        for event in events {
            let kind = event.kind();
            if let Err(e) = self.dispatcher.dispatch(event, cancel).await {
                warn!("Event {} was written but not fully handled: {}", kind, e);
            }
        }

        Outcome::success(entry)
    }

    /// エントリの日付に対応する集約を返す（必要なら作り直す）
    fn log_file_for<'a>(
        &self,
        current: &'a mut Option<LogFile>,
        entry: &LogEntry,
    ) -> Result<&'a mut LogFile, ValidationError> {
        let offset = self.factory.offset();
        let date = entry.local_date(offset);

        let stale = current.as_ref().map_or(true, |log_file| log_file.date() != date);
        if stale {
            let directory = self.log_directory()?;
            debug!("Starting log file for {} in {}", date, directory.display());
            *current = Some(LogFile::in_directory(directory, date, offset)?);
        }

        current
            .as_mut()
            .ok_or_else(|| ValidationError::InvalidPath("no log file for the current date".into()))
    }

    fn log_directory(&self) -> Result<PathBuf, ValidationError> {
        let path = self.log_files.current_log_file_path()?;
        path.directory()
            .map(|dir| dir.to_path_buf())
            .ok_or_else(|| ValidationError::InvalidPath(path.to_string()))
    }
}
