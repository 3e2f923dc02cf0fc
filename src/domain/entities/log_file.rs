//! # LogFile Aggregate
//!
//! 1日分のログエントリを保持する集約ルート

use std::path::Path;

use chrono::{FixedOffset, NaiveDate};

use super::log_entry::LogEntry;
use crate::domain::errors::ValidationError;
use crate::domain::events::{DomainEvent, LogWrittenToFileEvent};
use crate::domain::value_objects::LogFilePath;

/// 日次ログファイル
///
/// エントリは `add_entry` でのみ追加される。追加時に発生したドメインイベントは
/// 内部にバッファされ、外部のディスパッチ処理が取り出す。
#[derive(Debug, Clone)]
pub struct LogFile {
    date: NaiveDate,
    offset: FixedOffset,
    file_path: LogFilePath,
    entries: Vec<LogEntry>,
    pending_events: Vec<DomainEvent>,
}

impl LogFile {
    /// カレントディレクトリ上の `yyyy-MM-dd.log` を対象に作成
    pub fn new(date: NaiveDate, offset: FixedOffset) -> Result<Self, ValidationError> {
        let file_path = LogFilePath::new(format!("{}.log", date.format("%Y-%m-%d")))?;
        Ok(Self::with_path(date, offset, file_path))
    }

    /// 指定ディレクトリ上の `yyyy-MM-dd.log` を対象に作成
    pub fn in_directory(
        base_dir: impl AsRef<Path>,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<Self, ValidationError> {
        let file_path = LogFilePath::for_date(base_dir, date)?;
        Ok(Self::with_path(date, offset, file_path))
    }

    fn with_path(date: NaiveDate, offset: FixedOffset, file_path: LogFilePath) -> Self {
        Self {
            date,
            offset,
            file_path,
            entries: Vec::new(),
            pending_events: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn file_path(&self) -> &LogFilePath {
        &self.file_path
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.pending_events
    }

    /// エントリを追加
    ///
    /// エントリの暦日（対象タイムゾーン換算）がファイルの日付と一致する場合のみ追加し、
    /// `LogWrittenToFileEvent` をバッファする。
    ///
    /// # Errors
    ///
    /// 日付が一致しない場合は `ValidationError::DateMismatch`。エントリは保存されない。
    pub fn add_entry(&mut self, entry: LogEntry) -> Result<(), ValidationError> {
        self.check_entry(&entry)?;

        self.pending_events.push(
            LogWrittenToFileEvent::new(self.file_path.clone(), entry.clone()).into(),
        );
        self.entries.push(entry);
        Ok(())
    }

    /// エントリがこのファイルに追加できるかを検査する（状態は変えない）
    ///
    /// # Errors
    ///
    /// 日付が一致しない場合は `ValidationError::DateMismatch`
    pub fn check_entry(&self, entry: &LogEntry) -> Result<(), ValidationError> {
        let entry_date = entry.local_date(self.offset);
        if entry_date != self.date {
            return Err(ValidationError::DateMismatch {
                entry_date,
                file_date: self.date,
            });
        }
        Ok(())
    }

    /// バッファされたイベントを取り出す（バッファは空になる）
    pub fn take_pending_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn clear_events(&mut self) {
        self.pending_events.clear();
    }

    /// 全エントリを JSON Lines として連結
    pub fn content(&self) -> serde_json::Result<String> {
        let lines = self
            .entries
            .iter()
            .map(|entry| entry.in_zone(self.offset).to_json_line())
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::log_entry::EventType;
    use crate::domain::events::EventKind;
    use chrono::TimeZone;

    fn jst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn christmas() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 25).unwrap()
    }

    fn entry_at(hour: u32, comment: &str) -> LogEntry {
        let timestamp = jst().with_ymd_and_hms(2024, 12, 25, hour, 0, 0).unwrap();
        LogEntry::new(EventType::Start, comment, timestamp)
    }

    #[test]
    fn test_new_derives_file_path() {
        let log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();
        assert_eq!(
            log_file.file_path().as_path(),
            Path::new("/data/logs/2024-12-25.log")
        );

        let cwd_file = LogFile::new(christmas(), jst()).unwrap();
        assert_eq!(cwd_file.file_path().file_name(), "2024-12-25.log");
        assert!(cwd_file.entries().is_empty());
        assert!(cwd_file.pending_events().is_empty());
    }

    #[test]
    fn test_add_entry_appends_in_order_and_buffers_events() {
        let mut log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();

        log_file.add_entry(entry_at(9, "first")).unwrap();
        log_file.add_entry(entry_at(10, "second")).unwrap();

        let comments: Vec<&str> = log_file.entries().iter().map(|e| e.comment()).collect();
        assert_eq!(comments, vec!["first", "second"]);

        assert_eq!(log_file.pending_events().len(), 2);
        match &log_file.pending_events()[1] {
            DomainEvent::LogWrittenToFile(event) => {
                assert_eq!(event.entry.comment(), "second");
                assert_eq!(&event.file_path, log_file.file_path());
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_add_entry_rejects_other_day() {
        let mut log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();

        // 2024-12-25 16:00 UTC は JST で 2024-12-26 01:00
        let utc = FixedOffset::east_opt(0).unwrap();
        let timestamp = utc.with_ymd_and_hms(2024, 12, 25, 16, 0, 0).unwrap();
        let entry = LogEntry::new(EventType::Warn, "late", timestamp);

        let err = log_file.add_entry(entry).unwrap_err();

        assert!(matches!(err, ValidationError::DateMismatch { .. }));
        let message = err.to_string();
        assert!(message.contains("2024-12-26"));
        assert!(message.contains("2024-12-25"));
        assert!(log_file.entries().is_empty());
        assert!(log_file.pending_events().is_empty());
    }

    #[test]
    fn test_check_entry_leaves_state_untouched() {
        let log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let late = LogEntry::new(
            EventType::Warn,
            "late",
            utc.with_ymd_and_hms(2024, 12, 25, 16, 0, 0).unwrap(),
        );

        assert!(log_file.check_entry(&entry_at(9, "first")).is_ok());
        assert!(matches!(
            log_file.check_entry(&late),
            Err(ValidationError::DateMismatch { .. })
        ));
        assert!(log_file.entries().is_empty());
        assert!(log_file.pending_events().is_empty());
    }

    #[test]
    fn test_take_pending_events_drains_buffer() {
        let mut log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();
        log_file.add_entry(entry_at(9, "first")).unwrap();

        let events = log_file.take_pending_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind(), EventKind::LogWrittenToFile);
        assert!(log_file.pending_events().is_empty());
        assert_eq!(log_file.entries().len(), 1);
    }

    #[test]
    fn test_clear_events() {
        let mut log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();
        log_file.add_entry(entry_at(9, "first")).unwrap();
        log_file.clear_events();
        assert!(log_file.pending_events().is_empty());
    }

    #[test]
    fn test_content_is_json_lines() {
        let mut log_file = LogFile::in_directory("/data/logs", christmas(), jst()).unwrap();
        log_file.add_entry(entry_at(9, "first")).unwrap();
        log_file.add_entry(entry_at(10, "second")).unwrap();

        let content = log_file.content().unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(r#""comment":"first""#));
        assert!(lines[1].contains("2024-12-25T10:00:00.000+09:00"));
    }
}
