//! # Domain Events
//!
//! ドメインイベントの定義
//!
//! 各イベントは `EventKind` による明示的な識別子を持ち、
//! ディスパッチャはこの識別子でハンドラを引く（実行時の型検査は行わない）。

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::entities::log_entry::LogEntry;
use super::value_objects::{BlobName, LogFilePath};

/// イベント種別の識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    LogWrittenToFile,
    FileUploaded,
    FileUploadFailed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::LogWrittenToFile => "LogWrittenToFileEvent",
            EventKind::FileUploaded => "FileUploadedEvent",
            EventKind::FileUploadFailed => "FileUploadFailedEvent",
        };
        f.write_str(name)
    }
}

/// 全イベント共通のメタデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMetadata {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    pub fn new() -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new()
    }
}

/// ログがファイルに書き込まれた
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogWrittenToFileEvent {
    pub metadata: EventMetadata,
    pub file_path: LogFilePath,
    pub entry: LogEntry,
}

impl LogWrittenToFileEvent {
    pub fn new(file_path: LogFilePath, entry: LogEntry) -> Self {
        Self {
            metadata: EventMetadata::new(),
            file_path,
            entry,
        }
    }
}

/// ファイルのアップロードが完了した
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadedEvent {
    pub metadata: EventMetadata,
    pub file_path: LogFilePath,
    pub blob_name: BlobName,
    pub blob_uri: String,
}

impl FileUploadedEvent {
    pub fn new(file_path: LogFilePath, blob_name: BlobName, blob_uri: impl Into<String>) -> Self {
        Self {
            metadata: EventMetadata::new(),
            file_path,
            blob_name,
            blob_uri: blob_uri.into(),
        }
    }
}

/// ファイルのアップロードに失敗した
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadFailedEvent {
    pub metadata: EventMetadata,
    pub file_path: LogFilePath,
    pub error_message: String,
}

impl FileUploadFailedEvent {
    pub fn new(file_path: LogFilePath, error_message: impl Into<String>) -> Self {
        Self {
            metadata: EventMetadata::new(),
            file_path,
            error_message: error_message.into(),
        }
    }
}

/// ドメインイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainEvent {
    LogWrittenToFile(LogWrittenToFileEvent),
    FileUploaded(FileUploadedEvent),
    FileUploadFailed(FileUploadFailedEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::LogWrittenToFile(_) => EventKind::LogWrittenToFile,
            DomainEvent::FileUploaded(_) => EventKind::FileUploaded,
            DomainEvent::FileUploadFailed(_) => EventKind::FileUploadFailed,
        }
    }

    pub fn metadata(&self) -> &EventMetadata {
        match self {
            DomainEvent::LogWrittenToFile(e) => &e.metadata,
            DomainEvent::FileUploaded(e) => &e.metadata,
            DomainEvent::FileUploadFailed(e) => &e.metadata,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.metadata().event_id
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata().occurred_at
    }
}

/// 具体的なイベント型
///
/// `KIND` がレジストリのキーになり、`from_domain` で列挙子から取り出す。
pub trait Event: fmt::Debug + Send + Sync + 'static {
    const KIND: EventKind;

    fn from_domain(event: &DomainEvent) -> Option<&Self>;
}

impl Event for LogWrittenToFileEvent {
    const KIND: EventKind = EventKind::LogWrittenToFile;

    fn from_domain(event: &DomainEvent) -> Option<&Self> {
        match event {
            DomainEvent::LogWrittenToFile(e) => Some(e),
            _ => None,
        }
    }
}

impl Event for FileUploadedEvent {
    const KIND: EventKind = EventKind::FileUploaded;

    fn from_domain(event: &DomainEvent) -> Option<&Self> {
        match event {
            DomainEvent::FileUploaded(e) => Some(e),
            _ => None,
        }
    }
}

impl Event for FileUploadFailedEvent {
    const KIND: EventKind = EventKind::FileUploadFailed;

    fn from_domain(event: &DomainEvent) -> Option<&Self> {
        match event {
            DomainEvent::FileUploadFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<LogWrittenToFileEvent> for DomainEvent {
    fn from(event: LogWrittenToFileEvent) -> Self {
        DomainEvent::LogWrittenToFile(event)
    }
}

impl From<FileUploadedEvent> for DomainEvent {
    fn from(event: FileUploadedEvent) -> Self {
        DomainEvent::FileUploaded(event)
    }
}

impl From<FileUploadFailedEvent> for DomainEvent {
    fn from(event: FileUploadFailedEvent) -> Self {
        DomainEvent::FileUploadFailed(event)
    }
}
