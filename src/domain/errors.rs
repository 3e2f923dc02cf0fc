//! # Domain Errors
//!
//! 値オブジェクト・集約の構築時に発生する検証エラー

use chrono::NaiveDate;
use thiserror::Error;

/// 検証エラー
///
/// 値オブジェクトや集約の不変条件違反を表す。
/// 入力契約違反であり、リトライ対象にはならない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{target} cannot be empty")]
    Empty { target: &'static str },

    #[error("{target} length must be between 1 and {max} characters (actual: {actual})")]
    InvalidLength {
        target: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{target} contains invalid characters: '{value}'")]
    InvalidCharacters { target: &'static str, value: String },

    #[error("blob name '{0}' is a reserved name")]
    ReservedName(String),

    #[error("blob name cannot contain consecutive slashes: '{0}'")]
    ConsecutiveSlashes(String),

    #[error("blob name cannot start or end with a slash: '{0}'")]
    LeadingOrTrailingSlash(String),

    #[error("blob name segments cannot start or end with a period: '{0}'")]
    SegmentPeriod(String),

    #[error("device id cannot start or end with '{boundary}': '{value}'")]
    DeviceIdBoundary { boundary: char, value: String },

    #[error("device id cannot contain consecutive special characters: '{0}'")]
    ConsecutiveSpecialCharacters(String),

    #[error("edge module device id must be in the form 'deviceId/moduleId': '{0}'")]
    InvalidEdgeModuleFormat(String),

    #[error("invalid log file path: {0}")]
    InvalidPath(String),

    #[error("log file must have a .log extension (invalid extension): {0}")]
    InvalidExtension(String),

    #[error("invalid event type: '{0}'")]
    InvalidEventType(String),

    #[error("log entry date ({entry_date}) does not match log file date ({file_date})")]
    DateMismatch {
        entry_date: NaiveDate,
        file_date: NaiveDate,
    },
}

impl ValidationError {
    /// 違反したルールを表す安定したエラーコード
    pub fn code(&self) -> &'static str {
        match self {
            Self::Empty { .. } => "Validation.Empty",
            Self::InvalidLength { .. } => "Validation.InvalidLength",
            Self::InvalidCharacters { .. } => "Validation.InvalidCharacters",
            Self::ReservedName(_) => "BlobName.ReservedName",
            Self::ConsecutiveSlashes(_) => "BlobName.ConsecutiveSlashes",
            Self::LeadingOrTrailingSlash(_) => "BlobName.LeadingOrTrailingSlash",
            Self::SegmentPeriod(_) => "BlobName.SegmentPeriod",
            Self::DeviceIdBoundary { .. } => "DeviceId.Boundary",
            Self::ConsecutiveSpecialCharacters(_) => "DeviceId.ConsecutiveSpecialCharacters",
            Self::InvalidEdgeModuleFormat(_) => "DeviceId.InvalidEdgeModuleFormat",
            Self::InvalidPath(_) => "LogFilePath.InvalidFormat",
            Self::InvalidExtension(_) => "LogFilePath.InvalidExtension",
            Self::InvalidEventType(_) => "LogEntry.InvalidEventType",
            Self::DateMismatch { .. } => "LogFile.DateMismatch",
        }
    }
}
