//! # BlobName Value Object
//!
//! アップロード先Blob名のバリューオブジェクト

use std::fmt;

use chrono::NaiveDate;

use super::device_id::DeviceId;
use crate::domain::errors::ValidationError;

const TARGET: &str = "blob name";
const MAX_LENGTH: usize = 1024;
const RESERVED_NAMES: [&str; 2] = [".", ".."];

/// Blob名
///
/// 構築時に一度だけ検証される。構築後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlobName(String);

impl BlobName {
    /// 検証済みのBlob名を作成
    ///
    /// # Errors
    ///
    /// 長さ・文字種・予約名・スラッシュ・ピリオドの規則に違反した場合
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// 日付からログファイル用のBlob名（`yyyy-MM-dd.log`）を作成
    pub fn for_log_file(date: NaiveDate) -> Result<Self, ValidationError> {
        Self::new(format!("{}.log", date.format("%Y-%m-%d")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// デバイスIDを前置した完全なBlob名（`<device>/<blob>`）
    pub fn full_blob_name(&self, device_id: &DeviceId) -> String {
        format!("{}/{}", device_id.as_str(), self.0)
    }

    fn validate(value: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { target: TARGET });
        }

        let length = value.chars().count();
        if length > MAX_LENGTH {
            return Err(ValidationError::InvalidLength {
                target: TARGET,
                max: MAX_LENGTH,
                actual: length,
            });
        }

        if !value.chars().all(is_blob_char) {
            return Err(ValidationError::InvalidCharacters {
                target: TARGET,
                value: value.to_string(),
            });
        }

        if RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(value))
        {
            return Err(ValidationError::ReservedName(value.to_string()));
        }

        if value.contains("//") {
            return Err(ValidationError::ConsecutiveSlashes(value.to_string()));
        }

        if value.starts_with('/') || value.ends_with('/') {
            return Err(ValidationError::LeadingOrTrailingSlash(value.to_string()));
        }

        if value
            .split('/')
            .any(|segment| segment.starts_with('.') || segment.ends_with('.'))
        {
            return Err(ValidationError::SegmentPeriod(value.to_string()));
        }

        Ok(())
    }
}

fn is_blob_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/')
}

impl fmt::Display for BlobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for BlobName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for BlobName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_nested_name() {
        let name = BlobName::new("a/b.log").unwrap();
        assert_eq!(name.as_str(), "a/b.log");
        assert_eq!(name.to_string(), "a/b.log");
    }

    #[test]
    fn test_consecutive_slashes_rejected() {
        let err = BlobName::new("a//b.log").unwrap_err();
        assert!(matches!(err, ValidationError::ConsecutiveSlashes(_)));
        assert!(err.to_string().contains("consecutive slashes"));
    }

    #[test]
    fn test_empty_and_whitespace_rejected() {
        assert!(matches!(
            BlobName::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            BlobName::new("   ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn test_length_limits() {
        assert!(BlobName::new("a".repeat(1024)).is_ok());
        let err = BlobName::new("a".repeat(1025)).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidLength { actual: 1025, .. }
        ));
    }

    #[test]
    fn test_invalid_characters_rejected() {
        for value in ["a b.log", "file?.log", "ログ.log", "a\\b.log"] {
            assert!(
                matches!(
                    BlobName::new(value).unwrap_err(),
                    ValidationError::InvalidCharacters { .. }
                ),
                "{} should be rejected",
                value
            );
        }
    }

    #[test]
    fn test_reserved_names_rejected() {
        assert!(matches!(
            BlobName::new(".").unwrap_err(),
            ValidationError::ReservedName(_)
        ));
        let err = BlobName::new("..").unwrap_err();
        assert!(err.to_string().contains("reserved name"));
    }

    #[test]
    fn test_leading_or_trailing_slash_rejected() {
        assert!(matches!(
            BlobName::new("/a.log").unwrap_err(),
            ValidationError::LeadingOrTrailingSlash(_)
        ));
        assert!(matches!(
            BlobName::new("dir/").unwrap_err(),
            ValidationError::LeadingOrTrailingSlash(_)
        ));
    }

    #[test]
    fn test_segment_period_rules() {
        assert!(matches!(
            BlobName::new("dir/.hidden").unwrap_err(),
            ValidationError::SegmentPeriod(_)
        ));
        assert!(matches!(
            BlobName::new("dir./file.log").unwrap_err(),
            ValidationError::SegmentPeriod(_)
        ));
        assert!(BlobName::new("dir/file.v2.log").is_ok());
    }

    #[test]
    fn test_for_log_file() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        let name = BlobName::for_log_file(date).unwrap();
        assert_eq!(name.as_str(), "2024-12-25.log");
    }

    #[test]
    fn test_full_blob_name() {
        let device = DeviceId::new("device-001").unwrap();
        let name = BlobName::new("2024-12-25.log").unwrap();
        assert_eq!(name.full_blob_name(&device), "device-001/2024-12-25.log");
    }
}
