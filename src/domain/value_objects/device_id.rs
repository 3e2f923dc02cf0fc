//! # DeviceId Value Object
//!
//! IoTデバイスIDのバリューオブジェクト

use std::fmt;

use crate::domain::errors::ValidationError;

const TARGET: &str = "device id";
const MAX_LENGTH: usize = 128;
const RESERVED_IDS: [&str; 2] = ["$edgeAgent", "$edgeHub"];

/// デバイスID
///
/// `/` を含む場合は `device/module` 形式（Edgeモジュール）でなければならない。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// 検証済みのデバイスIDを作成
    ///
    /// # Errors
    ///
    /// 長さ・文字種・先頭末尾・連続記号・Edgeモジュール形式の規則に違反した場合
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Edgeモジュール形式（`{device_id}/{module_id}`）のIDを作成
    pub fn edge_module(device_id: &str, module_id: &str) -> Result<Self, ValidationError> {
        if device_id.trim().is_empty() || module_id.trim().is_empty() {
            return Err(ValidationError::InvalidEdgeModuleFormat(format!(
                "{}/{}",
                device_id, module_id
            )));
        }
        Self::new(format!("{}/{}", device_id, module_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// IoT Edgeの予約済みID（`$edgeAgent`, `$edgeHub`）かどうか
    pub fn is_reserved(&self) -> bool {
        RESERVED_IDS
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(&self.0))
    }

    pub fn is_edge_module(&self) -> bool {
        self.0.contains('/')
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

        if !value.chars().all(is_device_char) {
            return Err(ValidationError::InvalidCharacters {
                target: TARGET,
                value: value.to_string(),
            });
        }

        for boundary in ['.', '-', '_'] {
            if value.starts_with(boundary) || value.ends_with(boundary) {
                return Err(ValidationError::DeviceIdBoundary {
                    boundary,
                    value: value.to_string(),
                });
            }
        }

        if ["..", "--", "__"].iter().any(|pair| value.contains(pair)) {
            return Err(ValidationError::ConsecutiveSpecialCharacters(
                value.to_string(),
            ));
        }

        if value.contains('/') {
            let parts: Vec<&str> = value.split('/').collect();
            if parts.len() != 2 || parts.iter().any(|part| part.is_empty()) {
                return Err(ValidationError::InvalidEdgeModuleFormat(value.to_string()));
            }
        }

        Ok(())
    }
}

fn is_device_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '/' | '$')
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for DeviceId {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
