//! # LogFilePath Value Object
//!
//! ログファイルパスのバリューオブジェクト（絶対パスに正規化済み）

use std::fmt;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDate;

use crate::domain::errors::ValidationError;

/// ログファイルパス
///
/// 構築時に絶対パスへ正規化され、拡張子は `.log`（大文字小文字を区別しない）。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogFilePath(PathBuf);

impl LogFilePath {
    /// 検証・正規化済みのログファイルパスを作成
    ///
    /// 相対パスはカレントディレクトリを基準に解決する。
    ///
    /// # Errors
    ///
    /// 空のパス、解決できないパス、`.log` 以外の拡張子の場合
    pub fn new(value: impl AsRef<Path>) -> Result<Self, ValidationError> {
        let path = value.as_ref();
        let raw = path.to_string_lossy();

        if raw.trim().is_empty() {
            return Err(ValidationError::Empty {
                target: "log file path",
            });
        }

        if raw.contains('\0') {
            return Err(ValidationError::InvalidPath(raw.into_owned()));
        }

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(|e| ValidationError::InvalidPath(format!("{}: {}", raw, e)))?
                .join(path)
        };
        let normalized = normalize(&absolute);

        let has_log_extension = normalized
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("log"));
        if !has_log_extension {
            return Err(ValidationError::InvalidExtension(raw.into_owned()));
        }

        Ok(Self(normalized))
    }

    /// `<base_dir>/yyyy-MM-dd.log` のパスを作成
    pub fn for_date(base_dir: impl AsRef<Path>, date: NaiveDate) -> Result<Self, ValidationError> {
        let base_dir = base_dir.as_ref();
        if base_dir.as_os_str().is_empty() {
            return Err(ValidationError::Empty {
                target: "log directory",
            });
        }
        Self::new(base_dir.join(format!("{}.log", date.format("%Y-%m-%d"))))
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// ファイル名部分（例: `2024-12-25.log`）
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn directory(&self) -> Option<&Path> {
        self.0.parent()
    }

    pub fn exists(&self) -> bool {
        self.0.is_file()
    }

    /// 親ディレクトリが存在しなければ作成
    pub fn ensure_directory_exists(&self) -> std::io::Result<()> {
        match self.directory() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
            _ => Ok(()),
        }
    }
}

/// `.` と `..` を字句的に解決する（ファイルシステムには触れない）
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => normalized.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::Normal(part) => normalized.push(part),
        }
    }
    normalized
}

impl fmt::Display for LogFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl AsRef<Path> for LogFilePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}
