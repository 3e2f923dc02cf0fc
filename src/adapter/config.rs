//! Configuration
//!
//! JSON設定ファイルの読み込み

use anyhow::{anyhow, Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::application::services::RetryPolicy;
use crate::domain::value_objects::DeviceId;

/// 設定ファイルの既定パス
pub const DEFAULT_CONFIG_PATH: &str = "./.logsync/config.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// デバイスID（未指定時はホスト名）
    pub device_id: Option<String>,
    pub log_directory: String,
    /// 対象タイムゾーンのUTCオフセット（例: "+09:00"）
    pub utc_offset: String,
    pub max_retry_count: u32,
    pub initial_retry_delay_ms: u64,
    pub write_interval_secs: u64,
    pub upload_interval_secs: u64,
    pub storage_account: String,
    /// 全てのトランスポート呼び出しを失敗させる
    pub simulate_failure: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_id: None,
            log_directory: "./logs".to_string(),
            utc_offset: "+09:00".to_string(),
            max_retry_count: 3,
            initial_retry_delay_ms: 1000,
            write_interval_secs: 10,
            upload_interval_secs: 60,
            storage_account: "devstorage".to_string(),
            simulate_failure: false,
        }
    }
}

impl Config {
    /// 設定ファイルを読み込む（ファイルがなければ既定値）
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("Config not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// 対象タイムゾーン
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset
            .parse::<FixedOffset>()
            .map_err(|e| anyhow!("Invalid utc_offset '{}': {}", self.utc_offset, e))
    }

    /// 検証済みのデバイスID
    pub fn device_id(&self) -> Result<DeviceId> {
        let raw = match &self.device_id {
            Some(id) => id.clone(),
            None => hostname::get()
                .context("Failed to read hostname")?
                .to_string_lossy()
                .into_owned(),
        };
        DeviceId::new(raw.as_str()).with_context(|| format!("Invalid device id: '{}'", raw))
    }

    /// `~` を展開したログディレクトリ
    pub fn log_directory(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.log_directory).as_ref())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retry_count,
            Duration::from_millis(self.initial_retry_delay_ms),
        )
    }

    pub fn write_interval(&self) -> Duration {
        Duration::from_secs(self.write_interval_secs.max(1))
    }

    pub fn upload_interval(&self) -> Duration {
        Duration::from_secs(self.upload_interval_secs.max(1))
    }
}
