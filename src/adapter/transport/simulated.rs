//! Simulated Upload Transport
//!
//! クラウドクライアントの代わりに動作するUploadTransport実装

use anyhow::{bail, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::collections::VecDeque;
use std::sync::Mutex;
use uuid::Uuid;

use crate::domain::repositories::{SasUriGrant, UploadTransport};
use crate::domain::value_objects::{BlobName, DeviceId};

/// シミュレーション用のトランスポート
///
/// 認可ごとに新しい相関IDを発行し、通知は発行済みの相関IDに対してのみ受け付ける。
/// 未通知の相関IDは `MAX_OUTSTANDING_GRANTS` 件まで保持し、超えた分は古い順に失効する。
pub struct SimulatedUploadTransport {
    storage_account: String,
    device_id: DeviceId,
    failure_message: Option<String>,
    issued: Mutex<VecDeque<String>>,
}

/// 完了通知を待つ相関IDの上限
const MAX_OUTSTANDING_GRANTS: usize = 64;

impl SimulatedUploadTransport {
    pub fn new(storage_account: impl Into<String>, device_id: DeviceId) -> Self {
        Self {
            storage_account: storage_account.into(),
            device_id,
            failure_message: None,
            issued: Mutex::new(VecDeque::new()),
        }
    }

    /// 全ての呼び出しを指定メッセージで失敗させる
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    fn check_failure(&self, operation: &str) -> Result<()> {
        match &self.failure_message {
            Some(message) => bail!("{}: {}", operation, message),
            None => Ok(()),
        }
    }

    fn issued(&self) -> std::sync::MutexGuard<'_, VecDeque<String>> {
        self.issued
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl UploadTransport for SimulatedUploadTransport {
    async fn get_file_upload_sas_uri(&self, blob_name: &BlobName) -> Result<SasUriGrant> {
        self.check_failure("get_file_upload_sas_uri")?;

        let correlation_id = Uuid::new_v4().to_string();
        let uri = format!(
            "https://{}.blob.core.windows.net/uploads/{}?sv=2024-11-04&sr=b&sp=cw&sig={}",
            self.storage_account,
            blob_name.full_blob_name(&self.device_id),
            Uuid::new_v4().simple()
        );
        {
            let mut issued = self.issued();
            if issued.len() >= MAX_OUTSTANDING_GRANTS {
                if let Some(expired) = issued.pop_front() {
                    debug!("Expired unacknowledged upload {}", expired);
                }
            }
            issued.push_back(correlation_id.clone());
        }

        debug!("Issued upload URI for {} ({})", blob_name, correlation_id);
        Ok(SasUriGrant::new(uri, correlation_id))
    }

    async fn upload_to_blob(&self, uri: &str, content: &[u8]) -> Result<()> {
        self.check_failure("upload_to_blob")?;

        if content.is_empty() {
            bail!("refusing to upload empty content");
        }
        info!("Uploaded {} bytes to {}", content.len(), uri);
        Ok(())
    }

    async fn notify_file_upload_complete(&self, correlation_id: &str, success: bool) -> Result<()> {
        self.check_failure("notify_file_upload_complete")?;

        {
            let mut issued = self.issued();
            match issued.iter().position(|id| id == correlation_id) {
                Some(index) => {
                    issued.remove(index);
                }
                None => bail!("unknown correlation id: '{}'", correlation_id),
            }
        }
        debug!(
            "Upload {} completed (success: {})",
            correlation_id, success
        );
        Ok(())
    }
}
