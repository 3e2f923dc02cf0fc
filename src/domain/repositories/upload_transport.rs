//! # Upload Transport Trait
//!
//! クラウドへのファイルアップロード（認可・転送・完了通知）を抽象化

use anyhow::Result;
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::domain::value_objects::BlobName;

/// アップロード認可の結果
///
/// `uri` と `correlation_id` はクラウド側の応答をそのまま保持する。
/// 空文字列の検査は呼び出し側の責務。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SasUriGrant {
    /// 一度だけ書き込み可能な事前認可済みURI
    pub uri: String,
    /// 認可要求と完了通知を対応付けるID
    pub correlation_id: String,
}

impl SasUriGrant {
    pub fn new(uri: impl Into<String>, correlation_id: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            correlation_id: correlation_id.into(),
        }
    }
}

/// アップロードトランスポート
///
/// 3フェーズのアップロードプロトコルを提供するクラウドクライアントの抽象
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UploadTransport: Send + Sync {
    /// アップロード先URIと相関IDを取得する
    async fn get_file_upload_sas_uri(&self, blob_name: &BlobName) -> Result<SasUriGrant>;

    /// 認可済みURIへファイル内容を転送する
    async fn upload_to_blob(&self, uri: &str, content: &[u8]) -> Result<()>;

    /// アップロードの完了（成功/失敗）を通知する
    async fn notify_file_upload_complete(&self, correlation_id: &str, success: bool) -> Result<()>;
}
