//! # Error Classification
//!
//! リトライ判定に使うエラー分類

/// エラー種別
///
/// リトライ可否やキャンセルの判定はこの識別子に対する単純な述語で行う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Io,
    Authorization,
    Transfer,
    MissingCorrelationId,
    Notification,
    Cancelled,
    Other,
}

impl ErrorKind {
    /// アップロードプロトコルでリトライ対象となる種別
    pub const RETRYABLE: [ErrorKind; 2] = [ErrorKind::Authorization, ErrorKind::Transfer];
}

/// 分類可能なエラー
pub trait Classified {
    fn kind(&self) -> ErrorKind;

    fn is_cancellation(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }
}
