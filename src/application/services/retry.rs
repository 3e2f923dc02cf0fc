//! # Retry Executor
//!
//! 指数バックオフ付きのリトライ実行

use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use log::{debug, error, warn};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::application::errors::{Classified, ErrorKind};

pub const DEFAULT_MAX_RETRY_COUNT: u32 = 3;
pub const DEFAULT_INITIAL_DELAY_MS: u64 = 1000;
pub const MAX_RETRY_DELAY_MS: u64 = 30000;

/// Calculate retry delay with exponential backoff
///
/// `attempt` は失敗した試行の番号（1始まり）。
/// `min(initial_delay * 2^(attempt-1), 30s)` を返す。
pub fn calculate_retry_delay(initial_delay: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(63);
    let initial_ms = u64::try_from(initial_delay.as_millis()).unwrap_or(u64::MAX);
    let delay_ms = initial_ms
        .checked_mul(1u64 << exponent)
        .unwrap_or(u64::MAX)
        .min(MAX_RETRY_DELAY_MS);
    Duration::from_millis(delay_ms)
}

/// リトライポリシー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retry_count: u32,
    pub initial_delay: Duration,
    /// リトライ対象のエラー種別（空の場合はすべてのエラーが対象）
    pub retryable_kinds: HashSet<ErrorKind>,
}

impl RetryPolicy {
    pub fn new(max_retry_count: u32, initial_delay: Duration) -> Self {
        Self {
            max_retry_count,
            initial_delay,
            retryable_kinds: HashSet::new(),
        }
    }

    /// リトライ対象のエラー種別を追加
    pub fn retry_on(mut self, kinds: impl IntoIterator<Item = ErrorKind>) -> Self {
        self.retryable_kinds.extend(kinds);
        self
    }

    pub fn should_retry(&self, kind: ErrorKind) -> bool {
        self.retryable_kinds.is_empty() || self.retryable_kinds.contains(&kind)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retry_count.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_RETRY_COUNT,
            Duration::from_millis(DEFAULT_INITIAL_DELAY_MS),
        )
    }
}

/// 試行ごとのエラーの集約（試行順）
#[derive(Debug)]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn last(&self) -> Option<&E> {
        self.errors.last()
    }

    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "attempt {}: {}", index + 1, error)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AggregateError<E> {}

/// リトライ実行のエラー
#[derive(Debug, Error)]
pub enum RetryError<E: fmt::Debug + fmt::Display> {
    /// 全試行が失敗した
    #[error("operation failed after {n} attempt(s): {0}", n = .0.len())]
    Exhausted(AggregateError<E>),

    /// リトライ対象外のエラーで中断した
    #[error("operation aborted by a non-retryable error: {0}")]
    Aborted(AggregateError<E>),

    #[error("operation cancelled")]
    Cancelled,
}

/// リトライ実行器
///
/// 試行は1回の呼び出しの中で逐次実行される。呼び出し間で状態は共有しない。
#[derive(Debug, Clone, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// 操作をポリシーに従って実行
    ///
    /// # Arguments
    ///
    /// * `operation` - 引数なしで呼び出される失敗しうる非同期操作
    /// * `cancel` - キャンセルシグナル（各試行前と待機中に確認）
    ///
    /// # Errors
    ///
    /// - 全試行失敗: `RetryError::Exhausted`（全エラーを保持）
    /// - リトライ対象外のエラー: `RetryError::Aborted`
    /// - キャンセル: `RetryError::Cancelled`（集約には含めない）
    pub async fn execute<T, E, F, Fut>(
        &self,
        mut operation: F,
        cancel: &CancellationToken,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classified + fmt::Debug + fmt::Display,
    {
        let max_attempts = self.policy.max_attempts();
        let mut errors = Vec::new();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(RetryError::Cancelled);
            }

            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Operation succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if err.is_cancellation() {
                return Err(RetryError::Cancelled);
            }

            if !self.policy.should_retry(err.kind()) {
                warn!(
                    "Attempt {} failed with a non-retryable error: {}",
                    attempt, err
                );
                errors.push(err);
                return Err(RetryError::Aborted(AggregateError::new(errors)));
            }

            if attempt == max_attempts {
                error!("Attempt {} failed, no retries left: {}", attempt, err);
                errors.push(err);
                return Err(RetryError::Exhausted(AggregateError::new(errors)));
            }

            let delay = calculate_retry_delay(self.policy.initial_delay, attempt);
            warn!(
                "Attempt {} failed, retrying in {}ms: {}",
                attempt,
                delay.as_millis(),
                err
            );
            errors.push(err);

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(RetryError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        Err(RetryError::Exhausted(AggregateError::new(errors)))
    }
}
