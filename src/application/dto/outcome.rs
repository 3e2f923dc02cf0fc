//! # Outcome DTO
//!
//! 成功/失敗の結果（失敗時はエラーメッセージを保持）

/// 操作結果
///
/// 成功時のみ値を持つ。失敗時の値へのアクセスはプログラミングエラー。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T = ()> {
    Success(T),
    Failure(String),
}

impl<T> Outcome<T> {
    pub fn success(value: T) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Outcome::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(message) => Some(message),
        }
    }

    /// 成功時の値を返します。
    ///
    /// # Panics
    ///
    /// 失敗した結果に対して呼び出した場合
    ///
    /// # 例
    ///
    /// ```
    /// use logsync::application::dto::outcome::Outcome;
    ///
    /// let uploaded = Outcome::success(42);
    /// assert_eq!(*uploaded.value(), 42);
    ///
    /// let failed: Outcome<i32> = Outcome::failure("timeout");
    /// assert_eq!(failed.error_message(), Some("timeout"));
    /// ```
    pub fn value(&self) -> &T {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure(message) => {
                panic!("cannot access value of a failed outcome: {}", message)
            }
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Success(value) => Some(value),
            Outcome::Failure(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failure(message) => Outcome::Failure(message),
        }
    }
}

impl Outcome<()> {
    pub fn ok() -> Self {
        Outcome::Success(())
    }
}
