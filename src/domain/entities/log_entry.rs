//! # LogEntry Entity
//!
//! ログエントリのドメインエンティティ（JSON Lines の1行に対応）

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, SubsecRound};
use serde::{Deserialize, Serialize, Serializer};

use crate::domain::errors::ValidationError;

/// タイムスタンプのシリアライズ形式（ミリ秒精度 + オフセット）
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%:z";

fn serialize_timestamp_millis<S>(
    value: &DateTime<FixedOffset>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
}

/// イベント種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Start,
    Stop,
    Warn,
    Error,
}

impl EventType {
    pub const ALL: [EventType; 4] = [
        EventType::Start,
        EventType::Stop,
        EventType::Warn,
        EventType::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Start => "START",
            EventType::Stop => "STOP",
            EventType::Warn => "WARN",
            EventType::Error => "ERROR",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .into_iter()
            .find(|event_type| event_type.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidEventType(s.to_string()))
    }
}

/// ログエントリ
///
/// 不変。タイムスタンプは構築時にミリ秒精度へ切り捨てられる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(serialize_with = "serialize_timestamp_millis")]
    timestamp: DateTime<FixedOffset>,
    event_type: EventType,
    comment: String,
}

impl LogEntry {
    /// 新しいログエントリを作成
    ///
    /// # Arguments
    ///
    /// * `event_type` - イベント種別
    /// * `comment` - コメント
    /// * `timestamp` - タイムスタンプ（ミリ秒未満は切り捨て）
    pub fn new(
        event_type: EventType,
        comment: impl Into<String>,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(3),
            event_type,
            comment: comment.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// 指定タイムゾーンでの暦日
    pub fn local_date(&self, offset: FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(&offset).date_naive()
    }

    /// 同じ瞬間を指定タイムゾーンで表現したエントリを返す
    pub fn in_zone(&self, offset: FixedOffset) -> Self {
        Self {
            timestamp: self.timestamp.with_timezone(&offset),
            event_type: self.event_type,
            comment: self.comment.clone(),
        }
    }

    /// JSON Lines の1行（改行なし）にシリアライズ
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// JSON Lines の1行をパース
    pub fn from_json_line(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end())
    }
}
