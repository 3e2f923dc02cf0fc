//! # Log Entry Factory
//!
//! イベント種別ごとの定型メッセージからログエントリを生成する

use std::sync::Mutex;

use chrono::{DateTime, FixedOffset, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::entities::{EventType, LogEntry};

/// イベント種別ごとの定型メッセージ
fn messages_for(event_type: EventType) -> &'static [&'static str] {
    match event_type {
        EventType::Start => &["運転を開始しました。", "加工シーケンスを開始します。"],
        EventType::Stop => &[
            "運転を停止しました。",
            "現在の加工サイクルを完了し、停止しました。",
        ],
        EventType::Warn => &[
            "主軸モーターの温度が上昇しています。確認してください。",
            "切削油の残量が少なくなっています。補充を検討してください。",
        ],
        EventType::Error => &[
            "サーボモーターエラーが発生しました。システムを停止します。 (コード: E012)",
            "工具が破損しました。交換が必要です。機械を停止しました。",
        ],
    }
}

/// ログエントリファクトリ
///
/// 乱数生成器はインスタンスが所有する（シード指定で再現可能）。
#[derive(Debug)]
pub struct LogEntryFactory {
    offset: FixedOffset,
    rng: Mutex<StdRng>,
}

impl LogEntryFactory {
    /// 対象タイムゾーンを指定して作成（乱数はエントロピーから初期化）
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// シードを指定して作成
    pub fn with_seed(offset: FixedOffset, seed: u64) -> Self {
        Self {
            offset,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// 指定したイベント種別のエントリを作成
    ///
    /// タイムスタンプは `now` を対象タイムゾーンで表現したもの。
    pub fn create_log_entry(&self, event_type: EventType, now: DateTime<Utc>) -> LogEntry {
        let messages = messages_for(event_type);
        let index = self.with_rng(|rng| rng.gen_range(0..messages.len()));
        LogEntry::new(event_type, messages[index], now.with_timezone(&self.offset))
    }

    /// ランダムなイベント種別のエントリを作成
    pub fn create_random(&self, now: DateTime<Utc>) -> LogEntry {
        let index = self.with_rng(|rng| rng.gen_range(0..EventType::ALL.len()));
        self.create_log_entry(EventType::ALL[index], now)
    }

    fn with_rng<R>(&self, f: impl FnOnce(&mut StdRng) -> R) -> R {
        // 乱数状態は毒化しても使い続けられる
        let mut rng = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut rng)
    }
}
