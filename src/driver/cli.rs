//! CLI Argument Parsing
//!
//! CLIの引数解析

use clap::Parser;

use crate::adapter::config::DEFAULT_CONFIG_PATH;

/// 日次ログを書き込み、クラウドへアップロードするCLI
#[derive(Parser, Debug, Clone)]
#[command(name = "logsync")]
#[command(
    about = "Write daily JSON Lines logs and upload them to cloud storage",
    long_about = None
)]
pub struct Args {
    /// Write one log entry
    #[arg(long)]
    pub write: bool,

    /// Upload today's log file once
    #[arg(long)]
    pub upload: bool,

    /// Periodic mode: write and upload on the configured intervals until Ctrl-C
    #[arg(long, conflicts_with_all = ["write", "upload"])]
    pub watch: bool,

    /// Stop watch mode after N writes
    #[arg(long, requires = "watch")]
    pub iterations: Option<u64>,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,
}

/// 実行モード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Once { write: bool, upload: bool },
    Watch { iterations: Option<u64> },
}

impl Args {
    /// フラグから実行モードを決定（指定がなければ書き込み→アップロードを1回ずつ）
    pub fn mode(&self) -> Mode {
        if self.watch {
            return Mode::Watch {
                iterations: self.iterations,
            };
        }
        if !self.write && !self.upload {
            return Mode::Once {
                write: true,
                upload: true,
            };
        }
        Mode::Once {
            write: self.write,
            upload: self.upload,
        }
    }
}
