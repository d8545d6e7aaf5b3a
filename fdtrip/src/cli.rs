use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser};
use fdtrip_api::{PosixOps, Step};
use fdtrip_hooks::{FaultInjector, TraceOps};
use fdtrip_roundtrip::{FileRoundTrip, RoundTripConfig, BANNER, DEFAULT_PATH};
use log::info;
use nix::errno::Errno;

/// Open a file read-write, read up to 99 bytes, write "Hello, World!\n"
/// at the resulting offset, seek back to the start and close it.
///
/// Exits with status 0 when every step succeeds and 1 otherwise,
/// including when the arguments cannot be parsed.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Options {
    #[command(flatten)]
    logger: LogOptions,

    /// File to operate on (must already exist)
    #[arg(default_value = DEFAULT_PATH)]
    path: PathBuf,

    /// Make STEP (open, read, write, seek, close) fail with EIO
    #[arg(long, value_name = "STEP", hide = true)]
    inject_fault: Option<Step>,
}

impl Options {
    pub fn execute(self) -> anyhow::Result<()> {
        self.logger.init();
        info!("CLI opts: {:?}", self);

        println!("{}", BANNER);

        let fault = self.inject_fault.map(|step| (step, Errno::EIO));
        let ops = TraceOps::new(FaultInjector::new(PosixOps).with_fault(fault));
        let config = RoundTripConfig::new().path(self.path);

        let mut roundtrip = FileRoundTrip::new(config, ops);
        let stats = roundtrip.run()?;
        info!("stats: {:?}", stats);

        Ok(())
    }
}

/// ログ出力の設定
/// 環境変数は読まず、コマンドライン引数だけで決まる
#[derive(Args, Debug)]
struct LogOptions {
    /// Log more: -v warnings, -vv progress, -vvv every file operation, -vvvv everything
    #[arg(long = "verbose", short = 'v', action = ArgAction::Count)]
    verbosity: u8,

    /// Per-module log filter in env_logger syntax (e.g. "fdtrip_hooks=debug")
    #[arg(long = "log-filter")]
    log_filter: Option<String>,

    /// Where log lines go: "stderr" or "stdout"
    #[arg(long, default_value = "stderr")]
    log_target: LogTarget,
}

impl LogOptions {
    /// グローバルロガーを初期化（プロセスで1回だけ呼ぶ）
    fn init(&self) {
        let mut builder = env_logger::Builder::new();
        builder
            .filter_level(self.verbosity_level())
            .parse_filters(self.log_filter.as_deref().unwrap_or(""))
            .target(self.log_target.into())
            .init();
    }

    /// -v の回数をログレベルに変換
    fn verbosity_level(&self) -> log::LevelFilter {
        match self.verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

/// ログの出力先
#[derive(Debug, Clone, Copy)]
enum LogTarget {
    Stdout,
    Stderr,
}

impl FromStr for LogTarget {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(anyhow!("unknown log target {:?}", s)),
        }
    }
}

impl From<LogTarget> for env_logger::Target {
    fn from(t: LogTarget) -> Self {
        match t {
            LogTarget::Stdout => Self::Stdout,
            LogTarget::Stderr => Self::Stderr,
        }
    }
}
