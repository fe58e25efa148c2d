use chrono::Local;
use env_logger::{Builder, Target};
use log::LevelFilter;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// ログのタイムスタンプ形式（ミリ秒まで）
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// ロガー初期化のエラー
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("ログファイルを開けません ({path}): {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("ロガーは既に初期化されています: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// ログファイルへ追記するロガーを初期化する
///
/// 出力形式: `2024-01-01 12:00:00.123 INFO seg7_temp_display::sensor::reader - message`
pub fn init_file_logger(log_path: &Path, level: LevelFilter) -> Result<(), LoggingError> {
    let file = open_log_file(log_path)?;
    build_logger(Target::Pipe(Box::new(file)), level).try_init()?;
    log::set_max_level(level);
    Ok(())
}

fn open_log_file(log_path: &Path) -> Result<File, LoggingError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .map_err(|source| LoggingError::Open {
            path: log_path.display().to_string(),
            source,
        })
}

fn build_logger(target: Target, level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .target(target)
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} {} - {}",
                Local::now().format(TIMESTAMP_FORMAT),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        });
    builder
}
