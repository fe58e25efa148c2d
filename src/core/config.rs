use crate::core::config_validation::{
    parse_log_level, validate_digit_count, validate_interval, validate_max_attempts,
    ValidationError, MAX_DIGIT_HOLD_US, MAX_INTERVAL_SECS, MAX_REFRESH_INTERVAL_MS,
};
use crate::sensor::RetryPolicy;
use log::LevelFilter;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 設定ファイル名（実行ファイルと同じディレクトリに置く）
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定ファイルを読み込めません ({path}): {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("設定ファイルの形式が不正です: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("app.log_path が設定されていません。settings.jsonを確認してください。")]
    MissingLogPath,
    #[error("設定値が無効です ({field}): {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl From<ValidationError> for ConfigError {
    fn from(error: ValidationError) -> Self {
        match error {
            ValidationError::MissingLogPath => ConfigError::MissingLogPath,
            ValidationError::InvalidLogLevel(level) => ConfigError::InvalidValue {
                field: "app.log_level",
                reason: format!("unknown level '{}'", level),
            },
            ValidationError::ZeroMaxAttempts => ConfigError::InvalidValue {
                field: "sensor.max_attempts",
                reason: "must be at least 1".to_string(),
            },
            ValidationError::EmptyDevicePath => ConfigError::InvalidValue {
                field: "sensor.device_path",
                reason: "must not be empty".to_string(),
            },
            ValidationError::IntervalTooLong { field, value, max } => ConfigError::InvalidValue {
                field,
                reason: format!("{} exceeds the maximum of {}", value, max),
            },
            ValidationError::DuplicatePin(pin) => ConfigError::InvalidValue {
                field: "7seg_display",
                reason: format!("pin {} is assigned more than once", pin),
            },
            ValidationError::InvalidChainLength(chain) => ConfigError::InvalidValue {
                field: "7seg_display.chain_num",
                reason: format!("expected 2 shift registers, got {}", chain),
            },
            ValidationError::InvalidDigitCount(count) => ConfigError::InvalidValue {
                field: "7seg_display.digit_count",
                reason: format!("expected 4 digits, got {}", count),
            },
            ValidationError::EmptyGpioChipPath => ConfigError::InvalidValue {
                field: "7seg_display.gpiochip_path",
                reason: "must not be empty".to_string(),
            },
        }
    }
}

/// アプリケーション全体の設定（settings.json）
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app: AppSettings,

    #[serde(default)]
    pub sensor: SensorSettings,

    #[serde(default, rename = "7seg_display")]
    pub display: DisplaySettings,
}

/// ログ出力設定
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    /// ログファイルのパス（必須）
    #[serde(default)]
    pub log_path: String,

    /// ログレベル（"error" / "warn" / "info" / "debug" / "trace" / "off"）
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// 温度センサー（1-Wire DS18B20）設定
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SensorSettings {
    pub device_path: String,
    /// 1サイクルあたりの最大試行回数
    pub max_attempts: u32,
    /// 読み取り失敗時の再試行間隔（秒）
    pub retry_interval_secs: u64,
    /// 正常取得後の待機時間（秒）
    pub poll_interval_secs: u64,
}

/// 7セグメント表示（74HC595 x2）設定
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub gpiochip_path: String,
    /// DI0
    pub data_pin_num: u32,
    /// SCLK
    pub clock_pin_num: u32,
    /// RCLK
    pub latch_pin_num: u32,
    /// シフトレジスタの連結数
    pub chain_num: u32,
    pub digit_count: usize,
    /// false: アノードコモン（セグメントはLowで点灯）
    pub common_cathode: bool,
    /// 1桁あたりの点灯保持時間（マイクロ秒）
    pub digit_hold_us: u64,
    /// 描画パス間の最小待機時間（ミリ秒）
    pub refresh_interval_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            device_path: "/sys/bus/w1/devices/28-01131a3efcd4/w1_slave".to_string(),
            max_attempts: 360,
            retry_interval_secs: 5,
            poll_interval_secs: 600,
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            gpiochip_path: "/dev/gpiochip0".to_string(),
            data_pin_num: 22,
            clock_pin_num: 11,
            latch_pin_num: 18,
            chain_num: 2,
            digit_count: 4,
            common_cathode: false,
            digit_hold_us: 2000,
            refresh_interval_ms: 0,
        }
    }
}

impl Settings {
    /// 実行ファイルと同じディレクトリの settings.json を読み込む
    pub fn load() -> Result<Self, ConfigError> {
        let path = default_settings_path().map_err(|source| ConfigError::Io {
            path: PathBuf::from(SETTINGS_FILE_NAME),
            source,
        })?;
        Self::load_from(&path)
    }

    /// 指定パスの設定ファイルを読み込み、検証する
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json_str = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json_str)
    }

    pub fn from_json(json_str: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json_str)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 各値の妥当性を検証
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.log_path.trim().is_empty() {
            return Err(ValidationError::MissingLogPath.into());
        }
        parse_log_level(&self.app.log_level)?;

        validate_max_attempts(self.sensor.max_attempts)?;
        validate_interval(
            "sensor.retry_interval_secs",
            self.sensor.retry_interval_secs,
            MAX_INTERVAL_SECS,
        )?;
        validate_interval(
            "sensor.poll_interval_secs",
            self.sensor.poll_interval_secs,
            MAX_INTERVAL_SECS,
        )?;
        if self.sensor.device_path.is_empty() {
            return Err(ValidationError::EmptyDevicePath.into());
        }

        let display = &self.display;
        if display.gpiochip_path.is_empty() {
            return Err(ValidationError::EmptyGpioChipPath.into());
        }
        let pins = [display.data_pin_num, display.clock_pin_num, display.latch_pin_num];
        for (i, pin) in pins.iter().enumerate() {
            if pins[i + 1..].contains(pin) {
                return Err(ValidationError::DuplicatePin(*pin).into());
            }
        }
        if display.chain_num != 2 {
            return Err(ValidationError::InvalidChainLength(display.chain_num).into());
        }
        validate_digit_count(display.digit_count)?;
        validate_interval(
            "7seg_display.refresh_interval_ms",
            display.refresh_interval_ms,
            MAX_REFRESH_INTERVAL_MS,
        )?;
        validate_interval(
            "7seg_display.digit_hold_us",
            display.digit_hold_us,
            MAX_DIGIT_HOLD_US,
        )?;
        Ok(())
    }

    /// 検証済みのログレベル
    pub fn log_level(&self) -> LevelFilter {
        parse_log_level(&self.app.log_level).unwrap_or(LevelFilter::Info)
    }
}

impl SensorSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_interval: Duration::from_secs(self.retry_interval_secs),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

impl DisplaySettings {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn digit_hold(&self) -> Duration {
        Duration::from_micros(self.digit_hold_us)
    }
}

/// 実行ファイルの実体があるディレクトリの settings.json
pub fn default_settings_path() -> std::io::Result<PathBuf> {
    let exe = std::env::current_exe()?.canonicalize()?;
    let dir = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(dir.join(SETTINGS_FILE_NAME))
}
