use crate::display::DIGIT_COUNT;
use log::LevelFilter;
use std::str::FromStr;

/// 再試行間隔・サイクル間隔の上限（秒）
pub const MAX_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// 描画パス間隔の上限（ミリ秒）
pub const MAX_REFRESH_INTERVAL_MS: u64 = 60_000;

/// 1桁あたりの点灯保持時間の上限（マイクロ秒）
pub const MAX_DIGIT_HOLD_US: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    MissingLogPath,
    InvalidLogLevel(String),
    ZeroMaxAttempts,
    EmptyDevicePath,
    IntervalTooLong {
        field: &'static str,
        value: u64,
        max: u64,
    },
    DuplicatePin(u32),
    InvalidChainLength(u32),
    InvalidDigitCount(usize),
    EmptyGpioChipPath,
}

pub fn parse_log_level(level: &str) -> Result<LevelFilter, ValidationError> {
    LevelFilter::from_str(level.trim())
        .map_err(|_| ValidationError::InvalidLogLevel(level.to_string()))
}

pub fn validate_max_attempts(value: u32) -> Result<(), ValidationError> {
    if value == 0 {
        Err(ValidationError::ZeroMaxAttempts)
    } else {
        Ok(())
    }
}

pub fn validate_interval(field: &'static str, value: u64, max: u64) -> Result<(), ValidationError> {
    if value > max {
        Err(ValidationError::IntervalTooLong { field, value, max })
    } else {
        Ok(())
    }
}

pub fn validate_digit_count(value: usize) -> Result<(), ValidationError> {
    if value == DIGIT_COUNT {
        Ok(())
    } else {
        Err(ValidationError::InvalidDigitCount(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("info"), Ok(LevelFilter::Info));
        assert_eq!(parse_log_level("DEBUG"), Ok(LevelFilter::Debug));
        assert_eq!(parse_log_level(" warn "), Ok(LevelFilter::Warn));
        assert!(matches!(
            parse_log_level("verbose"),
            Err(ValidationError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_validate_interval() {
        assert!(validate_interval("sensor.poll_interval_secs", 0, MAX_INTERVAL_SECS).is_ok());
        assert!(validate_interval("sensor.poll_interval_secs", MAX_INTERVAL_SECS, MAX_INTERVAL_SECS).is_ok());
        assert_eq!(
            validate_interval("sensor.poll_interval_secs", u64::MAX, MAX_INTERVAL_SECS),
            Err(ValidationError::IntervalTooLong {
                field: "sensor.poll_interval_secs",
                value: u64::MAX,
                max: MAX_INTERVAL_SECS,
            })
        );
    }

    #[test]
    fn test_validate_digit_count() {
        assert!(validate_digit_count(4).is_ok());
        assert_eq!(validate_digit_count(6), Err(ValidationError::InvalidDigitCount(6)));
    }

    #[test]
    fn test_validate_max_attempts() {
        assert!(validate_max_attempts(360).is_ok());
        assert_eq!(validate_max_attempts(0), Err(ValidationError::ZeroMaxAttempts));
    }
}
