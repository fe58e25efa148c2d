//! 温度センサーモジュール
//!
//! 1-Wire DS18B20 の `w1_slave` ノード読み取り、ペイロード解析、
//! 再試行付きサンプリングループを提供します。

pub mod mock;
pub mod reader;
pub mod retry_policy;
pub mod w1;

pub use mock::MockSensor;
pub use reader::{CycleOutcome, SensorReader};
pub use retry_policy::RetryPolicy;
pub use w1::{parse_w1_payload, round_to_tenths, W1Sensor};

/// DS18B20 の仕様上の測定範囲（℃）
pub const MIN_PLAUSIBLE_CELSIUS: f64 = -55.0;
pub const MAX_PLAUSIBLE_CELSIUS: f64 = 125.0;

/// センサー読み取りのエラー（いずれも再試行で回復を試みる）
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("センサーの読み取りに失敗: {0}")]
    Io(#[from] std::io::Error),
    #[error("YES tag not found in w1_slave")]
    NotReady,
    #[error("' t=' key not found in w1_slave")]
    MissingTemperature,
    #[error("温度値を解析できません: '{0}'")]
    InvalidTemperature(String),
    #[error("温度が仕様範囲外です: {0:.1}°C")]
    OutOfRange(f64),
}

/// センサーの生データを取得するインターフェース
///
/// 実機用（`W1Sensor`）とテスト用（`MockSensor`）を切り替えられます。
pub trait SensorSource {
    /// センサーリソースを開き、内容全体をテキストとして返す
    fn read_payload(&mut self) -> Result<String, SensorError>;
}

impl<S: SensorSource + ?Sized> SensorSource for Box<S> {
    fn read_payload(&mut self) -> Result<String, SensorError> {
        (**self).read_payload()
    }
}
