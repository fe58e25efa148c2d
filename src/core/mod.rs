/// コアシステムモジュール
pub mod config;
pub mod config_validation;
pub mod shared_state;
pub mod supervisor;

pub use config::{ConfigError, DisplaySettings, SensorSettings, Settings};
pub use shared_state::{SharedTemperature, ShutdownSignal, SENSOR_FAILED_SENTINEL};
pub use supervisor::{install_signal_handler, ExitReason, Supervisor, DEFAULT_SHUTDOWN_TIMEOUT};
