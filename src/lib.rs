/*!
 * # 7-Segment Temperature Display Library
 *
 * 1-Wire 温度センサー（DS18B20）の値を 74HC595 駆動の4桁7セグメント表示に
 * 表示し続けるためのライブラリ
 *
 * ## モジュール構成
 * - `core`: 設定、共有状態（温度・停止シグナル）、スレッド監視
 * - `sensor`: w1_slave の読み取り・解析、再試行付きサンプリングループ
 * - `display`: 表示フレーム、シフトレジスタドライバ、表示更新ループ
 * - `logging`: ログファイル出力の初期化
 */

pub mod core;
pub mod display;
pub mod logging;
pub mod sensor;

pub use crate::core::{ExitReason, Settings, SharedTemperature, ShutdownSignal, Supervisor};
pub use display::{DisplayError, DisplayFrame, DisplayRenderer, SegmentDisplay};
pub use sensor::{CycleOutcome, RetryPolicy, SensorError, SensorReader, SensorSource, W1Sensor};

/// ライブラリのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
