//! 7セグメント表示モジュール
//!
//! 温度値から表示フレームへの変換、74HC595 シフトレジスタ経由の
//! ダイナミック点灯ドライバ、表示更新ループを提供します。

pub mod frame;
#[cfg(feature = "gpio")]
pub mod gpio;
pub mod mock;
pub mod renderer;
pub mod shift_register;

pub use frame::{DisplayFrame, DECIMAL_POINT_INDEX, DIGIT_COUNT};
pub use mock::{MockDisplay, MockPin, PinEvent, PinRole};
pub use renderer::DisplayRenderer;
pub use shift_register::{Polarity, ShiftRegisterDisplay};

/// 表示ドライバのエラー（いずれも致命的）
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DisplayError {
    #[error("GPIO操作に失敗: {0}")]
    Gpio(String),
    #[error("表示できない数字です: {0}")]
    InvalidDigit(u8),
    #[error("桁数が不正です: {0}")]
    DigitCount(usize),
}

/// 表示ドライバのインターフェース
pub trait SegmentDisplay {
    /// 1フレーム分（全桁）をダイナミック点灯で出力する
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), DisplayError>;

    /// 全セグメントを消灯する
    fn clear(&mut self) -> Result<(), DisplayError>;
}

impl<D: SegmentDisplay + ?Sized> SegmentDisplay for Box<D> {
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), DisplayError> {
        (**self).render(frame)
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        (**self).clear()
    }
}
