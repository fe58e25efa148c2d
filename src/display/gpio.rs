use super::{DisplayError, Polarity, ShiftRegisterDisplay};
use crate::core::config::DisplaySettings;
use gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::CdevPin;
use log::info;

/// GPIOキャラクタデバイス経由の 7セグメント表示
pub type GpioDisplay = ShiftRegisterDisplay<CdevPin>;

/// 設定に従って DATA / SCLK / RCLK ラインを確保し、表示器を初期化する
///
/// # 配線例（Raspberry Pi + 74HC595 x2 の4桁モジュール）
/// ```text
/// DI0  -> GPIO22
/// SCLK -> GPIO11
/// RCLK -> GPIO18
/// ```
pub fn open_display(settings: &DisplaySettings) -> Result<GpioDisplay, DisplayError> {
    info!(
        "Opening 7-segment display on {} (DI0: GPIO{}, SCLK: GPIO{}, RCLK: GPIO{})",
        settings.gpiochip_path, settings.data_pin_num, settings.clock_pin_num, settings.latch_pin_num
    );

    let mut chip = Chip::new(&settings.gpiochip_path).map_err(|e| {
        DisplayError::Gpio(format!("{} を開けません: {}", settings.gpiochip_path, e))
    })?;

    let data = request_output(&mut chip, settings.data_pin_num, "seg7-data")?;
    let clock = request_output(&mut chip, settings.clock_pin_num, "seg7-clock")?;
    let latch = request_output(&mut chip, settings.latch_pin_num, "seg7-latch")?;

    let display = ShiftRegisterDisplay::new(
        data,
        clock,
        latch,
        Polarity::from_common_cathode(settings.common_cathode),
        settings.digit_hold(),
    )?;
    info!("✓ 7-segment display initialized");
    Ok(display)
}

fn request_output(chip: &mut Chip, offset: u32, consumer: &str) -> Result<CdevPin, DisplayError> {
    let handle = chip
        .get_line(offset)
        .and_then(|line| line.request(LineRequestFlags::OUTPUT, 0, consumer))
        .map_err(|e| DisplayError::Gpio(format!("GPIO{} を出力に設定できません: {}", offset, e)))?;
    CdevPin::new(handle).map_err(|e| DisplayError::Gpio(format!("GPIO{}: {}", offset, e)))
}
