use super::{DisplayError, DisplayFrame, SegmentDisplay, DIGIT_COUNT};
use embedded_hal::digital::OutputPin;
use log::debug;
use std::thread;
use std::time::Duration;

/// 数字 0〜9 のセグメントパターン（アノードコモン: ビット0で点灯）
///
/// bit0..bit6 = a..g, bit7 = 小数点
const SEGMENT_TABLE: [u8; 10] = [
    0b1100_0000, // 0
    0b1111_1001, // 1
    0b1010_0100, // 2
    0b1011_0000, // 3
    0b1001_1001, // 4
    0b1001_0010, // 5
    0b1000_0010, // 6
    0b1111_1000, // 7
    0b1000_0000, // 8
    0b1001_0000, // 9
];

/// 小数点セグメントのビット
const DOT_BIT: u8 = 0b1000_0000;

/// 2個連結した 74HC595 に送るビット数
const WORD_BITS: u32 = 16;

/// 表示器の極性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// アノードコモン（セグメントはLowで点灯）
    CommonAnode,
    /// カソードコモン（セグメントはHighで点灯）
    CommonCathode,
}

impl Polarity {
    pub fn from_common_cathode(common_cathode: bool) -> Self {
        if common_cathode {
            Polarity::CommonCathode
        } else {
            Polarity::CommonAnode
        }
    }

    /// 全消灯時のセグメントバイト
    fn blank(self) -> u8 {
        match self {
            Polarity::CommonAnode => 0xFF,
            Polarity::CommonCathode => 0x00,
        }
    }
}

/// 1桁分の16ビットワードを組み立てる
///
/// 上位バイト: セグメントパターン、下位バイト: 桁選択（左端の桁が bit3）。
pub fn encode_digit(
    digit: u8,
    dot: bool,
    position: usize,
    polarity: Polarity,
) -> Result<u16, DisplayError> {
    let pattern = *SEGMENT_TABLE
        .get(digit as usize)
        .ok_or(DisplayError::InvalidDigit(digit))?;
    if position >= DIGIT_COUNT {
        return Err(DisplayError::DigitCount(position + 1));
    }

    let pattern = if dot { pattern & !DOT_BIT } else { pattern };
    let segments = match polarity {
        Polarity::CommonAnode => pattern,
        Polarity::CommonCathode => !pattern,
    };
    let select = 1u8 << (DIGIT_COUNT - 1 - position);

    Ok(u16::from(segments) << 8 | u16::from(select))
}

/// 74HC595 x2 をビットバングで駆動する 4桁7セグメント表示
///
/// DATA に1ビットずつ載せて SCLK の立ち上がりでシフトし、
/// 16ビット送り終えたら RCLK パルスで出力ラッチへ転送する。
pub struct ShiftRegisterDisplay<P: OutputPin> {
    data: P,
    clock: P,
    latch: P,
    polarity: Polarity,
    digit_hold: Duration,
}

impl<P: OutputPin> ShiftRegisterDisplay<P> {
    /// ピンを初期状態（SCLK / RCLK = Low）にして表示器を作成する
    pub fn new(
        data: P,
        clock: P,
        latch: P,
        polarity: Polarity,
        digit_hold: Duration,
    ) -> Result<Self, DisplayError> {
        let mut display = Self {
            data,
            clock,
            latch,
            polarity,
            digit_hold,
        };
        set_pin(&mut display.clock, false)?;
        set_pin(&mut display.latch, false)?;
        debug!(
            "Shift register display ready (polarity: {:?}, hold: {:?})",
            polarity, digit_hold
        );
        Ok(display)
    }

    fn push_bit(&mut self, bit: bool) -> Result<(), DisplayError> {
        set_pin(&mut self.clock, false)?;
        set_pin(&mut self.data, bit)?;
        set_pin(&mut self.clock, true)
    }

    fn latch_word(&mut self, word: u16) -> Result<(), DisplayError> {
        for i in (0..WORD_BITS).rev() {
            self.push_bit(word & (1 << i) != 0)?;
        }
        set_pin(&mut self.latch, true)?;
        set_pin(&mut self.latch, false)
    }
}

impl<P: OutputPin> SegmentDisplay for ShiftRegisterDisplay<P> {
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), DisplayError> {
        for (position, digit) in frame.digits.iter().enumerate() {
            let word = encode_digit(*digit, frame.has_dot(position), position, self.polarity)?;
            self.latch_word(word)?;
            if !self.digit_hold.is_zero() {
                thread::sleep(self.digit_hold);
            }
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        let word = u16::from(self.polarity.blank()) << 8;
        self.latch_word(word)
    }
}

fn set_pin<P: OutputPin>(pin: &mut P, high: bool) -> Result<(), DisplayError> {
    let result = if high { pin.set_high() } else { pin.set_low() };
    result.map_err(|e| DisplayError::Gpio(format!("{:?}", e)))
}
