/// 表示桁数
pub const DIGIT_COUNT: usize = 4;

/// 小数点を点灯する桁（1の位）
pub const DECIMAL_POINT_INDEX: usize = 2;

/// 4桁で表せる最大値（0.1℃単位）
const MAX_TENTHS: i64 = 9999;

/// 1回の描画パスで表示する内容
///
/// `digits` は左から 百の位・十の位・一の位・小数第1位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFrame {
    pub digits: [u8; DIGIT_COUNT],
    /// 小数点を点灯する桁のビットマスク（bit i = 左から i 桁目）
    pub dots: u8,
}

impl DisplayFrame {
    pub fn new(digits: [u8; DIGIT_COUNT], dots: u8) -> Self {
        Self { digits, dots }
    }

    /// 温度値を 4桁 + 小数点 に分解する
    ///
    /// 浮動小数点の切り捨て誤差（72.3 - 72 = 0.2999…）を避けるため、
    /// 0.1℃単位の整数に丸めてから桁を取り出す。表示範囲外の値は
    /// 0.0〜999.9 に丸め込む。
    pub fn from_temperature(celsius: f64) -> Self {
        // 符号を表示する桁がないため、氷点下（-55℃まで）は 000.0 と区別できない
        let tenths = ((celsius * 10.0).round() as i64).clamp(0, MAX_TENTHS);

        let hundreds = tenths / 1000;
        let tens = tenths / 100 % 10;
        let units = tenths / 10 % 10;
        let tenth = tenths % 10;

        Self {
            digits: [hundreds as u8, tens as u8, units as u8, tenth as u8],
            dots: 1 << DECIMAL_POINT_INDEX,
        }
    }

    /// 指定桁の小数点が点灯するか
    pub fn has_dot(&self, index: usize) -> bool {
        index < DIGIT_COUNT && self.dots & (1 << index) != 0
    }
}
