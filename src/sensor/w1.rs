use super::{SensorError, SensorSource, MAX_PLAUSIBLE_CELSIUS, MIN_PLAUSIBLE_CELSIUS};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// CRCチェック成功を示すトークン
const CRC_OK_MARKER: &str = "YES";

/// 温度値（ミリ℃）の直前に現れるキー
const TEMPERATURE_KEY: &str = " t=";

/// Linux 1-Wire バス上の DS18B20（`/sys/bus/w1/devices/<id>/w1_slave`）
///
/// 試行ごとにファイルを開き、読み取り後すぐに閉じます。
#[derive(Debug, Clone)]
pub struct W1Sensor {
    device_path: PathBuf,
}

impl W1Sensor {
    pub fn new(device_path: impl Into<PathBuf>) -> Self {
        Self {
            device_path: device_path.into(),
        }
    }
}

impl SensorSource for W1Sensor {
    fn read_payload(&mut self) -> Result<String, SensorError> {
        let mut file = File::open(&self.device_path)?;
        let mut payload = String::new();
        file.read_to_string(&mut payload)?;
        debug!("w1_slave payload: {:?}", payload);
        Ok(payload)
    }
}

/// `w1_slave` の内容を解析して温度（℃、小数点以下1桁）を返す
///
/// # ペイロード例
/// ```text
/// 72 01 4b 46 7f ff 0e 10 57 : crc=57 YES
/// 72 01 4b 46 7f ff 0e 10 57 t=23125
/// ```
pub fn parse_w1_payload(payload: &str) -> Result<f64, SensorError> {
    if !payload.contains(CRC_OK_MARKER) {
        return Err(SensorError::NotReady);
    }

    let (_, reading) = payload
        .split_once(TEMPERATURE_KEY)
        .ok_or(SensorError::MissingTemperature)?;
    let token = reading
        .split_whitespace()
        .next()
        .ok_or_else(|| SensorError::InvalidTemperature(reading.to_string()))?;
    let millidegrees: i64 = token
        .parse()
        .map_err(|_| SensorError::InvalidTemperature(token.to_string()))?;

    let celsius = round_to_tenths(millidegrees);
    if !(MIN_PLAUSIBLE_CELSIUS..=MAX_PLAUSIBLE_CELSIUS).contains(&celsius) {
        return Err(SensorError::OutOfRange(celsius));
    }
    Ok(celsius)
}

/// ミリ℃を℃に変換し、小数点以下1桁に丸める
///
/// ちょうど中間の値（23250 など、DS18B20 の 62.5 ミリ℃刻みで実際に出る）は
/// 偶数側へ丸める。`millidegrees / 100` の中間値は2進で正確に表せる。
pub fn round_to_tenths(millidegrees: i64) -> f64 {
    (millidegrees as f64 / 100.0).round_ties_even() / 10.0
}
