use super::{SensorError, SensorSource};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

/// テスト用のセンサーモック
///
/// キューに積んだ応答を先頭から返します。キューが空になった後は
/// `fallback` の応答を返し続けます（未設定なら I/O エラー）。
#[derive(Debug, Clone, Default)]
pub struct MockSensor {
    /// 読み取り応答のキュー（Ok: ペイロード, Err: I/Oエラーメッセージ）
    pub responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    /// キューが空のときの応答
    pub fallback: Arc<Mutex<Option<Result<String, String>>>>,
    /// read_payload が呼ばれた回数
    pub read_count: Arc<Mutex<u32>>,
}

impl MockSensor {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 正常なペイロードをキューに追加
    pub fn queue_payload(&self, payload: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(payload.to_string()));
    }

    /// テスト用: `t=<millidegrees>` を含む正常な w1_slave 応答をキューに追加
    pub fn queue_reading(&self, millidegrees: i64) {
        self.queue_payload(&w1_payload(millidegrees));
    }

    /// テスト用: I/Oエラーをキューに追加
    pub fn queue_io_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// テスト用: キューが空のときに常に返す応答を設定
    pub fn set_fallback_payload(&self, payload: &str) {
        *self.fallback.lock().unwrap() = Some(Ok(payload.to_string()));
    }

    pub fn set_fallback_io_error(&self, message: &str) {
        *self.fallback.lock().unwrap() = Some(Err(message.to_string()));
    }

    /// テスト用: 読み取り回数を取得
    pub fn read_count(&self) -> u32 {
        *self.read_count.lock().unwrap()
    }
}

impl SensorSource for MockSensor {
    fn read_payload(&mut self) -> Result<String, SensorError> {
        *self.read_count.lock().unwrap() += 1;

        let next = self.responses.lock().unwrap().pop_front();
        let response = match next {
            Some(response) => response,
            None => self
                .fallback
                .lock()
                .unwrap()
                .clone()
                .unwrap_or_else(|| Err("no response queued".to_string())),
        };
        response.map_err(|message| SensorError::Io(io::Error::other(message)))
    }
}

/// DS18B20 の w1_slave 形式のペイロードを生成
pub fn w1_payload(millidegrees: i64) -> String {
    format!(
        "72 01 4b 46 7f ff 0e 10 57 : crc=57 YES\n72 01 4b 46 7f ff 0e 10 57 t={}\n",
        millidegrees
    )
}
