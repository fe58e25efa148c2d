use super::{DisplayError, DisplayFrame, SegmentDisplay};
use embedded_hal::digital::{ErrorType, OutputPin};
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

/// テスト用の表示ドライバモック
///
/// 実際のGPIOを使わずに描画されたフレームを記録し、テストで検証できます。
#[derive(Debug, Clone, Default)]
pub struct MockDisplay {
    /// 描画されたフレームの記録
    pub frames: Arc<Mutex<Vec<DisplayFrame>>>,
    /// clear() が呼ばれた回数
    pub clear_count: Arc<Mutex<u32>>,
    /// 指定回数の描画成功後にエラーを返す
    pub fail_after: Arc<Mutex<Option<usize>>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用: 描画されたフレームを取得
    pub fn get_frames(&self) -> Vec<DisplayFrame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn render_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }

    pub fn clear_count(&self) -> u32 {
        *self.clear_count.lock().unwrap()
    }

    /// テスト用: `renders` 回成功した後の描画でGPIOエラーをシミュレート
    pub fn set_fail_after(&self, renders: usize) {
        *self.fail_after.lock().unwrap() = Some(renders);
    }
}

impl SegmentDisplay for MockDisplay {
    fn render(&mut self, frame: &DisplayFrame) -> Result<(), DisplayError> {
        let mut frames = self.frames.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if frames.len() >= limit {
                return Err(DisplayError::Gpio("Simulated GPIO write error".to_string()));
            }
        }
        frames.push(*frame);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DisplayError> {
        *self.clear_count.lock().unwrap() += 1;
        Ok(())
    }
}

/// モックピンの役割
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRole {
    Data,
    Clock,
    Latch,
}

/// ピンの出力変化の記録
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinEvent {
    pub role: PinRole,
    pub high: bool,
}

/// テスト用の出力ピン
///
/// 同じログを共有する複数のピンを作り、出力順序を検証できます。
#[derive(Debug, Clone)]
pub struct MockPin {
    role: PinRole,
    events: Arc<Mutex<Vec<PinEvent>>>,
}

impl MockPin {
    pub fn new(role: PinRole) -> Self {
        Self {
            role,
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// 同じイベントログを共有する別の役割のピンを作成
    pub fn with_role(&self, role: PinRole) -> Self {
        Self {
            role,
            events: Arc::clone(&self.events),
        }
    }

    pub fn events(&self) -> Vec<PinEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    /// ログを再生し、RCLK の立ち上がりごとにシフトレジスタの内容を返す
    pub fn latched_words(&self) -> Vec<u16> {
        let mut words = Vec::new();
        let mut data = false;
        let mut clock = false;
        let mut latch = false;
        let mut shift: u16 = 0;

        for event in self.events.lock().unwrap().iter() {
            match event.role {
                PinRole::Data => data = event.high,
                PinRole::Clock => {
                    if event.high && !clock {
                        shift = (shift << 1) | u16::from(data);
                    }
                    clock = event.high;
                }
                PinRole::Latch => {
                    if event.high && !latch {
                        words.push(shift);
                    }
                    latch = event.high;
                }
            }
        }
        words
    }

    fn record(&mut self, high: bool) {
        self.events.lock().unwrap().push(PinEvent {
            role: self.role,
            high,
        });
    }
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.record(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.record(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_display_records_frames() {
        let mut mock = MockDisplay::new();
        let frame = DisplayFrame::from_temperature(21.5);
        mock.render(&frame).unwrap();
        mock.render(&frame).unwrap();
        assert_eq!(mock.get_frames(), vec![frame, frame]);
    }

    #[test]
    fn test_mock_display_simulated_failure() {
        let mut mock = MockDisplay::new();
        mock.set_fail_after(1);
        let frame = DisplayFrame::from_temperature(21.5);
        assert!(mock.render(&frame).is_ok());
        assert!(matches!(mock.render(&frame), Err(DisplayError::Gpio(_))));
        assert_eq!(mock.render_count(), 1);
    }

    #[test]
    fn test_mock_pins_share_event_log() {
        let mut data = MockPin::new(PinRole::Data);
        let mut clock = data.with_role(PinRole::Clock);
        data.set_high().unwrap();
        clock.set_high().unwrap();
        assert_eq!(
            data.events(),
            vec![
                PinEvent { role: PinRole::Data, high: true },
                PinEvent { role: PinRole::Clock, high: true },
            ]
        );
    }
}
