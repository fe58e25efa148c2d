use super::{DisplayError, DisplayFrame, SegmentDisplay};
use crate::core::shared_state::{SharedTemperature, ShutdownSignal};
use log::{debug, info};
use std::time::Duration;

/// 表示更新ループ
///
/// 共有温度のスナップショットを取り、フレームに分解してドライバへ送る。
/// ドライバのエラーは回復せず、そのまま呼び出し元へ返す。
pub struct DisplayRenderer<D: SegmentDisplay> {
    driver: D,
    shared: SharedTemperature,
    shutdown: ShutdownSignal,
    refresh_interval: Duration,
}

impl<D: SegmentDisplay> DisplayRenderer<D> {
    pub fn new(
        driver: D,
        shared: SharedTemperature,
        shutdown: ShutdownSignal,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            driver,
            shared,
            shutdown,
            refresh_interval,
        }
    }

    /// 1パス分の描画
    pub fn render_once(&mut self) -> Result<DisplayFrame, DisplayError> {
        let frame = DisplayFrame::from_temperature(self.shared.load());
        self.driver.render(&frame)?;
        Ok(frame)
    }

    /// 停止要求があるまで描画を繰り返し、終了時に表示を消灯する
    pub fn run(&mut self) -> Result<(), DisplayError> {
        info!(
            "Display refresh loop started (refresh interval: {:?})",
            self.refresh_interval
        );

        let mut passes: u64 = 0;
        while !self.shutdown.is_requested() {
            self.render_once()?;
            passes += 1;

            if !self.refresh_interval.is_zero() && self.shutdown.wait_timeout(self.refresh_interval) {
                break;
            }
        }

        debug!("Display refresh loop rendered {} passes", passes);
        self.driver.clear()?;
        info!("Display refresh loop stopped, display blanked");
        Ok(())
    }
}
