use super::{parse_w1_payload, RetryPolicy, SensorError, SensorSource};
use crate::core::shared_state::{SharedTemperature, ShutdownSignal, SENSOR_FAILED_SENTINEL};
use log::{error, info, warn};

/// 1サンプリングサイクルの結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// 温度を取得して公開した
    Success { attempts: u32, celsius: f64 },
    /// 全試行が失敗し、センチネル値を公開した
    Exhausted { attempts: u32 },
    /// 停止要求により中断した（共有値は変更していない）
    Interrupted { attempts: u32 },
}

/// 温度サンプリングループ
///
/// 共有温度の唯一の書き込み側。失敗時は `retry_interval` 待って再試行し、
/// `max_attempts` 回すべて失敗したらセンチネル値を公開する。
pub struct SensorReader<S: SensorSource> {
    source: S,
    shared: SharedTemperature,
    shutdown: ShutdownSignal,
    policy: RetryPolicy,
}

impl<S: SensorSource> SensorReader<S> {
    pub fn new(
        source: S,
        shared: SharedTemperature,
        shutdown: ShutdownSignal,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            shared,
            shutdown,
            policy,
        }
    }

    /// 停止要求があるまでサンプリングを繰り返す
    pub fn run(&mut self) {
        info!(
            "Temperature sampling loop started (max_attempts: {}, retry: {:?}, poll: {:?}, sentinel after: {:?})",
            self.policy.max_attempts,
            self.policy.retry_interval,
            self.policy.poll_interval,
            self.policy.worst_case_stall()
        );

        while !self.shutdown.is_requested() {
            if let CycleOutcome::Interrupted { .. } = self.run_cycle() {
                break;
            }
            // 待機中の停止要求は即座に待機を打ち切る
            if self.shutdown.wait_timeout(self.policy.poll_interval) {
                break;
            }
        }

        info!("Temperature sampling loop stopped");
    }

    /// 1サイクル分の読み取りを行う（再試行を含む）
    pub fn run_cycle(&mut self) -> CycleOutcome {
        let mut retry = 0;

        while retry < self.policy.max_attempts {
            if self.shutdown.is_requested() {
                return CycleOutcome::Interrupted { attempts: retry };
            }

            match self.sample() {
                Ok(celsius) => {
                    let attempts = retry + 1;
                    self.shared.store(celsius);
                    info!("🌡️ Temperature updated: {:.1}°C", celsius);
                    if attempts > 1 {
                        info!("Temp sensor recovered from error (attempts: {})", attempts);
                    }
                    return CycleOutcome::Success { attempts, celsius };
                }
                Err(e) => {
                    retry += 1;
                    error!("{}, retry={}", e, retry);
                    if self.shutdown.wait_timeout(self.policy.retry_interval) {
                        return CycleOutcome::Interrupted { attempts: retry };
                    }
                }
            }
        }

        warn!(
            "Temp sensor failed {} times in a row, showing sentinel {:.1}",
            retry, SENSOR_FAILED_SENTINEL
        );
        self.shared.store_sentinel();
        CycleOutcome::Exhausted { attempts: retry }
    }

    fn sample(&mut self) -> Result<f64, SensorError> {
        let payload = self.source.read_payload()?;
        parse_w1_payload(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::MockSensor;
    use std::time::Duration;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            retry_interval: Duration::from_millis(1),
            poll_interval: Duration::from_millis(1),
        }
    }

    #[test]
    fn test_first_attempt_success() {
        let mock = MockSensor::new();
        mock.queue_reading(21500);
        let shared = SharedTemperature::default();
        let mut reader =
            SensorReader::new(mock.clone(), shared.clone(), ShutdownSignal::new(), fast_policy(3));

        assert_eq!(
            reader.run_cycle(),
            CycleOutcome::Success { attempts: 1, celsius: 21.5 }
        );
        assert_eq!(shared.load(), 21.5);
        assert_eq!(mock.read_count(), 1);
    }

    #[test]
    fn test_recovers_after_failures() {
        let mock = MockSensor::new();
        mock.queue_io_error("no such device");
        mock.queue_payload("crc=00 NO\n t=21500\n");
        mock.queue_reading(19800);
        let shared = SharedTemperature::default();
        let mut reader =
            SensorReader::new(mock.clone(), shared.clone(), ShutdownSignal::new(), fast_policy(5));

        assert_eq!(
            reader.run_cycle(),
            CycleOutcome::Success { attempts: 3, celsius: 19.8 }
        );
        assert_eq!(shared.load(), 19.8);
    }

    #[test]
    fn test_success_on_last_attempt_is_not_exhausted() {
        let mock = MockSensor::new();
        mock.queue_io_error("e1");
        mock.queue_io_error("e2");
        mock.queue_reading(30000);
        let shared = SharedTemperature::default();
        let mut reader =
            SensorReader::new(mock, shared.clone(), ShutdownSignal::new(), fast_policy(3));

        assert_eq!(
            reader.run_cycle(),
            CycleOutcome::Success { attempts: 3, celsius: 30.0 }
        );
        assert_eq!(shared.load(), 30.0);
    }

    #[test]
    fn test_interrupted_before_first_attempt() {
        let mock = MockSensor::new();
        mock.queue_reading(21500);
        let shutdown = ShutdownSignal::new();
        shutdown.request();
        let shared = SharedTemperature::new(18.0);
        let mut reader = SensorReader::new(mock.clone(), shared.clone(), shutdown, fast_policy(3));

        assert_eq!(reader.run_cycle(), CycleOutcome::Interrupted { attempts: 0 });
        assert_eq!(shared.load(), 18.0);
        assert_eq!(mock.read_count(), 0);
    }
}
