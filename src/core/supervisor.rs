use crate::core::shared_state::ShutdownSignal;
use crate::display::{DisplayRenderer, SegmentDisplay};
use crate::sensor::{SensorReader, SensorSource};
use anyhow::{anyhow, Result};
use log::{error, info, warn};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 停止要求からタスク合流を待つ最大時間
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// タスク状態の確認間隔
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub const SENSOR_TASK_NAME: &str = "sensor-reader";
pub const DISPLAY_TASK_NAME: &str = "display-renderer";

/// `Supervisor::wait` の終了理由
#[derive(Debug, Clone, PartialEq)]
pub enum ExitReason {
    /// 停止シグナルによる正常終了
    Shutdown,
    /// タスクが単独で終了した（表示ドライバ故障など）
    TaskFailed { task: &'static str, error: String },
}

impl ExitReason {
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitReason::Shutdown => 0,
            ExitReason::TaskFailed { .. } => 1,
        }
    }
}

struct Task {
    name: &'static str,
    handle: JoinHandle<Result<()>>,
}

/// センサースレッドと表示スレッドを起動・監視する
pub struct Supervisor {
    shutdown: ShutdownSignal,
    shutdown_timeout: Duration,
    tasks: Vec<Task>,
}

impl Supervisor {
    pub fn new(shutdown: ShutdownSignal, shutdown_timeout: Duration) -> Self {
        Self {
            shutdown,
            shutdown_timeout,
            tasks: Vec::new(),
        }
    }

    pub fn spawn_sensor<S>(&mut self, mut reader: SensorReader<S>) -> Result<()>
    where
        S: SensorSource + Send + 'static,
    {
        self.spawn(SENSOR_TASK_NAME, move || {
            reader.run();
            Ok(())
        })
    }

    pub fn spawn_display<D>(&mut self, mut renderer: DisplayRenderer<D>) -> Result<()>
    where
        D: SegmentDisplay + Send + 'static,
    {
        self.spawn(DISPLAY_TASK_NAME, move || renderer.run().map_err(anyhow::Error::from))
    }

    fn spawn<F>(&mut self, name: &'static str, body: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.to_string()).spawn(body)?;
        info!("✓ Task started: {}", name);
        self.tasks.push(Task { name, handle });
        Ok(())
    }

    /// 停止要求かタスクの単独終了を待ち、残りのタスクを合流させる
    pub fn wait(mut self) -> ExitReason {
        let reason = loop {
            if self.shutdown.wait_timeout(POLL_INTERVAL) {
                break ExitReason::Shutdown;
            }

            if let Some(index) = self.tasks.iter().position(|t| t.handle.is_finished()) {
                let task = self.tasks.remove(index);
                let error = match task.handle.join() {
                    Ok(Ok(())) => "exited unexpectedly".to_string(),
                    Ok(Err(e)) => format!("{:#}", e),
                    Err(_) => "panicked".to_string(),
                };
                error!("✗ Task {} stopped: {}", task.name, error);
                self.shutdown.request();
                break ExitReason::TaskFailed {
                    task: task.name,
                    error,
                };
            }
        };

        self.join_remaining();
        reason
    }

    fn join_remaining(&mut self) {
        let deadline = Instant::now() + self.shutdown_timeout;

        while !self.tasks.is_empty() && Instant::now() < deadline {
            if let Some(index) = self.tasks.iter().position(|t| t.handle.is_finished()) {
                let task = self.tasks.remove(index);
                match task.handle.join() {
                    Ok(Ok(())) => info!("Task {} joined", task.name),
                    Ok(Err(e)) => error!("Task {} ended with error: {:#}", task.name, e),
                    Err(_) => error!("Task {} panicked", task.name),
                }
            } else {
                thread::sleep(Duration::from_millis(10));
            }
        }

        for task in self.tasks.drain(..) {
            // JoinHandle を破棄するとスレッドは切り離され、プロセス終了時に止まる
            warn!(
                "Task {} did not stop within {:?}, abandoning",
                task.name, self.shutdown_timeout
            );
        }
    }
}

/// SIGINT / SIGTERM で停止シグナルを立てるハンドラを登録する
pub fn install_signal_handler(shutdown: ShutdownSignal) -> Result<()> {
    ctrlc::set_handler(move || {
        info!("Stop signal received, exiting");
        shutdown.request();
    })
    .map_err(|e| anyhow!("シグナルハンドラの登録に失敗: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared_state::SharedTemperature;
    use crate::display::MockDisplay;
    use crate::sensor::{MockSensor, RetryPolicy};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            retry_interval: Duration::from_millis(5),
            poll_interval: Duration::from_secs(600),
        }
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(ExitReason::Shutdown.exit_code(), 0);
        let failed = ExitReason::TaskFailed {
            task: DISPLAY_TASK_NAME,
            error: "boom".to_string(),
        };
        assert_eq!(failed.exit_code(), 1);
    }

    #[test]
    fn test_shutdown_joins_both_tasks() {
        let shutdown = ShutdownSignal::new();
        let shared = SharedTemperature::default();
        let sensor = MockSensor::new();
        sensor.set_fallback_payload("crc=57 YES\n t=24500\n");
        let display = MockDisplay::new();

        let mut supervisor = Supervisor::new(shutdown.clone(), DEFAULT_SHUTDOWN_TIMEOUT);
        supervisor
            .spawn_sensor(SensorReader::new(
                sensor,
                shared.clone(),
                shutdown.clone(),
                fast_policy(),
            ))
            .unwrap();
        supervisor
            .spawn_display(DisplayRenderer::new(
                display.clone(),
                shared.clone(),
                shutdown.clone(),
                Duration::from_millis(1),
            ))
            .unwrap();

        let stopper = shutdown.clone();
        let trigger = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            stopper.request();
        });

        let started = Instant::now();
        assert_eq!(supervisor.wait(), ExitReason::Shutdown);
        assert!(started.elapsed() < Duration::from_secs(2));
        trigger.join().unwrap();

        assert_eq!(shared.load(), 24.5);
        assert!(display.render_count() > 0);
        assert_eq!(display.clear_count(), 1);
    }

    #[test]
    fn test_display_failure_stops_everything() {
        let shutdown = ShutdownSignal::new();
        let shared = SharedTemperature::default();
        let sensor = MockSensor::new();
        sensor.set_fallback_payload("crc=57 YES\n t=24500\n");
        let display = MockDisplay::new();
        display.set_fail_after(5);

        let mut supervisor = Supervisor::new(shutdown.clone(), DEFAULT_SHUTDOWN_TIMEOUT);
        supervisor
            .spawn_sensor(SensorReader::new(
                sensor,
                shared.clone(),
                shutdown.clone(),
                fast_policy(),
            ))
            .unwrap();
        supervisor
            .spawn_display(DisplayRenderer::new(
                display,
                shared,
                shutdown.clone(),
                Duration::ZERO,
            ))
            .unwrap();

        match supervisor.wait() {
            ExitReason::TaskFailed { task, error } => {
                assert_eq!(task, DISPLAY_TASK_NAME);
                assert!(error.contains("Simulated GPIO write error"));
            }
            other => panic!("Expected TaskFailed, got {:?}", other),
        }
        assert!(shutdown.is_requested());
    }
}
