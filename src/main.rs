use anyhow::{Context, Result};
use log::{error, info};
use seg7_temp_display::core::{
    install_signal_handler, ExitReason, Settings, SharedTemperature, ShutdownSignal, Supervisor,
    DEFAULT_SHUTDOWN_TIMEOUT,
};
use seg7_temp_display::display::{gpio, DisplayRenderer};
use seg7_temp_display::logging::init_file_logger;
use seg7_temp_display::sensor::{SensorReader, W1Sensor};
use std::path::Path;

fn main() -> Result<()> {
    // 設定の読み込み（失敗時はタスク起動前に終了）
    let settings = Settings::load().context("settings.json の読み込みに失敗しました")?;

    init_file_logger(Path::new(&settings.app.log_path), settings.log_level())
        .context("ロガーの初期化に失敗しました")?;

    info!(
        "Starting 7-segment temperature display v{}...",
        seg7_temp_display::VERSION
    );
    info!("Sensor: {}", settings.sensor.device_path);

    let shared = SharedTemperature::default();
    let shutdown = ShutdownSignal::new();

    let display = gpio::open_display(&settings.display).context("表示器の初期化に失敗しました")?;

    install_signal_handler(shutdown.clone())?;
    info!("✓ Signal handlers installed (SIGINT, SIGTERM)");

    let mut supervisor = Supervisor::new(shutdown.clone(), DEFAULT_SHUTDOWN_TIMEOUT);
    supervisor.spawn_sensor(SensorReader::new(
        W1Sensor::new(&settings.sensor.device_path),
        shared.clone(),
        shutdown.clone(),
        settings.sensor.retry_policy(),
    ))?;
    supervisor.spawn_display(DisplayRenderer::new(
        display,
        shared,
        shutdown,
        settings.display.refresh_interval(),
    ))?;

    let reason = supervisor.wait();
    match &reason {
        ExitReason::Shutdown => info!("Program quits gracefully."),
        ExitReason::TaskFailed { task, error } => {
            error!("Program quits because {} failed: {}", task, error)
        }
    }
    log::logger().flush();
    std::process::exit(reason.exit_code());
}
