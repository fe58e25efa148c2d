// Display Renderer Integration Tests
// 温度値の桁分解と、表示更新ループの停止・故障時の挙動を検証します

use seg7_temp_display::core::{SharedTemperature, ShutdownSignal};
use seg7_temp_display::display::shift_register::encode_digit;
use seg7_temp_display::display::{
    DisplayError, DisplayFrame, DisplayRenderer, MockDisplay, MockPin, PinRole, Polarity,
    SegmentDisplay, ShiftRegisterDisplay, DECIMAL_POINT_INDEX,
};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_room_temperature_frame() {
    let frame = DisplayFrame::from_temperature(72.3);
    assert_eq!(frame.digits, [0, 7, 2, 3]);
    assert_eq!(frame.dots, 1 << DECIMAL_POINT_INDEX);
}

#[test]
fn test_sentinel_frame() {
    let frame = DisplayFrame::from_temperature(123.4);
    assert_eq!(frame.digits, [1, 2, 3, 4]);
    assert!(frame.has_dot(2));
}

#[test]
fn test_frame_digits_for_typical_readings() {
    let cases: [(f64, [u8; 4]); 6] = [
        (0.0, [0, 0, 0, 0]),
        (5.5, [0, 0, 5, 5]),
        (18.2, [0, 1, 8, 2]),
        (23.1, [0, 2, 3, 1]),
        (99.9, [0, 9, 9, 9]),
        (125.0, [1, 2, 5, 0]),
    ];
    for (celsius, digits) in cases {
        assert_eq!(DisplayFrame::from_temperature(celsius).digits, digits, "{}", celsius);
    }
}

#[test]
fn test_renderer_follows_shared_value() {
    let mock = MockDisplay::new();
    let shared = SharedTemperature::new(18.2);
    let shutdown = ShutdownSignal::new();
    let mut renderer = DisplayRenderer::new(
        mock.clone(),
        shared.clone(),
        shutdown.clone(),
        Duration::from_millis(1),
    );

    let handle = thread::spawn(move || renderer.run());

    thread::sleep(Duration::from_millis(30));
    shared.store_sentinel();
    let deadline = Instant::now() + Duration::from_secs(2);
    while !mock.get_frames().iter().any(|f| f.digits == [1, 2, 3, 4]) && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    shutdown.request();
    handle.join().unwrap().unwrap();

    let frames = mock.get_frames();
    assert_eq!(frames.first().unwrap().digits, [0, 1, 8, 2]);
    assert_eq!(frames.last().unwrap().digits, [1, 2, 3, 4]);
    assert_eq!(mock.clear_count(), 1);
}

#[test]
fn test_renderer_stops_promptly_with_long_refresh_interval() {
    let mock = MockDisplay::new();
    let shutdown = ShutdownSignal::new();
    let mut renderer = DisplayRenderer::new(
        mock.clone(),
        SharedTemperature::default(),
        shutdown.clone(),
        Duration::from_secs(60),
    );

    let handle = thread::spawn(move || renderer.run());
    thread::sleep(Duration::from_millis(50));

    let requested_at = Instant::now();
    shutdown.request();
    handle.join().unwrap().unwrap();

    assert!(requested_at.elapsed() < Duration::from_secs(1));
    assert_eq!(mock.render_count(), 1);
}

#[test]
fn test_driver_fault_ends_loop() {
    let mock = MockDisplay::new();
    mock.set_fail_after(10);
    let mut renderer = DisplayRenderer::new(
        mock.clone(),
        SharedTemperature::new(20.0),
        ShutdownSignal::new(),
        Duration::ZERO,
    );

    let result = renderer.run();
    assert_eq!(
        result,
        Err(DisplayError::Gpio("Simulated GPIO write error".to_string()))
    );
    assert_eq!(mock.render_count(), 10);
}

#[test]
fn test_shift_register_output_for_sentinel() {
    let data = MockPin::new(PinRole::Data);
    let probe = data.clone();
    let clock = data.with_role(PinRole::Clock);
    let latch = data.with_role(PinRole::Latch);
    let mut display = ShiftRegisterDisplay::new(
        data,
        clock,
        latch,
        Polarity::CommonAnode,
        Duration::ZERO,
    )
    .unwrap();
    probe.clear_events();

    display
        .render(&DisplayFrame::from_temperature(123.4))
        .unwrap();

    assert_eq!(
        probe.latched_words(),
        vec![
            0b1111_1001_0000_1000, // 1, 左端
            0b1010_0100_0000_0100, // 2
            0b0011_0000_0000_0010, // 3 + 小数点
            0b1001_1001_0000_0001, // 4, 右端
        ]
    );
    assert_eq!(
        probe.latched_words()[2],
        encode_digit(3, true, 2, Polarity::CommonAnode).unwrap()
    );
}
