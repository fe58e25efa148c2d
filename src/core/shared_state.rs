use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// センサー故障時に表示へ流すセンチネル値（℃）
///
/// 実測値の範囲内にあるため、表示上は本物の 123.4℃ と区別できない。
pub const SENSOR_FAILED_SENTINEL: f64 = 123.4;

/// 最初のサンプリングが完了するまでの初期値
pub const INITIAL_TEMPERATURE: f64 = 0.0;

/// センサースレッドと表示スレッドで共有する温度値
///
/// `f64` のビット列を `AtomicU64` に格納するため、読み取りが
/// 書き込み途中の値を観測することはない。書き込みはセンサースレッドのみ。
#[derive(Debug, Clone)]
pub struct SharedTemperature {
    bits: Arc<AtomicU64>,
}

impl Default for SharedTemperature {
    fn default() -> Self {
        Self::new(INITIAL_TEMPERATURE)
    }
}

impl SharedTemperature {
    pub fn new(initial: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(initial.to_bits())),
        }
    }

    /// 現在値のスナップショットを取得
    pub fn load(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// 新しい温度を公開
    pub fn store(&self, celsius: f64) {
        self.bits.store(celsius.to_bits(), Ordering::Release);
    }

    /// センサー故障を示すセンチネル値を公開
    pub fn store_sentinel(&self) {
        self.store(SENSOR_FAILED_SENTINEL);
    }
}

#[derive(Debug, Default)]
struct ShutdownInner {
    requested: AtomicBool,
    lock: Mutex<()>,
    wakeup: Condvar,
}

/// 協調的な停止シグナル
///
/// 一度だけ false→true に遷移し、リセットされない。
/// 待機中のスレッドは `request()` で即座に起こされる。
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    inner: Arc<ShutdownInner>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 停止を要求し、待機中のスレッドをすべて起こす
    pub fn request(&self) {
        // ロックを取ってから通知しないと wait_timeout 直前の確認とすれ違う
        let _guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.inner.requested.store(true, Ordering::SeqCst);
        self.inner.wakeup.notify_all();
    }

    pub fn is_requested(&self) -> bool {
        self.inner.requested.load(Ordering::SeqCst)
    }

    /// 最大 `timeout` だけ待機する
    ///
    /// `Instant` で表せないほど長い `timeout` は、停止要求まで待ち続ける。
    ///
    /// # 戻り値
    /// 停止が要求されていれば `true`（待機は途中で打ち切られる）
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.inner.lock.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if self.is_requested() {
                return true;
            }
            guard = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return false;
                    }
                    match self.inner.wakeup.wait_timeout(guard, deadline - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .inner
                    .wakeup
                    .wait(guard)
                    .unwrap_or_else(|e| e.into_inner()),
            };
        }
    }
}
