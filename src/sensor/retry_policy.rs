use std::time::Duration;

/// センサー読み取りの再試行ポリシー
///
/// 既定値では 5秒 x 360回 = 最大30分で諦めてセンチネル値に切り替える。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 1サイクルあたりの最大試行回数
    pub max_attempts: u32,
    /// 失敗後の待機時間
    pub retry_interval: Duration,
    /// サイクル間の待機時間
    pub poll_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 360,
            retry_interval: Duration::from_secs(5),
            poll_interval: Duration::from_secs(600),
        }
    }
}

impl RetryPolicy {
    /// 全試行が失敗した場合の最悪待ち時間
    pub fn worst_case_stall(&self) -> Duration {
        self.retry_interval.saturating_mul(self.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_caps_stall_at_thirty_minutes() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 360);
        assert_eq!(policy.worst_case_stall(), Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_worst_case_stall_saturates() {
        let policy = RetryPolicy {
            retry_interval: Duration::MAX,
            ..Default::default()
        };
        assert_eq!(policy.worst_case_stall(), Duration::MAX);
    }
}
