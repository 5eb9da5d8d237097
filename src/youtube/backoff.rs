use std::time::Duration;

/// 指数バックオフを管理する構造体
/// リトライ間隔を失敗のたびに2倍に増加させる（60s→120s→240s→480s...）
pub struct ExponentialBackoff {
    initial_delay: Duration,
    current_delay: Duration,
    attempt: u32,
}

impl ExponentialBackoff {
    /// 指定した初期待機時間でインスタンスを作成
    pub fn new(initial_delay: Duration) -> Self {
        Self {
            initial_delay,
            current_delay: initial_delay,
            attempt: 0,
        }
    }

    /// 次のリトライまでの待機時間を返す
    ///
    /// 呼び出すたびに内部の待機時間が2倍になる
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current_delay;
        self.current_delay *= 2;
        self.attempt += 1;
        delay
    }

    /// バックオフをリセット（成功時に呼び出す）
    pub fn reset(&mut self) {
        self.current_delay = self.initial_delay;
        self.attempt = 0;
    }

    /// これまでに消費した待機回数を取得
    pub fn attempt_count(&self) -> u32 {
        self.attempt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression() {
        let mut backoff = ExponentialBackoff::new(Duration::from_secs(60));

        assert_eq!(backoff.next_delay(), Duration::from_secs(60)); // 初回
        assert_eq!(backoff.next_delay(), Duration::from_secs(120)); // 2倍
        assert_eq!(backoff.next_delay(), Duration::from_secs(240)); // 4倍
        assert_eq!(backoff.next_delay(), Duration::from_secs(480)); // 8倍
        assert_eq!(backoff.attempt_count(), 4);
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = ExponentialBackoff::new(Duration::from_secs(60));

        backoff.next_delay();
        backoff.next_delay();

        backoff.reset();

        assert_eq!(backoff.next_delay(), Duration::from_secs(60));
        assert_eq!(backoff.attempt_count(), 1);
    }

    #[test]
    fn test_custom_initial_delay() {
        let mut backoff = ExponentialBackoff::new(Duration::from_millis(500));

        assert_eq!(backoff.next_delay(), Duration::from_millis(500));
        assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }
}
