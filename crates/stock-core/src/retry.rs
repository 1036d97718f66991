//! 재시도 유틸리티.
//!
//! 데이터 공급처 호출처럼 일시적으로 실패할 수 있는 비동기 작업을
//! 정해진 횟수만큼 다시 시도합니다. 공급처와 무관하게 동작하며,
//! 어떤 에러를 재시도할지는 호출하는 쪽이 판단합니다.
//!
//! # 예시
//!
//! ```rust,ignore
//! use stock_core::retry::{with_retry, RetryPolicy};
//!
//! let policy = RetryPolicy::once(Duration::from_secs(1));
//! let series = with_retry(&policy, |e: &DataError| e.is_retryable(), |_attempt| async {
//!     provider.fetch("005930", &range).await
//! }).await?;
//! ```

use std::{fmt::Display, future::Future, time::Duration};

use tracing::{debug, warn};

/// 재시도 정책.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 최대 시도 횟수 (첫 시도 포함).
    pub max_attempts: u32,
    /// 첫 재시도 전 대기 시간.
    pub delay: Duration,
    /// 재시도마다 대기 시간에 곱하는 배수 (1.0이면 고정).
    pub backoff_multiplier: f64,
    /// 최대 대기 시간.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::once(Duration::from_millis(1000))
    }
}

impl RetryPolicy {
    /// 한 번만 다시 시도하는 정책 (총 2회).
    pub fn once(delay: Duration) -> Self {
        Self {
            max_attempts: 2,
            delay,
            backoff_multiplier: 1.0,
            max_delay: delay,
        }
    }

    /// 재시도 없음 (단일 시도).
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// 최대 시도 횟수를 지정합니다. 0은 1로 취급합니다.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// 지수 백오프 배수와 상한을 지정합니다.
    pub fn with_backoff(mut self, multiplier: f64, max_delay: Duration) -> Self {
        self.backoff_multiplier = multiplier.max(1.0);
        self.max_delay = max_delay;
        self
    }

    /// `attempt`번째 실패(0부터) 후 대기 시간.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = self.backoff_multiplier.powi(attempt as i32);
        let delay = Duration::from_secs_f64(self.delay.as_secs_f64() * multiplier);
        delay.min(self.max_delay.max(self.delay))
    }
}

/// 재시도가 포함된 비동기 작업 실행.
///
/// `operation`에는 현재 시도 번호(0부터)가 전달됩니다.
/// `should_retry`가 `false`를 반환하는 에러는 즉시 반환하고,
/// 시도 횟수를 모두 소진하면 마지막 에러를 반환합니다.
pub async fn with_retry<T, E, F, Fut, R>(
    policy: &RetryPolicy,
    should_retry: R,
    operation: F,
) -> Result<T, E>
where
    E: Display,
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempts = attempt + 1, "재시도 후 성공");
                }
                return Ok(value);
            }
            Err(e) => {
                if !should_retry(&e) {
                    debug!(error = %e, "재시도 불가능한 에러, 즉시 실패 반환");
                    return Err(e);
                }

                if attempt + 1 >= max_attempts {
                    warn!(
                        error = %e,
                        attempts = attempt + 1,
                        "최대 시도 횟수 초과"
                    );
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    error = %e,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "재시도 대기 중"
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast() -> RetryPolicy {
        RetryPolicy::once(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<i32, String> = with_retry(&fast(), |_| true, |_| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_attempt_succeeds() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<&str, String> = with_retry(&fast(), |_| true, |attempt| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                if attempt == 0 {
                    Err("connection reset".to_string())
                } else {
                    Ok("ok")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_returns_last_error_after_two_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<(), String> = with_retry(&fast(), |_| true, |attempt| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(format!("failure #{}", attempt + 1))
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failure #2");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let c = counter.clone();

        let result: Result<(), String> = with_retry(
            &fast(),
            |e: &String| !e.starts_with("no data"),
            |_| {
                let c = c.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("no data".to_string())
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_between_attempts() {
        let policy = RetryPolicy::once(Duration::from_secs(5));
        let started = tokio::time::Instant::now();

        let result: Result<(), String> =
            with_retry(&policy, |_| true, |_| async { Err("boom".to_string()) }).await;

        assert!(result.is_err());
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_delay() {
        let policy = RetryPolicy::once(Duration::from_secs(1))
            .with_max_attempts(4)
            .with_backoff(2.0, Duration::from_secs(3));

        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(3));
        assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
    }
}
