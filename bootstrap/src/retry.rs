//! 启动期依赖的连接重试

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

/// 指数退避策略
///
/// 每次失败后延迟翻倍，封顶于 `max_delay`。
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    pub attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
        }
    }
}

impl Backoff {
    /// 第 `failures` 次失败之后的等待时间
    pub fn delay_after(&self, failures: u32) -> Duration {
        let factor = 1u32.checked_shl(failures.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// 反复执行 `connect` 直到成功或用完次数，返回最后一次错误
    pub async fn retry<T, E, F, Fut>(&self, dependency: &str, mut connect: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let attempts = self.attempts.max(1);
        let mut failures = 0;

        loop {
            let err = match connect().await {
                Ok(value) => {
                    if failures > 0 {
                        info!(dependency, failures, "Dependency reachable");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            failures += 1;
            if failures >= attempts {
                warn!(dependency, attempts, error = %err, "Giving up on dependency");
                return Err(err);
            }

            let delay = self.delay_after(failures);
            warn!(
                dependency,
                attempt = failures,
                error = %err,
                retry_in_ms = delay.as_millis() as u64,
                "Dependency unavailable"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
