use async_trait::async_trait;
use stockscope_core::config::PacingConfig;
use stockscope_core::market::port::Throttle;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::trace;

/// # Summary
/// 令牌桶限速器，供多个采集任务共享。
///
/// # Invariants
/// - 令牌数不超过 `capacity`，按 `refill_rate` 个/秒匀速补充。
/// - 令牌可以被预支为负数，预支者在锁外等待到自己的令牌产生，等待顺序即取号顺序。
/// - `refill_rate` 非正或非有限时不限速。
pub struct TokenBucket {
    // 桶状态
    state: Mutex<BucketState>,
    // 桶容量
    capacity: f64,
    // 每秒补充的令牌数
    refill_rate: f64,
}

struct BucketState {
    // 当前令牌数，可为负
    tokens: f64,
    // 上次补充时间
    last_refill: Instant,
}

impl TokenBucket {
    /// # Summary
    /// 创建限速器，初始为满桶。
    ///
    /// # Arguments
    /// * `requests_per_second`: 每秒允许的请求数。
    /// * `burst`: 桶容量，至少为 1。
    ///
    /// # Returns
    /// 限速器实例。
    pub fn per_second(requests_per_second: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_rate: requests_per_second,
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::per_second(config.requests_per_second, config.burst)
    }

    fn is_unlimited(&self) -> bool {
        !(self.refill_rate.is_finite() && self.refill_rate > 0.0)
    }

    /// # Summary
    /// 取一个令牌并返回需要等待的时长。
    ///
    /// # Logic
    /// 1. 按距上次补充的时间补充令牌，封顶 `capacity`。
    /// 2. 扣除一个令牌。
    /// 3. 若令牌为负，欠额除以补充速率即为等待时长。
    async fn reserve(&self) -> Duration {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity);
        state.last_refill = now;
        state.tokens -= 1.0;

        if state.tokens >= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(-state.tokens / self.refill_rate).unwrap_or(Duration::MAX)
    }
}

#[async_trait]
impl Throttle for TokenBucket {
    async fn acquire(&self) {
        if self.is_unlimited() {
            return;
        }
        let wait = self.reserve().await;
        if !wait.is_zero() {
            trace!("Throttle: waiting {:?}", wait);
            sleep(wait).await;
        }
    }
}
