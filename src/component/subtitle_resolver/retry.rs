use anyhow::Result;
use log::warn;
use std::thread;
use std::time::Duration;

const LOG_TARGET: &str = "frame_capture::subtitles";

/// 重試之間的等待
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// 線性退避：第 n 次失敗後等待 n 個單位，最多嘗試 `max_attempts` 次
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub unit: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, unit: Duration) -> Self {
        Self { max_attempts, unit }
    }

    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt)
    }

    /// 執行 `operation` 直到成功或用盡次數，回傳最後一次的錯誤
    pub fn run<T, F>(&self, sleeper: &dyn Sleeper, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= max_attempts => {
                    return Err(e.context(format!("{label} 嘗試 {attempt} 次後仍失敗")));
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        target: LOG_TARGET,
                        "{label} 失敗（第 {attempt}/{max_attempts} 次），{:.1} 秒後重試: {e:#}",
                        delay.as_secs_f64()
                    );
                    sleeper.sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}
