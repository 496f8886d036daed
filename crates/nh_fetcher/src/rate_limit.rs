use std::time::Duration;

use tokio::time::Instant;

/// NewsData.io resets its quota every 15 minutes.
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);
pub const MIN_RATE_LIMIT_WAIT: Duration = Duration::from_secs(10);

/// What is left of the window after `elapsed`, never less than `min`.
pub fn remaining_wait(window: Duration, elapsed: Duration, min: Duration) -> Duration {
    window.saturating_sub(elapsed).max(min)
}

/// Tracks when the current rate-limit window started.
#[derive(Debug, Default)]
pub struct RateLimitTimer {
    started: Option<Instant>,
}

impl RateLimitTimer {
    pub fn start_if_idle(&mut self) {
        if self.started.is_none() {
            self.started = Some(Instant::now());
        }
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    pub fn elapsed(&self) -> Duration {
        self.started.map(|s| s.elapsed()).unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.started = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_wait() {
        assert_eq!(
            remaining_wait(RATE_LIMIT_WINDOW, Duration::from_secs(400), MIN_RATE_LIMIT_WAIT),
            Duration::from_secs(500)
        );
        assert_eq!(
            remaining_wait(RATE_LIMIT_WINDOW, Duration::from_secs(895), MIN_RATE_LIMIT_WAIT),
            Duration::from_secs(10)
        );
        assert_eq!(
            remaining_wait(RATE_LIMIT_WINDOW, Duration::from_secs(2000), MIN_RATE_LIMIT_WAIT),
            Duration::from_secs(10)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_measures_from_first_start() {
        let mut timer = RateLimitTimer::default();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed(), Duration::ZERO);

        timer.start_if_idle();
        tokio::time::sleep(Duration::from_secs(30)).await;
        timer.start_if_idle();
        assert_eq!(timer.elapsed(), Duration::from_secs(30));

        timer.reset();
        assert!(!timer.is_running());
    }
}
