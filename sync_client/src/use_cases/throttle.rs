use std::time::{Duration, Instant};

pub const LOG_THROTTLE: Duration = Duration::from_secs(2);

// Rate limiter for warnings emitted on hot paths (per tick / per message).
#[derive(Debug)]
pub struct LogThrottle {
    last: Instant,
}

impl LogThrottle {
    pub fn new() -> Self {
        // Start in the past so the first warning is never suppressed.
        let last = Instant::now()
            .checked_sub(LOG_THROTTLE)
            .unwrap_or_else(Instant::now);
        Self { last }
    }

    pub fn should_log(&mut self) -> bool {
        if self.last.elapsed() >= LOG_THROTTLE {
            self.last = Instant::now();
            true
        } else {
            false
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new()
    }
}
