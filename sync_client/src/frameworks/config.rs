use std::{env, time::Duration};

// Runtime/client constants (not gameplay tuning).

pub fn server_url() -> String {
    env::var("SYNC_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:3001/ws".to_string())
}

pub fn tick_interval() -> Duration {
    let hz = env::var("SYNC_TICK_RATE_HZ")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|hz| *hz > 0)
        .unwrap_or(60);
    Duration::from_millis(1000 / hz.min(1000))
}

// Full pose every tick unless tuned down.
pub fn publish_every_n_ticks() -> u32 {
    env::var("POSE_PUBLISH_EVERY_N_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

pub fn handshake_timeout() -> Duration {
    let millis = env::var("SYNC_HANDSHAKE_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(5000);
    Duration::from_millis(millis)
}

// Gesture cadence for the headless adapter; None disables auto-fire.
pub fn auto_fire_interval() -> Option<Duration> {
    env::var("SYNC_AUTO_FIRE_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .map(Duration::from_millis)
}

pub const OUTBOUND_QUEUE_CAPACITY: usize = 1024;
pub const INBOUND_QUEUE_CAPACITY: usize = 128;
pub const GESTURE_CHANNEL_CAPACITY: usize = 16;
