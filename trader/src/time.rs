use chrono::Utc;

/// Wall-clock milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

/// Wall-clock seconds since the Unix epoch, as stamped on signal frames.
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}
