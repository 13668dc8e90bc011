/// Session counters and the connection status indicator.
///
/// Stats live for one process: uptime counts from a monotonic start
/// instant, the token figure accumulates `usage.total_tokens` across
/// successful exchanges, and latency holds only the most recent
/// round-trip. Nothing here is persisted.
use std::time::Instant;

// ---------------------------------------------------------------------------
// Status indicator
// ---------------------------------------------------------------------------

/// Mutually exclusive connection states shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStatus {
    /// No API key configured.
    Standby,
    /// Key present, no request in flight.
    Online,
    /// One request outstanding.
    Processing,
}

impl LinkStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standby => "STANDBY",
            Self::Online => "ONLINE",
            Self::Processing => "PROCESSING",
        }
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Cumulative session statistics.
#[derive(Debug)]
pub struct SessionStats {
    started: Instant,
    total_tokens: u64,
    last_latency_ms: Option<u64>,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            total_tokens: 0,
            last_latency_ms: None,
        }
    }

    /// Record one successful exchange: add its token usage, overwrite the
    /// displayed latency.
    pub fn record_exchange(&mut self, tokens: u64, latency_ms: u64) {
        self.total_tokens += tokens;
        self.last_latency_ms = Some(latency_ms);
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }

    pub fn last_latency_ms(&self) -> Option<u64> {
        self.last_latency_ms
    }

    /// Uptime since session start, formatted `MM:SS`.
    pub fn uptime(&self) -> String {
        format_uptime(self.started.elapsed().as_secs())
    }
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Format elapsed seconds as zero-padded `MM:SS`. Minutes grow without
/// bound; there is no hour rollover.
pub fn format_uptime(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_zero_padded() {
        assert_eq!(format_uptime(0), "00:00");
        assert_eq!(format_uptime(5), "00:05");
        assert_eq!(format_uptime(65), "01:05");
        assert_eq!(format_uptime(600), "10:00");
    }

    #[test]
    fn uptime_minutes_grow_without_hour_rollover() {
        assert_eq!(format_uptime(3600), "60:00");
        assert_eq!(format_uptime(7265), "121:05");
    }

    #[test]
    fn stats_accumulate_tokens_and_overwrite_latency() {
        let mut stats = SessionStats::new();
        assert_eq!(stats.total_tokens(), 0);
        assert_eq!(stats.last_latency_ms(), None);

        stats.record_exchange(42, 120);
        assert_eq!(stats.total_tokens(), 42);
        assert_eq!(stats.last_latency_ms(), Some(120));

        stats.record_exchange(8, 300);
        assert_eq!(stats.total_tokens(), 50);
        assert_eq!(stats.last_latency_ms(), Some(300));
    }

    #[test]
    fn status_strings() {
        assert_eq!(LinkStatus::Standby.to_string(), "STANDBY");
        assert_eq!(LinkStatus::Online.to_string(), "ONLINE");
        assert_eq!(LinkStatus::Processing.to_string(), "PROCESSING");
    }
}
