use embassy_time::Duration;

/// Counters reported by the OS sleep manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuStats {
    pub uptime: Duration,
    pub idle: Duration,
    pub sleep: Duration,
    pub deep_sleep: Duration,
}

/// Uptime split for display as `hh:mm:ss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UptimeParts {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl From<Duration> for UptimeParts {
    fn from(uptime: Duration) -> Self {
        let total = uptime.as_secs();
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

/// Where the stats page gets its OS counters from.
pub trait CpuStatsSource {
    /// `None` when statistics collection is not compiled in.
    fn cpu_stats(&self) -> Option<CpuStats>;
}
