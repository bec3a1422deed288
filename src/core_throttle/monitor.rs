use log::{debug, warn};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Accounting window for the pacing computation.
const WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
struct MonitorState {
    phase: Phase,
    channel: Option<String>,
    window_start: Option<Instant>,
    bytes: u64,
}

/// Tracks bytes moved over a channel within a rolling window and computes
/// the delay needed to keep the channel at or below the configured rate.
///
/// A monitor is started once its channel is known, stopped when the channel
/// closes, and is never restarted after that.
#[derive(Debug)]
pub struct ThroughputMonitor {
    /// Bytes per second; 0 means unlimited.
    limit: u64,
    state: Mutex<MonitorState>,
}

impl ThroughputMonitor {
    pub fn new(limit_bytes_per_sec: u64) -> Self {
        Self {
            limit: limit_bytes_per_sec,
            state: Mutex::new(MonitorState {
                phase: Phase::Idle,
                channel: None,
                window_start: None,
                bytes: 0,
            }),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Binds the monitor to a channel and opens the accounting window.
    /// A stopped monitor stays stopped.
    pub fn start(&self, channel: &str) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        match state.phase {
            Phase::Idle => {
                state.phase = Phase::Running;
                state.channel = Some(channel.to_string());
                state.window_start = Some(Instant::now());
                state.bytes = 0;
                debug!("Throughput monitor started on channel {}", channel);
            }
            Phase::Running => {
                warn!("Throughput monitor already running on {:?}", state.channel);
            }
            Phase::Stopped => {
                warn!("Refusing to restart a stopped throughput monitor");
            }
        }
    }

    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.phase == Phase::Running {
            debug!("Throughput monitor stopped on channel {:?}", state.channel);
        }
        state.phase = Phase::Stopped;
    }

    pub fn is_running(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.phase == Phase::Running
    }

    /// Charges `bytes` against the current window and returns how long the
    /// caller must pause to stay under the rate cap. Unlimited or
    /// non-running monitors never ask for a delay.
    pub fn charge(&self, bytes: u64) -> Duration {
        if self.limit == 0 {
            return Duration::ZERO;
        }
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.phase != Phase::Running {
            return Duration::ZERO;
        }
        let now = Instant::now();
        let start = match state.window_start {
            Some(start) if now.duration_since(start) < WINDOW => start,
            _ => {
                state.window_start = Some(now);
                state.bytes = 0;
                now
            }
        };
        state.bytes += bytes;
        let elapsed = now.duration_since(start);
        let expected = Duration::from_secs_f64(state.bytes as f64 / self.limit as f64);
        expected.saturating_sub(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_monitor_never_delays() {
        let monitor = ThroughputMonitor::new(0);
        monitor.start("data");
        assert_eq!(monitor.charge(10_000_000), Duration::ZERO);
    }

    #[test]
    fn charge_before_start_is_free() {
        let monitor = ThroughputMonitor::new(1024);
        assert_eq!(monitor.charge(4096), Duration::ZERO);
    }

    #[test]
    fn over_budget_charge_requests_a_delay() {
        let monitor = ThroughputMonitor::new(1024);
        monitor.start("data");
        // 4 KiB against a 1 KiB/s cap wants roughly four seconds of pacing.
        let delay = monitor.charge(4096);
        assert!(delay > Duration::from_secs(3));
        assert!(delay <= Duration::from_secs(4));
    }

    #[test]
    fn stopped_monitor_never_restarts() {
        let monitor = ThroughputMonitor::new(1024);
        monitor.start("control");
        monitor.stop();
        monitor.start("control");
        assert!(!monitor.is_running());
        assert_eq!(monitor.charge(4096), Duration::ZERO);
    }
}
