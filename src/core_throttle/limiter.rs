use std::sync::Arc;
use std::time::Duration;

use log::trace;
use tokio::time::sleep;

use crate::core_throttle::ThroughputMonitor;

/// Size function for the payload shapes that flow through a limited
/// channel. Raw buffers measure themselves; other shapes supply their own
/// implementation.
pub trait MessageSize {
    fn byte_size(&self) -> u64;
}

impl MessageSize for [u8] {
    fn byte_size(&self) -> u64 {
        self.len() as u64
    }
}

impl MessageSize for str {
    fn byte_size(&self) -> u64 {
        self.len() as u64
    }
}

impl MessageSize for String {
    fn byte_size(&self) -> u64 {
        self.len() as u64
    }
}

/// Paces reads and writes on one channel against a session-scoped monitor
/// and a process-global one. The limiter only accounts and delays; payloads
/// are never dropped or altered.
///
/// The session monitor's lifecycle belongs to this limiter (`on_connect` /
/// `on_close`); the global monitor is owned and started/stopped by the
/// server.
#[derive(Clone, Default)]
pub struct BandwidthLimiter {
    session: Option<Arc<ThroughputMonitor>>,
    global: Option<Arc<ThroughputMonitor>>,
}

impl BandwidthLimiter {
    pub fn new(
        session: Option<Arc<ThroughputMonitor>>,
        global: Option<Arc<ThroughputMonitor>>,
    ) -> Self {
        Self { session, global }
    }

    /// Limiter for one channel: a fresh session-scoped monitor (when the
    /// per-session rate is set) plus the shared global monitor.
    pub fn for_channel(session_rate: u64, global: Option<Arc<ThroughputMonitor>>) -> Self {
        let session = if session_rate > 0 {
            Some(Arc::new(ThroughputMonitor::new(session_rate)))
        } else {
            None
        };
        Self { session, global }
    }

    /// Binds and starts the session monitor now that the channel identity
    /// is known. Called before the first byte moves so no traffic escapes
    /// the accounting.
    pub fn on_connect(&self, channel: &str) {
        if let Some(monitor) = &self.session {
            monitor.start(channel);
        }
    }

    /// Stops the session monitor. The global monitor keeps running; its
    /// lifecycle is not this limiter's to manage.
    pub fn on_close(&self) {
        if let Some(monitor) = &self.session {
            monitor.stop();
        }
    }

    /// Swaps the session monitor at runtime: the outgoing one is stopped,
    /// the incoming one is bound and started.
    pub fn replace_session_monitor(
        &mut self,
        monitor: Option<Arc<ThroughputMonitor>>,
        channel: &str,
    ) {
        if let Some(old) = self.session.take() {
            old.stop();
        }
        if let Some(new) = &monitor {
            new.start(channel);
        }
        self.session = monitor;
    }

    /// Swaps the global monitor without starting or stopping either side.
    pub fn replace_global_monitor(&mut self, monitor: Option<Arc<ThroughputMonitor>>) {
        self.global = monitor;
    }

    fn charge(&self, bytes: u64) -> Duration {
        let mut delay = Duration::ZERO;
        if let Some(monitor) = &self.session {
            delay = delay.max(monitor.charge(bytes));
        }
        if let Some(monitor) = &self.global {
            delay = delay.max(monitor.charge(bytes));
        }
        delay
    }

    /// Charges an inbound payload against both monitors and applies the
    /// resulting back-pressure.
    pub async fn on_read(&self, bytes: u64) {
        let delay = self.charge(bytes);
        if !delay.is_zero() {
            trace!("Throttling read of {} bytes for {:?}", bytes, delay);
            sleep(delay).await;
        }
    }

    /// Charges bytes about to be written, before the write proceeds.
    pub async fn on_write(&self, bytes: u64) {
        let delay = self.charge(bytes);
        if !delay.is_zero() {
            trace!("Throttling write of {} bytes for {:?}", bytes, delay);
            sleep(delay).await;
        }
    }

    pub async fn on_read_msg<M: MessageSize + ?Sized>(&self, message: &M) {
        self.on_read(message.byte_size()).await;
    }

    pub async fn on_write_msg<M: MessageSize + ?Sized>(&self, message: &M) {
        self.on_write(message.byte_size()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_monitor_starts_on_connect_and_stops_on_close() {
        let session = Arc::new(ThroughputMonitor::new(1024));
        let limiter = BandwidthLimiter::new(Some(Arc::clone(&session)), None);
        assert!(!session.is_running());
        limiter.on_connect("data");
        assert!(session.is_running());
        limiter.on_close();
        assert!(!session.is_running());
    }

    #[test]
    fn close_leaves_the_global_monitor_alone() {
        let global = Arc::new(ThroughputMonitor::new(1024));
        global.start("global");
        let limiter = BandwidthLimiter::new(None, Some(Arc::clone(&global)));
        limiter.on_close();
        assert!(global.is_running());
    }

    #[test]
    fn replacing_the_session_monitor_stops_the_old_one() {
        let old = Arc::new(ThroughputMonitor::new(1024));
        let new = Arc::new(ThroughputMonitor::new(2048));
        let mut limiter = BandwidthLimiter::new(Some(Arc::clone(&old)), None);
        limiter.on_connect("data");
        limiter.replace_session_monitor(Some(Arc::clone(&new)), "data");
        assert!(!old.is_running());
        assert!(new.is_running());
    }

    #[tokio::test]
    async fn unlimited_limiter_passes_through() {
        let limiter = BandwidthLimiter::default();
        limiter.on_read(1_000_000).await;
        limiter.on_write_msg("226 Transfer complete.\r\n").await;
    }
}
