use log::{debug, warn};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// Circular counter over the configured passive port range. Concurrent
/// callers never observe the same candidate mid-update.
#[derive(Debug)]
pub struct PassivePortAllocator {
    min: u16,
    max: u16,
    next: AtomicU32,
}

impl PassivePortAllocator {
    pub fn new(min: u16, max: u16) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            next: AtomicU32::new(min as u32),
        }
    }

    /// Next candidate port, wrapping from `max` back to `min`.
    pub fn next_port(&self) -> u16 {
        let previous = self
            .next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                if current as u16 >= self.max {
                    Some(self.min as u32)
                } else {
                    Some(current + 1)
                }
            })
            .unwrap_or(self.min as u32);
        previous as u16
    }
}

/// Process-wide data-connection bookkeeping, owned by the server instance
/// and shared into every session.
///
/// The passive map keys a waiting data channel by (remote address, local
/// bound address) and resolves it back to the owning control session, so an
/// inbound peer connection can be matched to its session. Removal is
/// idempotent.
#[derive(Debug)]
pub struct DataConnectionRegistry {
    allocator: PassivePortAllocator,
    passive: Mutex<HashMap<(IpAddr, SocketAddr), SocketAddr>>,
}

impl DataConnectionRegistry {
    pub fn new(port_min: u16, port_max: u16) -> Self {
        Self {
            allocator: PassivePortAllocator::new(port_min, port_max),
            passive: Mutex::new(HashMap::new()),
        }
    }

    pub fn allocator(&self) -> &PassivePortAllocator {
        &self.allocator
    }

    /// Registers a waiting passive channel. A stale entry under the same
    /// key is superseded.
    pub fn register(&self, remote: IpAddr, local: SocketAddr, owner: SocketAddr) {
        let mut passive = self.passive.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = passive.insert((remote, local), owner) {
            warn!(
                "Passive registration ({}, {}) superseded; previous owner {}",
                remote, local, previous
            );
        }
        debug!("Registered passive channel ({}, {}) -> {}", remote, local, owner);
    }

    /// Removes a registration. Removing an absent entry is a no-op.
    pub fn remove(&self, remote: IpAddr, local: SocketAddr) {
        let mut passive = self.passive.lock().unwrap_or_else(|e| e.into_inner());
        passive.remove(&(remote, local));
    }

    /// Drops every registration owned by one control session.
    pub fn remove_owner(&self, owner: SocketAddr) {
        let mut passive = self.passive.lock().unwrap_or_else(|e| e.into_inner());
        passive.retain(|_, session| *session != owner);
    }

    /// Resolves an inbound peer connection back to its owning session.
    pub fn lookup(&self, remote: IpAddr, local: SocketAddr) -> Option<SocketAddr> {
        let passive = self.passive.lock().unwrap_or_else(|e| e.into_inner());
        passive.get(&(remote, local)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> SocketAddr {
        s.parse().unwrap()
    }

    #[test]
    fn allocator_stays_inside_the_range_and_wraps() {
        let allocator = PassivePortAllocator::new(40000, 40002);
        assert_eq!(allocator.next_port(), 40000);
        assert_eq!(allocator.next_port(), 40001);
        assert_eq!(allocator.next_port(), 40002);
        // After max, the next call returns min again.
        assert_eq!(allocator.next_port(), 40000);
        for _ in 0..100 {
            let port = allocator.next_port();
            assert!((40000..=40002).contains(&port));
        }
    }

    #[test]
    fn allocator_is_race_free_under_concurrent_draws() {
        use std::sync::Arc;
        let allocator = Arc::new(PassivePortAllocator::new(41000, 41999));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let allocator = Arc::clone(&allocator);
            handles.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    let port = allocator.next_port();
                    assert!((41000..=41999).contains(&port));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn lookup_resolves_the_owning_session() {
        let registry = DataConnectionRegistry::new(40000, 40100);
        let remote = "10.0.0.7".parse().unwrap();
        let local = addr("127.0.0.1:40005");
        let owner = addr("10.0.0.7:51000");
        registry.register(remote, local, owner);
        assert_eq!(registry.lookup(remote, local), Some(owner));
        assert_eq!(registry.lookup(remote, addr("127.0.0.1:40006")), None);
    }

    #[test]
    fn removing_an_absent_entry_is_a_no_op() {
        let registry = DataConnectionRegistry::new(40000, 40100);
        let remote = "10.0.0.7".parse().unwrap();
        let local = addr("127.0.0.1:40005");
        registry.remove(remote, local);
        registry.register(remote, local, addr("10.0.0.7:51000"));
        registry.remove(remote, local);
        registry.remove(remote, local);
        assert_eq!(registry.lookup(remote, local), None);
    }

    #[test]
    fn remove_owner_clears_only_that_session() {
        let registry = DataConnectionRegistry::new(40000, 40100);
        let remote = "10.0.0.7".parse().unwrap();
        let owner_a = addr("10.0.0.7:51000");
        let owner_b = addr("10.0.0.8:51001");
        registry.register(remote, addr("127.0.0.1:40005"), owner_a);
        registry.register(remote, addr("127.0.0.1:40006"), owner_b);
        registry.remove_owner(owner_a);
        assert_eq!(registry.lookup(remote, addr("127.0.0.1:40005")), None);
        assert_eq!(registry.lookup(remote, addr("127.0.0.1:40006")), Some(owner_b));
    }
}
