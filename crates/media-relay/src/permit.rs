// Keep-alive permits
//
// A permit tells whatever owns the signal's lifetime that dispatched work is
// still pending. It is released exactly once: `release` consumes the handle,
// and a handle dropped unreleased (panicked or cancelled task) releases itself.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermitId(pub u64);

impl fmt::Display for PermitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "permit#{}", self.0)
    }
}

/// Platform mechanism granting extra lifetime after a handler returns.
pub trait PermitIssuer: Send + Sync {
    fn issue(&self) -> PermitId;
    fn release(&self, id: PermitId);
}

/// Single-use keep-alive handle.
#[must_use = "a permit must be held until the dispatched work settles"]
pub struct Permit {
    id: PermitId,
    issuer: Option<Arc<dyn PermitIssuer>>,
}

impl Permit {
    /// Acquire synchronously from `issuer`.
    pub fn acquire(issuer: &Arc<dyn PermitIssuer>) -> Self {
        let id = issuer.issue();
        debug!(%id, "permit acquired");
        Self {
            id,
            issuer: Some(Arc::clone(issuer)),
        }
    }

    pub fn id(&self) -> PermitId {
        self.id
    }

    pub fn release(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if let Some(issuer) = self.issuer.take() {
            issuer.release(self.id);
            debug!(id = %self.id, "permit released");
        }
    }
}

impl Drop for Permit {
    fn drop(&mut self) {
        if self.issuer.is_some() {
            warn!(id = %self.id, "permit abandoned before release; releasing on drop");
            self.finish();
        }
    }
}

impl fmt::Debug for Permit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit")
            .field("id", &self.id)
            .field("held", &self.issuer.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermitStats {
    pub acquired: u64,
    pub released: u64,
    /// Releases of ids that were unknown or already released.
    pub double_releases: u64,
}

impl PermitStats {
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

/// In-process issuer that accounts for every permit it hands out.
#[derive(Default)]
pub struct PermitLedger {
    next_id: AtomicU64,
    outstanding: Mutex<HashSet<PermitId>>,
    stats: Mutex<PermitStats>,
    idle: Notify,
}

impl PermitLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> PermitStats {
        *self.stats.lock()
    }

    /// Ids currently held, in issue order.
    pub fn outstanding(&self) -> Vec<PermitId> {
        let mut ids: Vec<PermitId> = self.outstanding.lock().iter().copied().collect();
        ids.sort();
        ids
    }

    pub fn is_idle(&self) -> bool {
        self.outstanding.lock().is_empty()
    }

    /// Wait until no permit is outstanding.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl PermitIssuer for PermitLedger {
    fn issue(&self) -> PermitId {
        let id = PermitId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.outstanding.lock().insert(id);
        self.stats.lock().acquired += 1;
        id
    }

    fn release(&self, id: PermitId) {
        let (known, now_idle) = {
            let mut outstanding = self.outstanding.lock();
            let known = outstanding.remove(&id);
            (known, outstanding.is_empty())
        };

        let mut stats = self.stats.lock();
        if known {
            stats.released += 1;
        } else {
            stats.double_releases += 1;
            warn!(%id, "release of a permit that is not outstanding");
        }
        drop(stats);

        if now_idle {
            self.idle.notify_waiters();
        }
    }
}
