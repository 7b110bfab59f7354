//! Navigation epochs for discarding stale identity checks.
//!
//! Every navigation advances the epoch and carries a ticket for it. A result
//! that resolves after the user has already moved on finds its ticket
//! outdated and is dropped instead of being applied to the new view.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic navigation counter shared by a navigator and its tickets.
#[derive(Debug, Clone, Default)]
pub struct NavigationEpoch {
    current: Arc<AtomicU64>,
}

impl NavigationEpoch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new navigation, superseding every outstanding ticket.
    #[must_use]
    pub fn advance(&self) -> NavigationTicket {
        let issued = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        NavigationTicket { epoch: self.clone(), issued }
    }

    /// A ticket for the navigation already in progress (prefetch).
    #[must_use]
    pub fn ticket(&self) -> NavigationTicket {
        NavigationTicket { epoch: self.clone(), issued: self.current.load(Ordering::SeqCst) }
    }
}

/// Proof that a piece of work belongs to a particular navigation.
#[derive(Debug, Clone)]
pub struct NavigationTicket {
    epoch: NavigationEpoch,
    issued: u64,
}

impl NavigationTicket {
    /// True while no newer navigation has started.
    #[must_use]
    pub fn is_current(&self) -> bool {
        self.epoch.current.load(Ordering::SeqCst) == self.issued
    }
}
