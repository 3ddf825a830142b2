//! Registry counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running totals kept by a registry. Updated without taking the table lock.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    registrations: AtomicU64,
    unregistrations: AtomicU64,
    dispatches: AtomicU64,
    handler_failures: AtomicU64,
    handler_panics: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn record_registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_unregistration(&self) {
        self.unregistrations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dispatch(&self) {
        self.dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.handler_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_panic(&self) {
        self.handler_panics.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, memberships: usize) -> RegistryStats {
        RegistryStats {
            memberships,
            registrations: self.registrations.load(Ordering::Relaxed),
            unregistrations: self.unregistrations.load(Ordering::Relaxed),
            dispatches: self.dispatches.load(Ordering::Relaxed),
            handler_failures: self.handler_failures.load(Ordering::Relaxed),
            handler_panics: self.handler_panics.load(Ordering::Relaxed),
        }
    }
}

/// Statistics about a handler registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Current (subscriber, kind) memberships across all kinds
    pub memberships: usize,
    /// Successful `register` calls
    pub registrations: u64,
    /// Removals performed through tokens or by identity
    pub unregistrations: u64,
    /// Dispatch calls made, including ones with no subscribers
    pub dispatches: u64,
    /// Handlers that returned an error
    pub handler_failures: u64,
    /// Handlers that panicked
    pub handler_panics: u64,
}
