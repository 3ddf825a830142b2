//! Registry handle, registration and cleanup.

use crate::capability::{EventKind, Subscriber};
use crate::error::EventError;
use crate::registry::{Member, SubscriberId, SubscriberTable};
use crate::stats::{RegistryStats, StatsCounters};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Shared state behind every clone of a [`HandlerRegistry`].
pub(crate) struct RegistryInner {
    /// Guards mutation and the dispatch snapshot step, never handler execution.
    pub(crate) table: Mutex<SubscriberTable>,
    pub(crate) stats: StatsCounters,
}

impl RegistryInner {
    /// Removes `id` from each of `kinds` under one lock acquisition.
    fn remove_from(&self, id: SubscriberId, kinds: &[EventKind]) -> usize {
        let removed = {
            let mut table = self.table.lock();
            kinds.iter().filter(|kind| table.remove(**kind, id)).count()
        };
        if removed > 0 {
            self.stats.record_unregistration();
        }
        removed
    }
}

/// Capability-typed subscriber registry with per-kind fan-out.
///
/// One registry exists per logical owner, typically a player session.
/// Cloning is cheap and every clone refers to the same registry, so it can be
/// handed to plugin code, network callbacks and admin tasks alike.
///
/// # Examples
///
/// ```rust
/// use handler_system::{subscriber, ChatHandler, EventContext, HandlerRegistry, HandlerResult};
/// use std::sync::Arc;
///
/// struct Shout;
///
/// impl ChatHandler for Shout {
///     fn handle_chat(&self, _ctx: &mut EventContext, message: &mut String) -> HandlerResult {
///         *message = message.to_uppercase();
///         Ok(())
///     }
/// }
///
/// subscriber!(Shout: Chat);
///
/// let registry = HandlerRegistry::new();
/// let token = registry.register(Arc::new(Shout)).unwrap();
///
/// let mut ctx = EventContext::new();
/// let mut message = String::from("hello");
/// registry.dispatch_chat(&mut ctx, &mut message).unwrap();
/// assert_eq!(message, "HELLO");
///
/// assert_eq!(token.unregister(), 1);
/// ```
#[derive(Clone)]
pub struct HandlerRegistry {
    pub(crate) inner: Arc<RegistryInner>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                table: Mutex::new(SubscriberTable::new()),
                stats: StatsCounters::default(),
            }),
        }
    }

    /// Registers a subscriber for every kind it implements.
    ///
    /// Each kind's capability is tested once, here; dispatch never re-checks
    /// subscribers that did not match. Kinds the subscriber already belongs to
    /// are left untouched, so registering an instance twice never yields two
    /// invocations per dispatch.
    ///
    /// # Returns
    ///
    /// A token that removes the subscriber from every matched kind, or
    /// [`EventError::InvalidSubscriber`] when it implements no capability.
    pub fn register(&self, subscriber: Arc<dyn Subscriber>) -> Result<UnregisterToken, EventError> {
        let kinds = EventKind::supported_by(subscriber.as_ref());
        if kinds.is_empty() {
            let name = subscriber.subscriber_name().to_string();
            warn!("⚠️ Rejected subscriber {} with no handler capability", name);
            return Err(EventError::InvalidSubscriber { subscriber: name });
        }

        let member = Member::new(subscriber);
        let id = member.id;
        let added = {
            let mut table = self.inner.table.lock();
            kinds
                .iter()
                .filter(|kind| table.add(**kind, member.clone()))
                .count()
        };

        if added < kinds.len() {
            debug!(
                "Subscriber {} was already registered for {} of {} kind(s)",
                member.subscriber.subscriber_name(),
                kinds.len() - added,
                kinds.len()
            );
        }
        self.inner.stats.record_registration();
        debug!(
            "📝 Registered {} for {:?}",
            member.subscriber.subscriber_name(),
            kinds
        );

        Ok(UnregisterToken {
            registry: Arc::downgrade(&self.inner),
            subscriber: Arc::downgrade(&member.subscriber),
            id,
            kinds: kinds.into(),
            spent: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Removes `subscriber` from every kind without using its token.
    ///
    /// Returns the number of kinds it was removed from; 0 when it was not
    /// registered.
    pub fn unregister<S: ?Sized>(&self, subscriber: &Arc<S>) -> usize {
        let removed = self.inner.remove_from(SubscriberId::of(subscriber), EventKind::ALL);
        if removed > 0 {
            debug!("🗑️ Unregistered subscriber from {} kind(s)", removed);
        }
        removed
    }

    /// Empties every kind. Returns the number of memberships dropped.
    pub fn clear(&self) -> usize {
        let removed = self.inner.table.lock().clear();
        if removed > 0 {
            debug!("🧹 Cleared {} subscriber membership(s)", removed);
        }
        removed
    }

    pub fn is_registered<S: ?Sized>(&self, subscriber: &Arc<S>) -> bool {
        let id = SubscriberId::of(subscriber);
        let table = self.inner.table.lock();
        EventKind::ALL.iter().any(|kind| table.contains(*kind, id))
    }

    /// Number of subscribers a dispatch of `kind` would currently reach.
    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.inner.table.lock().len(kind)
    }

    /// Kinds `subscriber` currently belongs to, in taxonomy order.
    pub fn kinds_of<S: ?Sized>(&self, subscriber: &Arc<S>) -> Vec<EventKind> {
        let id = SubscriberId::of(subscriber);
        let table = self.inner.table.lock();
        EventKind::ALL
            .iter()
            .copied()
            .filter(|kind| table.contains(*kind, id))
            .collect()
    }

    pub fn stats(&self) -> RegistryStats {
        let memberships = {
            let table = self.inner.table.lock();
            EventKind::ALL.iter().map(|kind| table.len(*kind)).sum()
        };
        self.inner.stats.snapshot(memberships)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("stats", &self.stats())
            .finish()
    }
}

/// Cleanup handle returned by [`HandlerRegistry::register`].
///
/// Holds one removal per kind the subscriber matched. Dropping the token does
/// not unregister anything. Clones share state: once any clone has run, every
/// later call on any clone is a no-op. The registry is referenced weakly, so a
/// token that outlives its registry does nothing.
///
/// The token also keeps a weak reference to its subscriber. That pins the
/// subscriber's allocation, so no other subscriber can take over its
/// [`SubscriberId`] while the token is alive.
#[derive(Clone)]
pub struct UnregisterToken {
    registry: Weak<RegistryInner>,
    subscriber: Weak<dyn Subscriber>,
    id: SubscriberId,
    kinds: Arc<[EventKind]>,
    spent: Arc<AtomicBool>,
}

impl UnregisterToken {
    /// Runs the recorded removals and returns how many memberships were removed.
    pub fn unregister(&self) -> usize {
        if self.spent.swap(true, Ordering::AcqRel) {
            return 0;
        }
        let Some(inner) = self.registry.upgrade() else {
            return 0;
        };
        // Memberships hold strong references, so a dropped subscriber has none left.
        if self.subscriber.strong_count() == 0 {
            return 0;
        }
        let removed = inner.remove_from(self.id, &self.kinds);
        debug!("🗑️ Token removed subscriber from {} kind(s)", removed);
        removed
    }

    /// Kinds the subscriber matched when it was registered.
    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    pub fn subscriber_id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the token has already run.
    pub fn is_spent(&self) -> bool {
        self.spent.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for UnregisterToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnregisterToken")
            .field("id", &self.id)
            .field("kinds", &self.kinds)
            .field("spent", &self.is_spent())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{ChatHandler, JumpHandler, QuitHandler};
    use crate::context::EventContext;
    use crate::error::HandlerResult;
    use crate::subscriber;

    struct Listener;

    impl ChatHandler for Listener {
        fn handle_chat(&self, _ctx: &mut EventContext, _message: &mut String) -> HandlerResult {
            Ok(())
        }
    }

    impl QuitHandler for Listener {
        fn handle_quit(&self) -> HandlerResult {
            Ok(())
        }
    }

    subscriber!(Listener: Chat, Quit);

    struct Jumper;

    impl JumpHandler for Jumper {
        fn handle_jump(&self) -> HandlerResult {
            Ok(())
        }
    }

    subscriber!(Jumper: Jump);

    struct Inert;
    impl Subscriber for Inert {}

    #[test]
    fn test_register_matches_every_capability() {
        let registry = HandlerRegistry::new();
        let listener = Arc::new(Listener);
        let token = registry.register(listener.clone()).unwrap();

        assert_eq!(token.kinds(), &[EventKind::Chat, EventKind::Quit]);
        assert_eq!(registry.kinds_of(&listener), vec![EventKind::Chat, EventKind::Quit]);
        assert!(registry.is_registered(&listener));
        assert_eq!(registry.subscriber_count(EventKind::Jump), 0);
    }

    #[test]
    fn test_register_rejects_subscriber_without_capabilities() {
        let registry = HandlerRegistry::new();
        let err = registry.register(Arc::new(Inert)).unwrap_err();

        assert!(matches!(
            err,
            EventError::InvalidSubscriber { ref subscriber } if subscriber.ends_with("Inert")
        ));
        assert_eq!(registry.stats().registrations, 0);
    }

    #[test]
    fn test_token_is_idempotent() {
        let registry = HandlerRegistry::new();
        let listener = Arc::new(Listener);
        let token = registry.register(listener.clone()).unwrap();
        let copy = token.clone();

        assert_eq!(token.unregister(), 2);
        assert!(copy.is_spent());
        assert_eq!(copy.unregister(), 0);
        assert_eq!(token.unregister(), 0);
        assert!(!registry.is_registered(&listener));
    }

    #[test]
    fn test_spent_token_does_not_remove_a_later_registration() {
        let registry = HandlerRegistry::new();
        let listener = Arc::new(Listener);
        let first = registry.register(listener.clone()).unwrap();
        first.unregister();

        let _second = registry.register(listener.clone()).unwrap();
        assert_eq!(first.unregister(), 0);
        assert!(registry.is_registered(&listener));
    }

    #[test]
    fn test_stale_token_leaves_later_subscribers_alone() {
        let registry = HandlerRegistry::new();
        for _ in 0..1000 {
            let jumper = Arc::new(Jumper);
            let stale = registry.register(jumper.clone()).unwrap();
            registry.clear();
            drop(jumper);

            let fresh = Arc::new(Jumper);
            registry.register(fresh.clone()).unwrap();
            assert_ne!(SubscriberId::of(&fresh), stale.subscriber_id());

            assert_eq!(stale.unregister(), 0);
            assert!(registry.is_registered(&fresh));
            assert_eq!(registry.subscriber_count(EventKind::Jump), 1);
            registry.clear();
        }
    }

    #[test]
    fn test_token_after_manual_unregister_is_inert() {
        let registry = HandlerRegistry::new();
        let first = Arc::new(Listener);
        let token = registry.register(first.clone()).unwrap();
        assert_eq!(registry.unregister(&first), 2);
        drop(first);

        let second = Arc::new(Listener);
        registry.register(second.clone()).unwrap();
        assert_eq!(token.unregister(), 0);
        assert_eq!(registry.kinds_of(&second), vec![EventKind::Chat, EventKind::Quit]);
    }

    #[test]
    fn test_token_outliving_registry_is_inert() {
        let registry = HandlerRegistry::new();
        let token = registry.register(Arc::new(Jumper)).unwrap();
        drop(registry);
        assert_eq!(token.unregister(), 0);
    }

    #[test]
    fn test_unregister_by_identity() {
        let registry = HandlerRegistry::new();
        let a = Arc::new(Listener);
        let b = Arc::new(Listener);
        registry.register(a.clone()).unwrap();
        registry.register(b.clone()).unwrap();

        assert_eq!(registry.unregister(&a), 2);
        assert_eq!(registry.unregister(&a), 0);
        assert!(registry.is_registered(&b));
        assert_eq!(registry.subscriber_count(EventKind::Chat), 1);
    }

    #[test]
    fn test_clear_and_stats() {
        let registry = HandlerRegistry::new();
        registry.register(Arc::new(Listener)).unwrap();
        registry.register(Arc::new(Jumper)).unwrap();

        let stats = registry.stats();
        assert_eq!(stats.registrations, 2);
        assert_eq!(stats.memberships, 3);

        assert_eq!(registry.clear(), 3);
        assert_eq!(registry.stats().memberships, 0);
        assert_eq!(registry.clear(), 0);
    }

    #[test]
    fn test_clones_share_state() {
        let registry = HandlerRegistry::new();
        let other = registry.clone();
        other.register(Arc::new(Jumper)).unwrap();
        assert_eq!(registry.subscriber_count(EventKind::Jump), 1);
    }
}
