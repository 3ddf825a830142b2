//! Per-kind subscriber storage.
//!
//! Each kind owns an ordered member list behind an `Arc`. Mutation copies the
//! list when a dispatch still holds the previous snapshot, so a fan-out never
//! observes a list changing under it and never holds the lock while handlers run.

use crate::capability::{EventKind, Subscriber};
use std::sync::Arc;

/// Identity of a registered subscriber.
///
/// Two ids are equal exactly when they refer to the same allocation, which is
/// how the registry tells apart equal-looking subscribers. An address is only
/// unique while something still references the allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(usize);

impl SubscriberId {
    /// Identity of the subscriber behind `subscriber`.
    pub fn of<S: ?Sized>(subscriber: &Arc<S>) -> Self {
        Self(Arc::as_ptr(subscriber) as *const () as usize)
    }
}

/// One registration of a subscriber under a kind.
#[derive(Clone)]
pub(crate) struct Member {
    pub(crate) id: SubscriberId,
    pub(crate) subscriber: Arc<dyn Subscriber>,
}

impl Member {
    pub(crate) fn new(subscriber: Arc<dyn Subscriber>) -> Self {
        Self {
            id: SubscriberId::of(&subscriber),
            subscriber,
        }
    }
}

/// Ordered member lists, one per event kind.
pub(crate) struct SubscriberTable {
    kinds: Vec<Arc<Vec<Member>>>,
}

impl SubscriberTable {
    pub(crate) fn new() -> Self {
        Self {
            kinds: (0..EventKind::COUNT).map(|_| Arc::new(Vec::new())).collect(),
        }
    }

    /// Appends `member` to the list for `kind`.
    ///
    /// Returns `false` and leaves the list unchanged when the subscriber is
    /// already a member.
    pub(crate) fn add(&mut self, kind: EventKind, member: Member) -> bool {
        if self.contains(kind, member.id) {
            return false;
        }
        Arc::make_mut(&mut self.kinds[kind.index()]).push(member);
        true
    }

    /// Removes the first occurrence of `id` from the list for `kind`.
    pub(crate) fn remove(&mut self, kind: EventKind, id: SubscriberId) -> bool {
        let Some(position) = self.kinds[kind.index()].iter().position(|m| m.id == id) else {
            return false;
        };
        Arc::make_mut(&mut self.kinds[kind.index()]).remove(position);
        true
    }

    /// Current member list for `kind`. Later mutations do not affect it.
    pub(crate) fn snapshot(&self, kind: EventKind) -> Arc<Vec<Member>> {
        Arc::clone(&self.kinds[kind.index()])
    }

    pub(crate) fn contains(&self, kind: EventKind, id: SubscriberId) -> bool {
        self.kinds[kind.index()].iter().any(|m| m.id == id)
    }

    pub(crate) fn len(&self, kind: EventKind) -> usize {
        self.kinds[kind.index()].len()
    }

    /// Empties every list and returns the number of memberships dropped.
    pub(crate) fn clear(&mut self) -> usize {
        let mut removed = 0;
        for list in &mut self.kinds {
            removed += list.len();
            *list = Arc::new(Vec::new());
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy;
    impl Subscriber for Dummy {}

    fn member() -> (Arc<dyn Subscriber>, Member) {
        let sub: Arc<dyn Subscriber> = Arc::new(Dummy);
        let member = Member::new(Arc::clone(&sub));
        (sub, member)
    }

    #[test]
    fn test_add_is_idempotent_per_kind() {
        let mut table = SubscriberTable::new();
        let (_sub, m) = member();

        assert!(table.add(EventKind::Chat, m.clone()));
        assert!(!table.add(EventKind::Chat, m.clone()));
        assert!(table.add(EventKind::Quit, m));
        assert_eq!(table.len(EventKind::Chat), 1);
        assert_eq!(table.len(EventKind::Quit), 1);
    }

    #[test]
    fn test_remove_preserves_order_of_rest() {
        let mut table = SubscriberTable::new();
        let (_a, a) = member();
        let (_b, b) = member();
        let (_c, c) = member();
        let (a_id, b_id, c_id) = (a.id, b.id, c.id);

        table.add(EventKind::Move, a);
        table.add(EventKind::Move, b);
        table.add(EventKind::Move, c);

        assert!(table.remove(EventKind::Move, b_id));
        assert!(!table.remove(EventKind::Move, b_id));

        let ids: Vec<_> = table.snapshot(EventKind::Move).iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![a_id, c_id]);
    }

    #[test]
    fn test_snapshot_is_unaffected_by_later_mutation() {
        let mut table = SubscriberTable::new();
        let (_a, a) = member();
        let (_b, b) = member();
        let a_id = a.id;

        table.add(EventKind::Chat, a);
        let before = table.snapshot(EventKind::Chat);
        table.add(EventKind::Chat, b);
        table.remove(EventKind::Chat, a_id);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].id, a_id);
        assert_eq!(table.len(EventKind::Chat), 1);
    }

    #[test]
    fn test_clear_counts_memberships() {
        let mut table = SubscriberTable::new();
        let (_a, a) = member();
        table.add(EventKind::Chat, a.clone());
        table.add(EventKind::Jump, a.clone());
        table.add(EventKind::Diagnostics, a);

        assert_eq!(table.clear(), 3);
        assert!(EventKind::ALL.iter().all(|k| table.len(*k) == 0));
    }

    #[test]
    fn test_distinct_allocations_have_distinct_ids() {
        let a: Arc<dyn Subscriber> = Arc::new(Dummy);
        let b: Arc<dyn Subscriber> = Arc::new(Dummy);
        assert_ne!(SubscriberId::of(&a), SubscriberId::of(&b));
        assert_eq!(SubscriberId::of(&a), SubscriberId::of(&Arc::clone(&a)));
    }
}
