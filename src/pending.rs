use std::collections::HashMap;
use std::mem;

use parking_lot::Mutex;
use uuid::Uuid;

/// What should happen to an identifier at the next commit.
pub(crate) enum Intent {
    Insert(Option<Uuid>),
    Remove,
}

/// The not-yet-committed side of the directory: at most one live intent per
/// identifier, with the latest accepted call overwriting the earlier one.
///
/// Membership arbitration happens under the log's mutex so that racing
/// callers observe a single linear order: of N threads inserting the same
/// identifier, exactly one wins. The committed generation is consulted
/// through a callback, which keeps this type free of any knowledge of the
/// buffer layout (and keeps the lock order fixed at pending first, committed
/// read second).
pub(crate) struct PendingLog {
    ops: Mutex<HashMap<i64, Intent>>,
}

impl PendingLog {
    pub(crate) fn new() -> Self {
        Self {
            ops: Mutex::new(HashMap::new()),
        }
    }

    /// Records an insert intent and returns `true` iff `element` is not a
    /// member of the combined pending + committed view. A pending removal is
    /// overwritten; a pending insert makes this call a duplicate.
    pub(crate) fn accept_insert(
        &self,
        element: i64,
        uuid: Option<Uuid>,
        committed_member: impl FnOnce(i64) -> bool,
    ) -> bool {
        let mut ops = self.ops.lock();
        if Self::is_member(&ops, element, committed_member) {
            return false;
        }
        ops.insert(element, Intent::Insert(uuid));
        true
    }

    /// Records a remove intent and returns `true` iff `element` is a member
    /// of the combined pending + committed view.
    pub(crate) fn accept_remove(
        &self,
        element: i64,
        committed_member: impl FnOnce(i64) -> bool,
    ) -> bool {
        let mut ops = self.ops.lock();
        if !Self::is_member(&ops, element, committed_member) {
            return false;
        }
        ops.insert(element, Intent::Remove);
        true
    }

    /// Takes the whole log, leaving it empty. Intents accepted after the
    /// swap belong to the next commit.
    pub(crate) fn capture(&self) -> HashMap<i64, Intent> {
        mem::take(&mut *self.ops.lock())
    }

    fn is_member(
        ops: &HashMap<i64, Intent>,
        element: i64,
        committed_member: impl FnOnce(i64) -> bool,
    ) -> bool {
        match ops.get(&element) {
            Some(Intent::Insert(_)) => true,
            Some(Intent::Remove) => false,
            None => committed_member(element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Intent, PendingLog};

    #[test]
    fn latest_intent_wins() {
        let log = PendingLog::new();

        // Not committed: insert, then remove, then insert again.
        assert!(log.accept_insert(7, None, |_| false));
        assert!(!log.accept_insert(7, None, |_| false));
        assert!(log.accept_remove(7, |_| false));
        assert!(!log.accept_remove(7, |_| false));
        assert!(log.accept_insert(7, None, |_| false));

        let captured = log.capture();
        assert_eq!(captured.len(), 1);
        assert!(matches!(captured.get(&7), Some(Intent::Insert(None))));
    }

    #[test]
    fn committed_membership_is_consulted_only_without_an_intent() {
        let log = PendingLog::new();

        // Committed member: the insert is a duplicate, the remove wins.
        assert!(!log.accept_insert(3, None, |_| true));
        assert!(log.accept_remove(3, |_| true));
        // The pending removal now shadows the committed slot.
        assert!(!log.accept_remove(3, |_| unreachable!()));
        assert!(log.accept_insert(3, None, |_| unreachable!()));

        let captured = log.capture();
        assert!(matches!(captured.get(&3), Some(Intent::Insert(None))));
        assert!(log.capture().is_empty());
    }
}
