use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::buffers::Buffers;
use crate::pending::{Intent, PendingLog};

/// A concurrent set of 64-bit identifiers with optional 128-bit values,
/// committed into flat export buffers.
///
/// Mutations are two-phase: [`insert`](Self::insert) and
/// [`remove`](Self::remove) only record intents in a pending log and may be
/// called freely from any number of threads, while [`commit`](Self::commit)
/// drains the log and applies it to the committed buffers, growing them
/// first when the maximum load factor would be crossed. The committed state
/// is what [`len`](Self::len) reports and what
/// [`borrow_buffers`](Self::borrow_buffers) exposes; it never shows a torn
/// or partially applied batch.
///
/// Cloning is cheap and clones share the same table: clone into each
/// request-handling thread, keep one clone on the thread that drives
/// commits.
///
/// Identifiers must be positive. `0` and `-1` are the slot sentinels for
/// "never occupied" and "removed" in the export layout, so neither can be
/// stored; passing them (or any negative value) is a caller bug and panics.
pub struct DirectoryHashSet {
    inner: Arc<Inner>,
}

impl Clone for DirectoryHashSet {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner {
    min_load_factor: f64,
    max_load_factor: f64,
    /// The current committed generation. Write-locked only by `commit`,
    /// read-locked by buffer borrows and by membership probes.
    committed: RwLock<Buffers>,
    /// Committed live-element count.
    len: CachePadded<AtomicUsize>,
    pending: PendingLog,
}

impl DirectoryHashSet {
    /// Creates a set with `capacity` slots and the given load-factor bounds.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the bounds do not satisfy
    /// `0 < min_load_factor < max_load_factor <= 1`.
    pub fn new(capacity: usize, min_load_factor: f64, max_load_factor: f64) -> Self {
        assert!(capacity > 0, "capacity must be positive");
        assert!(
            0.0 < min_load_factor && min_load_factor < max_load_factor && max_load_factor <= 1.0,
            "load factors must satisfy 0 < min < max <= 1"
        );
        Self {
            inner: Arc::new(Inner {
                min_load_factor,
                max_load_factor,
                committed: RwLock::new(Buffers::with_capacity(capacity)),
                len: CachePadded::new(AtomicUsize::new(0)),
                pending: PendingLog::new(),
            }),
        }
    }

    /// Records an intent to insert `element` with an optional paired value.
    ///
    /// Returns `true` iff `element` is not currently a member, considering
    /// both the committed buffers and any pending intent; exactly one of N
    /// racing inserts of the same identifier returns `true`. The committed
    /// buffers are not touched; the insert becomes visible at the next
    /// [`commit`](Self::commit).
    pub fn insert(&self, element: i64, uuid: Option<Uuid>) -> bool {
        assert!(element > 0, "identifiers must be positive, 0 and -1 are slot sentinels");
        self.inner
            .pending
            .accept_insert(element, uuid, |element| {
                self.inner.committed.read().contains(element)
            })
    }

    /// Records an intent to remove `element`.
    ///
    /// Returns `true` iff `element` is currently a member by the same
    /// combined committed + pending view as [`insert`](Self::insert); a
    /// `false` return leaves no footprint in the log.
    pub fn remove(&self, element: i64) -> bool {
        assert!(element > 0, "identifiers must be positive, 0 and -1 are slot sentinels");
        self.inner.pending.accept_remove(element, |element| {
            self.inner.committed.read().contains(element)
        })
    }

    /// The committed live-element count. O(1); pending intents are not
    /// reflected until a commit applies them.
    pub fn len(&self) -> usize {
        self.inner.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the pending log and applies it to the committed buffers.
    ///
    /// Returns `false` if no operations were pending. Otherwise the captured
    /// batch is applied in full: if the projected element count reaches the
    /// maximum-load-factor threshold the table first grows to
    /// `projected / min_load_factor` slots (re-placing every live entry and
    /// dropping tombstones), then each intent is applied and the new count
    /// is published. Capacity never shrinks.
    ///
    /// Intents accepted while a commit is running are captured by the *next*
    /// commit. Callers must serialize their own `commit` calls; concurrent
    /// inserts and removes need no coordination.
    pub fn commit(&self) -> bool {
        let captured = self.inner.pending.capture();
        if captured.is_empty() {
            return false;
        }

        let inserts = captured
            .values()
            .filter(|intent| matches!(intent, Intent::Insert(_)))
            .count();
        let removes = captured.len() - inserts;

        let mut committed = self.inner.committed.write();
        let mut len = self.inner.len.load(Ordering::Acquire);
        let projected = (len + inserts).saturating_sub(removes);

        let threshold = (committed.capacity() as f64 * self.inner.max_load_factor) as usize;
        if projected >= threshold {
            let capacity = (projected as f64 / self.inner.min_load_factor) as usize;
            #[cfg(feature = "logging")]
            log::debug!(
                "growing directory from {} to {} slots for {} projected elements",
                committed.capacity(),
                capacity,
                projected
            );
            *committed = committed.rehash(capacity);
        }

        // Applies are upserts keyed on the actual slot transition, so a
        // duplicate intent accepted during a previous commit's apply window
        // cannot skew the count.
        for (element, intent) in captured {
            match intent {
                Intent::Insert(uuid) => {
                    if committed.insert(element, uuid) {
                        len += 1;
                    }
                }
                Intent::Remove => {
                    if committed.remove(element) {
                        len -= 1;
                    }
                }
            }
        }
        self.inner.len.store(len, Ordering::Release);

        #[cfg(feature = "logging")]
        log::debug!(
            "committed {} inserts and {} removes, directory size {}",
            inserts,
            removes,
            len
        );
        true
    }

    /// Hands the committed buffers to `accessor` as
    /// `(identifier slots, value words, capacity)`.
    ///
    /// The identifier buffer is `capacity` 64-bit slots; the value buffer is
    /// `2 * capacity` 64-bit words, slot `i` owning words `2i` (high) and
    /// `2i + 1` (low). A concurrent commit cannot mutate or replace the
    /// buffers while the accessor runs; the exclusion ends when
    /// `borrow_buffers` returns, on the error path too. The accessor's error
    /// type is the consumer's own (an enclave failure, typically) and passes
    /// through untouched.
    pub fn borrow_buffers<F, T, E>(&self, accessor: F) -> Result<T, E>
    where
        F: FnOnce(&[i64], &[u64], usize) -> Result<T, E>,
    {
        let committed = self.inner.committed.read();
        accessor(committed.phones(), committed.uuids(), committed.capacity())
    }
}
