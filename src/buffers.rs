use uuid::Uuid;

/// Slot value for a position that has never held an identifier. Terminates
/// probe sequences.
pub(crate) const EMPTY: i64 = 0;

/// Slot value for a position whose identifier was removed. Does not terminate
/// probe sequences; identifiers inserted past a since-removed collider must
/// stay reachable.
pub(crate) const TOMBSTONE: i64 = -1;

/// One committed generation of the export buffers.
///
/// `phones` is the identifier slot array (`capacity` 64-bit slots) and
/// `uuids` holds the paired 128-bit values as two 64-bit words per slot,
/// high word first, so slot `i` owns words `2i` and `2i + 1`. Both arrays
/// are the exact byte layout handed to the secure computation engine; any
/// indirection here would break that contract, so the table is plain open
/// addressing with linear probing and tombstones.
///
/// `Buffers` is not synchronized. The owning set mutates it only while
/// holding the committed-generation write lock.
pub(crate) struct Buffers {
    phones: Box<[i64]>,
    uuids: Box<[u64]>,
}

impl Buffers {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            phones: vec![EMPTY; capacity].into_boxed_slice(),
            uuids: vec![0; capacity * 2].into_boxed_slice(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.phones.len()
    }

    pub(crate) fn phones(&self) -> &[i64] {
        &self.phones
    }

    pub(crate) fn uuids(&self) -> &[u64] {
        &self.uuids
    }

    /// The identifier domain is approximately uniform (absolute values of
    /// signed 64-bit numbers), so a direct modulo spreads slots well enough.
    fn home_slot(&self, element: i64) -> usize {
        (element as u64 % self.capacity() as u64) as usize
    }

    /// Finds the slot holding `element`, skipping tombstones. The sweep is
    /// bounded by one pass over the table for the degenerate case where no
    /// empty slot is left to terminate the probe.
    fn slot_of(&self, element: i64) -> Option<usize> {
        let capacity = self.capacity();
        let mut index = self.home_slot(element);
        for _ in 0..capacity {
            match self.phones[index] {
                EMPTY => return None,
                slot if slot == element => return Some(index),
                _ => index = (index + 1) % capacity,
            }
        }
        None
    }

    pub(crate) fn contains(&self, element: i64) -> bool {
        self.slot_of(element).is_some()
    }

    /// Places `element`, reusing the first tombstone on its probe path.
    /// Returns `false` without touching the slot array if the element is
    /// already present; a provided `uuid` still overwrites the value words in
    /// that case, so a re-committed intent cannot leave a stale value.
    pub(crate) fn insert(&mut self, element: i64, uuid: Option<Uuid>) -> bool {
        let capacity = self.capacity();
        let mut index = self.home_slot(element);
        let mut reusable: Option<usize> = None;
        for _ in 0..capacity {
            match self.phones[index] {
                EMPTY => {
                    let target = reusable.unwrap_or(index);
                    self.place(target, element, uuid);
                    return true;
                }
                TOMBSTONE => {
                    reusable.get_or_insert(index);
                }
                slot if slot == element => {
                    if uuid.is_some() {
                        self.write_uuid(index, uuid);
                    }
                    return false;
                }
                _ => {}
            }
            index = (index + 1) % capacity;
        }
        // A full sweep found no empty slot, only live slots and tombstones.
        // The load-factor invariant guarantees at least one tombstone here.
        let target = reusable.expect("directory capacity exhausted");
        self.place(target, element, uuid);
        true
    }

    /// Tombstones the element's slot and zeroes its value words. Returns
    /// `false` if the element is not present.
    pub(crate) fn remove(&mut self, element: i64) -> bool {
        match self.slot_of(element) {
            Some(index) => {
                self.phones[index] = TOMBSTONE;
                self.uuids[index * 2] = 0;
                self.uuids[index * 2 + 1] = 0;
                true
            }
            None => false,
        }
    }

    /// Builds a fresh generation of `capacity` slots holding every live
    /// entry of this one. Tombstones are not carried over.
    pub(crate) fn rehash(&self, capacity: usize) -> Buffers {
        let mut next = Buffers::with_capacity(capacity);
        for (index, &slot) in self.phones.iter().enumerate() {
            if slot != EMPTY && slot != TOMBSTONE {
                next.place_words(slot, self.uuids[index * 2], self.uuids[index * 2 + 1]);
            }
        }
        next
    }

    fn place(&mut self, index: usize, element: i64, uuid: Option<Uuid>) {
        self.phones[index] = element;
        // An absent value leaves the words as they are; a reused tombstone
        // slot was zeroed on removal, so they read as zero either way.
        if uuid.is_some() {
            self.write_uuid(index, uuid);
        }
    }

    fn write_uuid(&mut self, index: usize, uuid: Option<Uuid>) {
        if let Some(uuid) = uuid {
            let (high, low) = uuid.as_u64_pair();
            self.uuids[index * 2] = high;
            self.uuids[index * 2 + 1] = low;
        }
    }

    /// Raw-word variant of `place` for rehashing, where the value words are
    /// copied verbatim and the target table has no tombstones.
    fn place_words(&mut self, element: i64, high: u64, low: u64) {
        let capacity = self.capacity();
        let mut index = (element as u64 % capacity as u64) as usize;
        while self.phones[index] != EMPTY {
            index = (index + 1) % capacity;
        }
        self.phones[index] = element;
        self.uuids[index * 2] = high;
        self.uuids[index * 2 + 1] = low;
    }
}
