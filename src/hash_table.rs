use std::fmt;
use std::mem;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::probe::ProbeSequence;

/// The record stored against each key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Employee {
    pub last_name: String,
    pub first_name: String,
    pub hire_date: String,
}

impl Employee {
    pub fn new(
        last_name: impl Into<String>,
        first_name: impl Into<String>,
        hire_date: impl Into<String>,
    ) -> Employee {
        Employee {
            last_name: last_name.into(),
            first_name: first_name.into(),
            hire_date: hire_date.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    /// Only `capacity - 1` slots may be in use; one is always left free to end probe chains.
    #[error("table is full: {entries} of {capacity} slots in use")]
    CapacityExceeded { entries: usize, capacity: usize },
    #[error("key {0} not found")]
    NotFound(i64),
    #[error("key {0} is negative")]
    InvalidKey(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Empty,
    Deleted { key: i64 },
    InUse { key: i64, value: Employee },
}

impl Slot {
    fn state(&self) -> SlotState {
        match self {
            Slot::Empty => SlotState::Empty,
            Slot::Deleted { .. } => SlotState::Deleted,
            Slot::InUse { .. } => SlotState::InUse,
        }
    }

    fn key(&self) -> Option<i64> {
        match self {
            Slot::Empty => None,
            Slot::Deleted { key } | Slot::InUse { key, .. } => Some(*key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Empty,
    Deleted,
    InUse,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SlotState::Empty => "EMPTY",
            SlotState::Deleted => "DELETED",
            SlotState::InUse => "IN_USE",
        })
    }
}

/// Diagnostic snapshot of one slot, as returned by [`HashTable::dump`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView {
    pub index: usize,
    pub state: SlotState,
    /// Set for `InUse` and `Deleted` slots.
    pub key: Option<i64>,
}

/// A fixed-capacity table keyed by non-negative integers, using open addressing with linear
/// probing and tombstone deletion.
///
/// The slot array never grows or shrinks. At most `size() - 1` entries are stored at a time.
#[derive(Debug, Clone)]
pub struct HashTable {
    entries: usize,
    slots: Box<[Slot]>,
}

impl Default for HashTable {
    fn default() -> Self {
        HashTable::with_capacity(HashTable::DEFAULT_CAPACITY)
    }
}

impl HashTable {
    /// Prime, to spread the keys of `key mod N` hashing.
    pub const DEFAULT_CAPACITY: usize = 11;
    /// One usable slot plus the free slot that terminates probe chains.
    pub const MIN_CAPACITY: usize = 2;

    /// Capacities below [`HashTable::MIN_CAPACITY`] are raised to it.
    pub fn with_capacity(capacity: usize) -> HashTable {
        let capacity: usize = capacity.max(Self::MIN_CAPACITY);
        HashTable {
            entries: 0,
            slots: vec![Slot::Empty; capacity].into_boxed_slice(),
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn count(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    pub fn is_full(&self) -> bool {
        self.entries == self.size() - 1
    }

    pub fn load_factor(&self) -> f64 {
        self.entries as f64 / self.size() as f64
    }

    pub fn tombstones(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Deleted { .. }))
            .count()
    }

    /// Inserts `value` under `key`, returning the value it replaced if the key was already present.
    ///
    /// A full table rejects every insert, including one that would only update an existing key.
    pub fn insert(&mut self, key: i64, value: Employee) -> Result<Option<Employee>, TableError> {
        check_key(key)?;
        if self.is_full() {
            warn!(key, entries = self.entries, capacity = self.size(), "insert rejected, table full");
            return Err(self.capacity_exceeded());
        }

        if let Some(current) = self.value_mut(key) {
            debug!(key, "updated entry in place");
            return Ok(Some(mem::replace(current, value)));
        }

        // The key is absent, so the first reusable slot on its chain is safe to take.
        let i: usize = self.find_vacant(key).ok_or_else(|| self.capacity_exceeded())?;
        if let Slot::Deleted { key: previous } = self.slots[i] {
            debug!(key, slot = i, previous, "reusing tombstone");
        } else {
            debug!(key, slot = i, "inserted into empty slot");
        }
        self.slots[i] = Slot::InUse { key, value };
        self.entries += 1;
        Ok(None)
    }

    pub fn lookup(&self, key: i64) -> Result<&Employee, TableError> {
        check_key(key)?;
        match self.find(key).map(|i| &self.slots[i]) {
            Some(Slot::InUse { value, .. }) => Ok(value),
            _ => Err(TableError::NotFound(key)),
        }
    }

    pub fn contains_key(&self, key: i64) -> bool {
        self.lookup(key).is_ok()
    }

    /// Removes `key`, leaving a tombstone in its slot so later keys on the same chain stay
    /// reachable. Nothing else is moved.
    pub fn delete(&mut self, key: i64) -> Result<Employee, TableError> {
        check_key(key)?;
        let i: usize = self.find(key).ok_or(TableError::NotFound(key))?;
        let Slot::InUse { value, .. } = mem::replace(&mut self.slots[i], Slot::Deleted { key }) else {
            unreachable!("find only returns in-use slots");
        };
        self.entries -= 1;
        debug!(key, slot = i, "deleted entry");
        Ok(value)
    }

    /// Live entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &Employee)> + '_ {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::InUse { key, value } => Some((*key, value)),
            _ => None,
        })
    }

    pub fn dump(&self) -> Vec<SlotView> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| SlotView {
                index,
                state: slot.state(),
                key: slot.key(),
            })
            .collect()
    }

    /// Walks the probe chain of `key`, stepping over tombstones, until the key or an `Empty`
    /// slot is met.
    fn find(&self, key: i64) -> Option<usize> {
        for i in ProbeSequence::new(key, self.size()) {
            match &self.slots[i] {
                Slot::Empty => {
                    trace!(key, slot = i, "probe ended at empty slot");
                    return None;
                }
                Slot::InUse { key: k, .. } if *k == key => {
                    trace!(key, slot = i, "probe hit");
                    return Some(i);
                }
                _ => trace!(key, slot = i, "probe continues"),
            }
        }
        None
    }

    fn find_vacant(&self, key: i64) -> Option<usize> {
        ProbeSequence::new(key, self.size()).find(|&i| !matches!(self.slots[i], Slot::InUse { .. }))
    }

    fn value_mut(&mut self, key: i64) -> Option<&mut Employee> {
        let i: usize = self.find(key)?;
        match &mut self.slots[i] {
            Slot::InUse { value, .. } => Some(value),
            _ => None,
        }
    }

    fn capacity_exceeded(&self) -> TableError {
        TableError::CapacityExceeded {
            entries: self.entries,
            capacity: self.size(),
        }
    }
}

impl fmt::Display for HashTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "count {}, cap {}, load {:.3}",
            self.count(),
            self.size(),
            self.load_factor()
        )?;
        for view in self.dump() {
            match view.key {
                Some(key) => writeln!(f, "[{}] {} {}", view.index, view.state, key)?,
                None => writeln!(f, "[{}] {}", view.index, view.state)?,
            }
        }
        Ok(())
    }
}

fn check_key(key: i64) -> Result<(), TableError> {
    if key < 0 {
        Err(TableError::InvalidKey(key))
    } else {
        Ok(())
    }
}
