/// Returns the home slot for `key` in a table of `capacity` slots.
///
/// Negative keys wrap into range. `capacity` must be non-zero.
#[inline]
pub(crate) fn home(key: i64, capacity: usize) -> usize {
    key.rem_euclid(capacity as i64) as usize
}

/// Linear probing with a stride of one, wrapping at the end of the slot array.
#[inline]
pub(crate) fn next_probe(pos: usize, capacity: usize) -> usize {
    (pos + 1) % capacity
}

/// The slot indices visited when searching for a key, starting at its home slot.
///
/// The sequence is bounded: it yields every slot exactly once and then stops, so a table
/// without any `Empty` slot left still terminates a search. A zero capacity yields nothing.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    pos: usize,
    remaining: usize,
    capacity: usize,
}

impl ProbeSequence {
    pub fn new(key: i64, capacity: usize) -> ProbeSequence {
        let pos: usize = if capacity == 0 { 0 } else { home(key, capacity) };
        ProbeSequence {
            pos,
            remaining: capacity,
            capacity,
        }
    }
}

impl Iterator for ProbeSequence {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let current: usize = self.pos;
        self.pos = next_probe(self.pos, self.capacity);
        self.remaining -= 1;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ProbeSequence {}
