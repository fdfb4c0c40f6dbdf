use std::collections::VecDeque;
use super::config::BUFFER_CAPACITY;

/// Fixed-capacity FIFO of display points.
///
/// The ring starts full of zeros and stays exactly `capacity` long: every push
/// evicts as many old points as it appends.
pub struct SampleRing {
    data: VecDeque<u16>,
    capacity: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: std::iter::repeat(0).take(capacity).collect(),
            capacity,
        }
    }

    pub fn push(&mut self, items: &[u16]) {
        if items.is_empty() {
            return;
        }
        if items.len() >= self.capacity {
            self.data.clear();
            self.data
                .extend(items[items.len() - self.capacity..].iter().copied());
            return;
        }
        let overflow = (self.data.len() + items.len()).saturating_sub(self.capacity);
        self.data.drain(..overflow);
        self.data.extend(items.iter().copied());
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &u16> + '_ {
        self.data.iter()
    }

    /// Contiguous copy, oldest first.
    pub fn snapshot(&self) -> Vec<u16> {
        self.data.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<u16> {
        self.data.back().copied()
    }
}

impl Default for SampleRing {
    fn default() -> Self {
        SampleRing::new(BUFFER_CAPACITY)
    }
}
