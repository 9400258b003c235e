//! Display ring buffer
//!
//! Fixed-capacity circular store of delivered samples, giving a renderer
//! stable O(1) access: ordered display slice, last-N window, and direct
//! accessors for the two most recent points used as interpolation keyframes.
//! Insert overwrites the oldest slot once full; clearing resets head/len
//! without reallocating.

use ampenv_common::types::DataPoint;

/// Fixed-capacity circular store of delivered samples
#[derive(Debug)]
pub struct DisplayRing {
    slots: Vec<DataPoint>,
    /// Index of the oldest entry once the ring is full; 0 while filling
    head: usize,
    capacity: usize,
}

impl DisplayRing {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "ring needs room for two keyframes");
        Self {
            slots: Vec::with_capacity(capacity),
            head: 0,
            capacity,
        }
    }

    /// Insert a point, overwriting the oldest slot when full. O(1).
    pub fn push(&mut self, point: DataPoint) {
        if self.slots.len() < self.capacity {
            self.slots.push(point);
        } else {
            self.slots[self.head] = point;
            self.head = (self.head + 1) % self.capacity;
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entry at logical index `i`, where 0 is the oldest entry
    fn at(&self, i: usize) -> &DataPoint {
        debug_assert!(i < self.slots.len());
        &self.slots[(self.head + i) % self.slots.len()]
    }

    /// All entries, oldest to newest
    pub fn ordered(&self) -> Vec<DataPoint> {
        (0..self.slots.len()).map(|i| *self.at(i)).collect()
    }

    /// The most recent `n` entries, oldest to newest
    pub fn last_n(&self, n: usize) -> Vec<DataPoint> {
        let len = self.slots.len();
        let n = n.min(len);
        (len - n..len).map(|i| *self.at(i)).collect()
    }

    /// Most recent entry (the interpolation target keyframe)
    pub fn latest(&self) -> Option<&DataPoint> {
        let len = self.slots.len();
        (len > 0).then(|| self.at(len - 1))
    }

    /// Second most recent entry (the interpolation source keyframe)
    pub fn previous(&self) -> Option<&DataPoint> {
        let len = self.slots.len();
        (len > 1).then(|| self.at(len - 2))
    }

    /// Reset head and length without releasing the allocation
    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = 0;
    }
}
