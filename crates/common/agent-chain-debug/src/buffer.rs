use std::collections::VecDeque;
use std::num::NonZeroUsize;

use crate::trace::TraceEntry;

/// Ordered sequence of trace entries, stored as the groups they arrived in.
///
/// Unbounded by default. With a capacity (counted in entries) the oldest
/// groups are evicted whole until the new group fits, so a payload never
/// outlives its header. A single group larger than the capacity is kept
/// whole. Evictions are counted in entries.
#[derive(Debug, Clone, Default)]
pub struct TraceBuffer {
    groups: VecDeque<Vec<TraceEntry>>,
    len: usize,
    capacity: Option<NonZeroUsize>,
    dropped: usize,
}

impl TraceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: Option<NonZeroUsize>) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    /// Append one event's group, returning how many entries were evicted to
    /// make room.
    pub fn push_group(&mut self, group: Vec<TraceEntry>) -> usize {
        let mut evicted = 0;
        if let Some(capacity) = self.capacity {
            while self.len + group.len() > capacity.get() {
                let Some(oldest) = self.groups.pop_front() else {
                    break;
                };
                self.len -= oldest.len();
                evicted += oldest.len();
            }
        }
        self.len += group.len();
        self.groups.push_back(group);
        self.dropped += evicted;
        evicted
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.len = 0;
        self.dropped = 0;
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of groups held.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Total number of entries evicted since creation or the last clear.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraceEntry> {
        self.groups.iter().flatten()
    }

    pub fn to_vec(&self) -> Vec<TraceEntry> {
        self.iter().cloned().collect()
    }
}
