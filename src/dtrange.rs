//! A half-open range of local versions, with the handful of operations the causal graph and
//! walker need to slice and recombine runs of them.

use std::ops::Range;
use rle::{HasLength, MergableSpan};
use crate::lv::LV;

/// A half-open range `[start, end)` of local versions.
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug, Hash, PartialOrd, Ord)]
pub struct DTRange {
    pub start: LV,
    pub end: LV,
}

impl DTRange {
    #[inline]
    pub fn new(start: LV, end: LV) -> Self {
        debug_assert!(start <= end);
        DTRange { start, end }
    }

    #[inline]
    pub fn new_from_len(start: LV, len: usize) -> Self {
        DTRange { start, end: start + len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn last(&self) -> LV {
        self.end - 1
    }

    #[inline]
    pub fn contains(&self, lv: LV) -> bool {
        self.start <= lv && lv < self.end
    }

    /// Split this range at `at` (relative to start), returning the tail and keeping the head in
    /// `self`.
    pub fn truncate(&mut self, at: usize) -> Self {
        debug_assert!(at > 0 && at < self.len());
        let other = DTRange::new(self.start + at, self.end);
        self.end = self.start + at;
        other
    }

    pub fn iter(&self) -> Range<LV> {
        self.start..self.end
    }
}

impl From<Range<LV>> for DTRange {
    fn from(r: Range<LV>) -> Self {
        DTRange::new(r.start, r.end)
    }
}

impl From<DTRange> for Range<LV> {
    fn from(r: DTRange) -> Self {
        r.start..r.end
    }
}

impl HasLength for DTRange {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

impl MergableSpan for DTRange {
    fn can_append(&self, other: &Self) -> bool {
        self.end == other.start
    }

    fn append(&mut self, other: Self) {
        debug_assert!(self.can_append(&other));
        self.end = other.end;
    }

    fn prepend(&mut self, other: Self) {
        debug_assert!(other.can_append(self));
        self.start = other.start;
    }
}

/// Merge a sorted list of ranges in place, combining any pair where `a.end == b.start`.
pub fn merge_adjacent_ranges(ranges: &mut Vec<DTRange>) {
    ranges.sort_unstable_by_key(|r| r.start);
    let mut out: Vec<DTRange> = Vec::with_capacity(ranges.len());
    for r in ranges.drain(..) {
        if let Some(last) = out.last_mut() {
            if last.can_append(&r) {
                last.append(r);
                continue;
            }
        }
        out.push(r);
    }
    *ranges = out;
}
