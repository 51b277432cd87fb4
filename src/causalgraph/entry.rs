//! The two run types the causal graph is built from: [`CGEntry`] (a contiguous run of LVs
//! created by one agent with one parent set) and [`ClientEntry`] (the per-agent index from
//! sequence number back to LV).

use rle::{HasLength, MergableSpan, Searchable};
use crate::agent::{AgentId, Sequence};
use crate::dtrange::DTRange;
use crate::frontier::Frontier;
use crate::lv::LV;

/// A contiguous run of LVs created by one agent with consecutive sequence numbers and an
/// identical parent set at its first LV.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CGEntry {
    pub span: DTRange,
    pub agent: AgentId,
    pub seq_start: Sequence,
    /// Parents of `span.start`. For offsets > 0 within the run, the implicit parent is the
    /// preceding LV -- see [`CGEntry::parent_at_offset`].
    pub parents: Frontier,
}

impl CGEntry {
    pub fn last_time(&self) -> LV {
        self.span.last()
    }

    pub fn contains(&self, lv: LV) -> bool {
        self.span.contains(lv)
    }

    /// The sequence number of the operation at `lv`, which must be inside this entry.
    pub fn seq_at(&self, lv: LV) -> Sequence {
        self.seq_start + (lv - self.span.start)
    }

    /// The parents of the operation at `lv` (which must be inside this entry): `self.parents`
    /// at offset 0, otherwise the single preceding LV.
    pub fn parent_at_offset(&self, lv: LV) -> Frontier {
        if lv == self.span.start {
            self.parents.clone()
        } else {
            Frontier::from_slice(&[lv - 1])
        }
    }
}

impl HasLength for CGEntry {
    fn len(&self) -> usize {
        self.span.len()
    }
}

impl MergableSpan for CGEntry {
    fn can_append(&self, other: &Self) -> bool {
        self.span.end == other.span.start
            && self.agent == other.agent
            && self.seq_start + self.span.len() == other.seq_start
            && other.parents.as_slice() == [self.span.last()]
    }

    fn append(&mut self, other: Self) {
        debug_assert!(self.can_append(&other));
        self.span.end = other.span.end;
    }

    fn prepend(&mut self, other: Self) {
        debug_assert!(other.can_append(self));
        self.span.start = other.span.start;
        self.seq_start = other.seq_start;
        self.parents = other.parents;
    }
}

impl Searchable for CGEntry {
    type Item = LV;

    fn get_offset(&self, item: LV) -> Option<usize> {
        self.span.contains(item).then(|| item - self.span.start)
    }

    fn at_offset(&self, offset: usize) -> LV {
        self.span.start + offset
    }
}

/// Per-agent index: a contiguous run of sequence numbers mapping onto a contiguous run of LVs.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct ClientEntry {
    pub seq_range: DTRange,
    pub lv_start: LV,
}

impl ClientEntry {
    pub fn seq_end(&self) -> Sequence {
        self.seq_range.end
    }

    pub fn lv_at_seq(&self, seq: Sequence) -> LV {
        self.lv_start + (seq - self.seq_range.start)
    }
}

impl HasLength for ClientEntry {
    fn len(&self) -> usize {
        self.seq_range.len()
    }
}

impl MergableSpan for ClientEntry {
    fn can_append(&self, other: &Self) -> bool {
        self.seq_range.end == other.seq_range.start
            && self.lv_start + self.seq_range.len() == other.lv_start
    }

    fn append(&mut self, other: Self) {
        debug_assert!(self.can_append(&other));
        self.seq_range.end = other.seq_range.end;
    }

    fn prepend(&mut self, other: Self) {
        debug_assert!(other.can_append(self));
        self.seq_range.start = other.seq_range.start;
        self.lv_start = other.lv_start;
    }
}

impl Searchable for ClientEntry {
    type Item = Sequence;

    fn get_offset(&self, item: Sequence) -> Option<usize> {
        self.seq_range.contains(item).then(|| item - self.seq_range.start)
    }

    fn at_offset(&self, offset: usize) -> Sequence {
        self.seq_range.start + offset
    }
}
