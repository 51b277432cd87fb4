//! The operation log: a dense, append-only sequence of list operations, indexed by LV.
//!
//! Kept as a plain `Vec` parallel to the causal graph rather than folded into it -- the causal
//! graph only needs to know about identity and ancestry, and keeping operation content (which
//! is generic over `T` and can be arbitrarily large) out of it keeps ancestry queries cheap.

use crate::lv::LV;

/// A single list operation: an insertion of one element, or a deletion. `pos` is a zero-based
/// index into the *visible* items at the moment this operation was created on its origin
/// replica.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ListOp<T> {
    Insert { pos: usize, content: T },
    Delete { pos: usize },
}

impl<T> ListOp<T> {
    pub fn pos(&self) -> usize {
        match self {
            ListOp::Insert { pos, .. } => *pos,
            ListOp::Delete { pos } => *pos,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, ListOp::Insert { .. })
    }
}

/// An append-only log of list operations, indexed by LV: `log.get(v)` is the operation
/// identified by local version `v`.
#[derive(Debug, Clone, Default)]
pub struct OperationLog<T> {
    ops: Vec<ListOp<T>>,
}

impl<T> OperationLog<T> {
    pub fn new() -> Self {
        OperationLog { ops: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn get(&self, lv: LV) -> Option<&ListOp<T>> {
        self.ops.get(lv)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ListOp<T>> {
        self.ops.iter()
    }

    pub(crate) fn push(&mut self, op: ListOp<T>) {
        self.ops.push(op);
    }

    /// Remove every entry from `len` onward. Used by the walker to roll back a log append when
    /// the matching causal graph registration fails.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.ops.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_get_roundtrip() {
        let mut log = OperationLog::new();
        log.push(ListOp::Insert { pos: 0, content: "a" });
        log.push(ListOp::Delete { pos: 0 });
        assert_eq!(log.len(), 2);
        assert_eq!(log.get(0), Some(&ListOp::Insert { pos: 0, content: "a" }));
        assert_eq!(log.get(1), Some(&ListOp::Delete { pos: 0 }));
        assert_eq!(log.get(2), None);
    }

    #[test]
    fn truncate_rolls_back_a_failed_append() {
        let mut log: OperationLog<char> = OperationLog::new();
        log.push(ListOp::Insert { pos: 0, content: 'x' });
        let checkpoint = log.len();
        log.push(ListOp::Insert { pos: 1, content: 'y' });
        log.truncate(checkpoint);
        assert_eq!(log.len(), 1);
    }
}
