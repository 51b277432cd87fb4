//! The edit context: the in-memory document reconstruction for a single version frontier, and
//! the item model it's built from.
//!
//! Each originally-inserted element gets one record (`op_id` / `cur_state` / `end_state` /
//! `origin_left` / `right_parent`), held in a single flat `Vec` in document order rather than a
//! run-length content-tree -- see `DESIGN.md` for the tradeoff this makes against raw throughput.

use std::collections::HashMap;

use crate::error::WalkerError;
use crate::frontier::Frontier;
use crate::lv::{LV, ROOT};
use crate::oplog::{ListOp, OperationLog};

/// The tri-state an item can be in, either as its current state or as the state the walker is
/// driving it towards. `Deleted` carries a count because concurrent deletes of the same item,
/// once merged, must both be undone (in either order) before the item becomes visible again.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum ItemState {
    NotYetInserted,
    Inserted,
    Deleted(u32),
}

impl ItemState {
    fn delete(&mut self) {
        *self = match *self {
            ItemState::NotYetInserted => panic!("cannot delete an item that isn't inserted"),
            ItemState::Inserted => ItemState::Deleted(1),
            ItemState::Deleted(k) => ItemState::Deleted(k + 1),
        };
    }

    fn undelete(&mut self) {
        *self = match *self {
            ItemState::Deleted(1) => ItemState::Inserted,
            ItemState::Deleted(k) if k > 1 => ItemState::Deleted(k - 1),
            _ => panic!("cannot undelete an item that isn't deleted"),
        };
    }

    fn is_visible(self) -> bool {
        matches!(self, ItemState::Inserted)
    }
}

/// The record for one originally-inserted element.
#[derive(Clone, Debug)]
pub(crate) struct Item {
    pub op_id: LV,
    pub cur_state: ItemState,
    pub end_state: ItemState,
    /// The LV of the item immediately to this item's left at integration time, or `ROOT`.
    pub origin_left: LV,
    /// The LV used to break ties between concurrent inserts sharing `origin_left`, or `ROOT`
    /// (which sorts last -- `ROOT` is `usize::MAX`, already "infinity" under the tie-break's
    /// ascending-order comparison).
    pub right_parent: LV,
}

/// The neighbor LVs a new insert needs in order to find its place: see
/// [`crate::walker::Walker`] for how these are resolved once, at integration time, against a
/// checkout of the op's own parents.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) struct InsertOrigin {
    pub origin_left: LV,
    pub right_parent: LV,
}

/// The in-memory document reconstruction for a single frontier: an ordered sequence of items,
/// indexed by insert LV and by delete target, plus the frontier it currently represents.
#[derive(Debug, Default)]
pub struct EditContext {
    pub(crate) items: Vec<Item>,
    pub(crate) items_by_lv: HashMap<LV, usize>,
    pub(crate) del_targets: HashMap<LV, LV>,
    pub(crate) cur_version: Frontier,
}

impl EditContext {
    pub fn new() -> Self {
        EditContext::default()
    }

    pub fn version(&self) -> &[LV] {
        &self.cur_version
    }

    /// The op_ids of currently-visible items, in document order.
    pub(crate) fn active_item_ids(&self) -> impl Iterator<Item = LV> + '_ {
        self.items.iter().filter(|it| it.cur_state.is_visible()).map(|it| it.op_id)
    }

    pub fn active_item_count(&self) -> usize {
        self.items.iter().filter(|it| it.cur_state.is_visible()).count()
    }

    /// Materialize the currently-visible document as a vector of cloned content, looked up from
    /// `log`.
    pub fn snapshot<T: Clone>(&self, log: &OperationLog<T>) -> Result<Vec<T>, WalkerError> {
        self.active_item_ids()
            .map(|op_id| match log.get(op_id) {
                Some(ListOp::Insert { content, .. }) => Ok(content.clone()),
                _ => Err(WalkerError::InconsistentState),
            })
            .collect()
    }

    fn find_visible_at(&self, pos: usize) -> Option<usize> {
        let mut seen = 0;
        for (idx, item) in self.items.iter().enumerate() {
            if item.cur_state.is_visible() {
                if seen == pos {
                    return Some(idx);
                }
                seen += 1;
            }
        }
        None
    }

    /// Find where a new item with the given origin should be spliced in, per the YjsMod/Fugue
    /// tie-break: scan right from `origin_left`, skipping any existing sibling (same
    /// `origin_left`) whose `(right_parent, op_id)` sorts before ours.
    fn find_insert_index(&self, origin: InsertOrigin, new_lv: LV) -> usize {
        let mut idx = match origin.origin_left {
            ROOT => 0,
            ol => self.items_by_lv[&ol] + 1,
        };
        let new_key = (origin.right_parent, new_lv);
        while idx < self.items.len() {
            let other = &self.items[idx];
            if other.origin_left != origin.origin_left {
                break;
            }
            let other_key = (other.right_parent, other.op_id);
            if other_key < new_key {
                idx += 1;
            } else {
                break;
            }
        }
        idx
    }

    /// Apply the operation at `lv`. `origin` must be `Some` the first time an insert LV is
    /// applied in this context (the walker resolves and caches it once, at integration time);
    /// on every subsequent re-application after a retreat it's ignored, since the item already
    /// has a fixed place in `items`.
    pub(crate) fn apply_op<T>(
        &mut self,
        log: &OperationLog<T>,
        lv: LV,
        origin: Option<InsertOrigin>,
    ) -> Result<(), WalkerError> {
        match log.get(lv).ok_or(WalkerError::InconsistentState)? {
            ListOp::Insert { .. } => {
                if let Some(&idx) = self.items_by_lv.get(&lv) {
                    let item = &mut self.items[idx];
                    if item.cur_state != ItemState::NotYetInserted {
                        return Err(WalkerError::StateMismatch);
                    }
                    item.cur_state = ItemState::Inserted;
                    item.end_state = ItemState::Inserted;
                } else {
                    let origin = origin.ok_or(WalkerError::InconsistentState)?;
                    let idx = self.find_insert_index(origin, lv);
                    self.items.insert(idx, Item {
                        op_id: lv,
                        cur_state: ItemState::Inserted,
                        end_state: ItemState::Inserted,
                        origin_left: origin.origin_left,
                        right_parent: origin.right_parent,
                    });
                    for slot in self.items_by_lv.values_mut() {
                        if *slot >= idx {
                            *slot += 1;
                        }
                    }
                    self.items_by_lv.insert(lv, idx);
                }
            }
            ListOp::Delete { pos } => {
                match self.find_visible_at(*pos) {
                    Some(idx) => {
                        let target = self.items[idx].op_id;
                        self.items[idx].cur_state.delete();
                        self.items[idx].end_state.delete();
                        self.del_targets.insert(lv, target);
                    }
                    None => {
                        self.del_targets.insert(lv, ROOT);
                    }
                }
            }
        }
        Ok(())
    }

    /// Undo the operation at `lv`. `lv` must have been the most recently applied operation on
    /// the relevant item (advance/retreat always walk in the appropriate order to guarantee
    /// this); calling retreat on an LV that was never applied is a [`WalkerError::StateMismatch`].
    pub(crate) fn retreat_op<T>(&mut self, log: &OperationLog<T>, lv: LV) -> Result<(), WalkerError> {
        match log.get(lv).ok_or(WalkerError::InconsistentState)? {
            ListOp::Insert { .. } => {
                let idx = *self.items_by_lv.get(&lv).ok_or(WalkerError::StateMismatch)?;
                let item = &mut self.items[idx];
                if item.cur_state != ItemState::Inserted {
                    return Err(WalkerError::StateMismatch);
                }
                item.cur_state = ItemState::NotYetInserted;
                item.end_state = ItemState::NotYetInserted;
            }
            ListOp::Delete { .. } => {
                let target = *self.del_targets.get(&lv).ok_or(WalkerError::StateMismatch)?;
                if target != ROOT {
                    let idx = *self.items_by_lv.get(&target).ok_or(WalkerError::InconsistentState)?;
                    let item = &mut self.items[idx];
                    item.cur_state.undelete();
                    item.end_state.undelete();
                }
                self.del_targets.remove(&lv);
            }
        }
        Ok(())
    }
}
