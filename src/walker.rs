//! The walker: orchestrates the causal graph, operation log, and edit context into local and
//! remote integration, advance/retreat, merge, and checkout.
//!
//! Replays into a single flat [`EditContext`] rather than a content-tree, and implements merge
//! as the non-iterative "retreat to dominators, then advance" algorithm -- see `DESIGN.md` for
//! how this relates to other replay strategies.

use std::collections::HashMap;

use crate::agent::Sequence;
use crate::causalgraph::graph::IterControl;
use crate::causalgraph::{AddResult, CausalGraph};
use crate::error::WalkerError;
use crate::frontier::{frontier_from_slice, Frontier};
use crate::item::{EditContext, InsertOrigin};
use crate::lv::{LV, ROOT};
use crate::oplog::{ListOp, OperationLog};

/// A materialized document at a particular frontier, produced by [`Walker::checkout`].
#[derive(Debug, Clone)]
pub struct BranchSnapshot<T> {
    pub contents: Vec<T>,
    pub version: Frontier,
}

/// Retreat `ctx` from its current version down to `target`, newest-first. `target` must be an
/// ancestor of (or equal to) `ctx.version()`.
fn retreat_ctx<T>(
    cg: &CausalGraph,
    log: &OperationLog<T>,
    ctx: &mut EditContext,
    target: &[LV],
) -> Result<(), WalkerError> {
    for &t in target {
        if !cg.version_contains_lv(ctx.version(), t)? {
            return Err(WalkerError::InvalidRetreat);
        }
    }
    let mut to_retreat = Vec::new();
    cg.iter_versions_between(target, ctx.version(), |lv, _, _| {
        to_retreat.push(lv);
        IterControl::Continue
    })?;
    // iter_versions_between yields children before parents, which is exactly newest-first.
    for lv in to_retreat {
        ctx.retreat_op(log, lv)?;
    }
    ctx.cur_version = frontier_from_slice(target);
    Ok(())
}

/// Advance `ctx` from its current version up to `target`, oldest-first, resolving each insert's
/// origin from `item_meta` (populated once per LV at integration time).
fn advance_ctx<T>(
    cg: &CausalGraph,
    log: &OperationLog<T>,
    item_meta: &HashMap<LV, InsertOrigin>,
    ctx: &mut EditContext,
    target: &[LV],
) -> Result<(), WalkerError> {
    let mut to_apply = Vec::new();
    cg.iter_versions_between(ctx.version(), target, |lv, _, _| {
        to_apply.push(lv);
        IterControl::Continue
    })?;
    // Reverse the children-before-parents visiting order to get oldest-first.
    for &lv in to_apply.iter().rev() {
        let origin = match log.get(lv) {
            Some(ListOp::Insert { .. }) => {
                Some(*item_meta.get(&lv).ok_or(WalkerError::InconsistentState)?)
            }
            Some(ListOp::Delete { .. }) => None,
            None => return Err(WalkerError::InconsistentState),
        };
        ctx.apply_op(log, lv, origin)?;
    }
    ctx.cur_version = frontier_from_slice(target);
    Ok(())
}

/// A single replica's view of a collaboratively-edited list: the causal graph of all known
/// operations, the operations themselves, and a reconstructed document for the replica's current
/// version.
#[derive(Debug)]
pub struct Walker<T> {
    cg: CausalGraph,
    log: OperationLog<T>,
    ctx: EditContext,
    /// `origin_left`/`right_parent` for every insert, resolved once at integration time and
    /// shared by the main context and every checkout thereafter (see the module docs on why
    /// these can't be recomputed freely from whatever context happens to be applying them).
    item_meta: HashMap<LV, InsertOrigin>,
}

impl<T> Default for Walker<T> {
    fn default() -> Self {
        Walker {
            cg: CausalGraph::new(),
            log: OperationLog::new(),
            ctx: EditContext::new(),
            item_meta: HashMap::new(),
        }
    }
}

impl<T> Walker<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn causal_graph(&self) -> &CausalGraph {
        &self.cg
    }

    pub fn get_ops(&self) -> &OperationLog<T> {
        &self.log
    }

    pub fn get_version(&self) -> &[LV] {
        self.ctx.version()
    }

    pub fn get_active_items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.ctx
            .snapshot(&self.log)
            .expect("the walker's own context must always be internally consistent")
    }

    fn raw_parents_for(&self, frontier: &[LV]) -> Vec<(String, Sequence)> {
        frontier
            .iter()
            .map(|&lv| {
                let (agent, seq) = self
                    .cg
                    .lv_to_raw(lv)
                    .expect("a walker's own version frontier must resolve to raw versions");
                (agent.to_string(), seq)
            })
            .collect()
    }

    /// Resolve `origin_left`/`right_parent` for a new insert at `pos`, relative to the document
    /// as it stood at `parents` -- computed by materializing a scratch context from scratch
    /// rather than trusting whatever the main context's current shape happens to be, since the
    /// two can differ under concurrency (see the module docs).
    fn resolve_insert_origin(&self, pos: usize, parents: &[LV]) -> Result<InsertOrigin, WalkerError> {
        let mut scratch = EditContext::new();
        advance_ctx(&self.cg, &self.log, &self.item_meta, &mut scratch, parents)?;
        let ids: Vec<LV> = scratch.active_item_ids().collect();
        let clamped = pos.min(ids.len());
        Ok(InsertOrigin {
            origin_left: if clamped == 0 { ROOT } else { ids[clamped - 1] },
            right_parent: if clamped < ids.len() { ids[clamped] } else { ROOT },
        })
    }

    fn do_integrate(
        &mut self,
        op: ListOp<T>,
        agent: &str,
        raw_parents: Option<&[(&str, Sequence)]>,
        auto_apply: bool,
    ) -> Result<LV, WalkerError> {
        let seq = self.cg.next_seq_for(agent);
        let pos = op.pos();
        let is_insert = op.is_insert();
        let log_len = self.log.len();
        self.log.push(op);

        match self.cg.add_raw(agent, seq, 1, raw_parents) {
            Ok(AddResult::Added { range }) => {
                let lv = range.start;
                if is_insert {
                    let parents = self.cg.parents_of(lv);
                    let origin = self.resolve_insert_origin(pos, &parents)?;
                    self.item_meta.insert(lv, origin);
                }
                if auto_apply {
                    self.advance(&[lv])?;
                }
                Ok(lv)
            }
            Ok(AddResult::Duplicate { range }) => {
                self.log.truncate(log_len);
                Ok(range.start)
            }
            Err(e) => {
                self.log.truncate(log_len);
                Err(WalkerError::from(e))
            }
        }
    }

    /// Create an insert operation, integrate it with parents equal to the walker's current
    /// version, and apply it to the context immediately.
    pub fn local_insert(&mut self, agent: &str, pos: usize, content: T) -> Result<LV, WalkerError> {
        let owned = self.raw_parents_for(&self.ctx.cur_version.clone());
        let raw: Vec<(&str, Sequence)> = owned.iter().map(|(a, s)| (a.as_str(), *s)).collect();
        self.do_integrate(ListOp::Insert { pos, content }, agent, Some(&raw), true)
    }

    /// As [`Walker::local_insert`], for a deletion.
    pub fn local_delete(&mut self, agent: &str, pos: usize) -> Result<LV, WalkerError> {
        let owned = self.raw_parents_for(&self.ctx.cur_version.clone());
        let raw: Vec<(&str, Sequence)> = owned.iter().map(|(a, s)| (a.as_str(), *s)).collect();
        self.do_integrate(ListOp::Delete { pos }, agent, Some(&raw), true)
    }

    /// Register a remotely-created operation. `raw_parents = None` resolves to the causal
    /// graph's current heads. The context is *not* automatically advanced to include it -- call
    /// [`Walker::advance`] or [`Walker::merge`] to bring it into view.
    pub fn integrate(
        &mut self,
        op: ListOp<T>,
        agent: &str,
        raw_parents: Option<&[(&str, Sequence)]>,
    ) -> Result<LV, WalkerError> {
        self.do_integrate(op, agent, raw_parents, false)
    }

    /// Apply every LV in the history of `target` not already in the context's history, oldest
    /// first, then set the context's version to `target`.
    pub fn advance(&mut self, target: &[LV]) -> Result<(), WalkerError> {
        advance_ctx(&self.cg, &self.log, &self.item_meta, &mut self.ctx, target)
    }

    /// Undo every LV in the context's history not in the history of `target`, newest first.
    /// `target` must be an ancestor of the context's current version. `target = []` resets the
    /// context outright (equivalent to, but cheaper than, retreating every applied op).
    pub fn retreat(&mut self, target: &[LV]) -> Result<(), WalkerError> {
        if target.is_empty() {
            self.ctx = EditContext::new();
            return Ok(());
        }
        retreat_ctx(&self.cg, &self.log, &mut self.ctx, target)
    }

    /// Move the context to represent exactly `target`: retreat to the common base of the
    /// context's current version and `target`, then advance to `target`.
    pub fn merge(&mut self, target: &[LV]) -> Result<(), WalkerError> {
        if target.is_empty() {
            self.ctx = EditContext::new();
            return Ok(());
        }
        if self.ctx.cur_version.is_empty() {
            // The context is already at the virtual root -- there's nothing to retreat, and
            // the root is trivially the common base of "nothing applied yet" and `target`, so
            // this is merge's algorithm with its first two steps dropped (same reasoning as
            // `checkout`, below).
            return self.advance(target);
        }
        let mut union: Vec<LV> = self.ctx.cur_version.to_vec();
        union.extend_from_slice(target);
        let common = self.cg.find_dominators(&union)?;
        self.retreat(&common)?;
        self.advance(target)
    }

    /// Materialize the document at `target` without disturbing the walker's own version: builds
    /// a fresh context and advances it directly from the empty frontier (a context starting
    /// empty has no state to retreat, so this is merge's algorithm with its first two steps
    /// dropped).
    pub fn checkout(&mut self, target: &[LV]) -> Result<BranchSnapshot<T>, WalkerError>
    where
        T: Clone,
    {
        let mut scratch = EditContext::new();
        advance_ctx(&self.cg, &self.log, &self.item_meta, &mut scratch, target)?;
        let contents = scratch.snapshot(&self.log)?;
        Ok(BranchSnapshot { contents, version: frontier_from_slice(target) })
    }
}
