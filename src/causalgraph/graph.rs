//! Ancestry, diff, dominator, summary, and traversal queries over the causal graph.
//!
//! All of these walk the partial order built from CG entry parent pointers. Per the design
//! notes, ancestry is computed with a plain BFS/DFS over a visited set rather than a shadow or
//! height index: `next_lv` bounds every walk, and a production implementation under heavy query
//! load could add such an index without changing any of these signatures.

use std::collections::{BTreeMap, HashSet};

use crate::agent::{Agent, Sequence};
use crate::causalgraph::entry::CGEntry;
use crate::causalgraph::CausalGraph;
use crate::dtrange::{merge_adjacent_ranges, DTRange};
use crate::error::QueryError;
use crate::frontier::Frontier;
use crate::lv::LV;

/// A summary of the history of some version: for each agent, the sorted, merged sequence
/// ranges that version's history includes.
pub type VersionSummary = BTreeMap<Agent, Vec<(Sequence, Sequence)>>;

/// Ordering between two single versions -- see [`CausalGraph::compare_versions`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VersionOrdering {
    Equal,
    Ancestor,
    Descendant,
    Concurrent,
}

/// Outcome a callback passed to [`CausalGraph::iter_versions_between`] may return to end the
/// walk early.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum IterControl {
    Continue,
    Stop,
}

impl CausalGraph {
    pub(crate) fn parents_of(&self, lv: LV) -> Frontier {
        self.find_cg_entry(lv)
            .expect("lv must be valid")
            .parent_at_offset(lv)
    }

    /// True iff `target` is an ancestor of, or equal to, any member of `frontier`.
    pub fn version_contains_lv(&self, frontier: &[LV], target: LV) -> Result<bool, QueryError> {
        if !self.is_valid_lv(target) || !self.is_valid_frontier(frontier) {
            return Err(QueryError::InvalidVersion);
        }
        if frontier.contains(&target) {
            return Ok(true);
        }

        let mut visited: HashSet<LV> = HashSet::new();
        let mut queue: Vec<LV> = frontier.iter().copied().filter(|&v| v > target).collect();

        while let Some(lv) = queue.pop() {
            if lv == target {
                return Ok(true);
            }
            if !visited.insert(lv) {
                continue;
            }
            for p in self.parents_of(lv) {
                if p == target {
                    return Ok(true);
                }
                if p > target {
                    queue.push(p);
                }
            }
        }
        Ok(false)
    }

    /// Walk the full causal history of `frontier`, returning the complete set of LVs it
    /// contains (including the members of `frontier` itself).
    fn full_history(&self, frontier: &[LV]) -> HashSet<LV> {
        let mut visited: HashSet<LV> = HashSet::new();
        let mut queue: Vec<LV> = frontier.to_vec();
        while let Some(lv) = queue.pop() {
            if !visited.insert(lv) {
                continue;
            }
            for p in self.parents_of(lv) {
                queue.push(p);
            }
        }
        visited
    }

    /// Group the raw versions in the history of `frontier` by agent into sorted, merged
    /// sequence ranges.
    pub fn summarize_version(&self, frontier: &[LV]) -> Result<VersionSummary, QueryError> {
        if !self.is_valid_frontier(frontier) {
            return Err(QueryError::InvalidVersion);
        }
        let mut by_agent: BTreeMap<Agent, Vec<LV>> = BTreeMap::new();
        for lv in self.full_history(frontier) {
            let entry = self.find_cg_entry(lv).unwrap();
            let name = self.agent_name(entry.agent).into();
            by_agent.entry(name).or_default().push(entry.seq_at(lv));
        }

        let mut summary = VersionSummary::new();
        for (agent, mut seqs) in by_agent {
            seqs.sort_unstable();
            let mut ranges: Vec<(Sequence, Sequence)> = Vec::with_capacity(seqs.len());
            for seq in seqs {
                if let Some(last) = ranges.last_mut() {
                    if last.1 == seq {
                        last.1 = seq + 1;
                        continue;
                    }
                }
                ranges.push((seq, seq + 1));
            }
            summary.insert(agent, ranges);
        }
        Ok(summary)
    }

    fn summary_covers(&self, summary: &VersionSummary, lv: LV) -> bool {
        let entry = self.find_cg_entry(lv).unwrap();
        let name = self.agent_name(entry.agent);
        let seq = entry.seq_at(lv);
        summary.get(name).is_some_and(|ranges| ranges.iter().any(|r| r.0 <= seq && seq < r.1))
    }

    /// The LVs in the history of `from` whose raw identity is not covered by `to_summary`,
    /// returned as sorted, merged LV ranges.
    pub fn diff(&self, from: &[LV], to_summary: &VersionSummary) -> Result<Vec<DTRange>, QueryError> {
        if !self.is_valid_frontier(from) {
            return Err(QueryError::InvalidVersion);
        }
        let uncovered: Vec<LV> = self.full_history(from).into_iter()
            .filter(|&lv| !self.summary_covers(to_summary, lv))
            .collect();
        let mut ranges: Vec<DTRange> = uncovered.into_iter().map(|lv| DTRange::new(lv, lv + 1)).collect();
        merge_adjacent_ranges(&mut ranges);
        Ok(ranges)
    }

    /// The minimal set of LVs which are common ancestors of every input version, and are not
    /// themselves an ancestor of another member of that common set. Two versions with disjoint
    /// histories have no common ancestor but the virtual root, so this returns empty.
    pub fn find_dominators(&self, versions: &[LV]) -> Result<Frontier, QueryError> {
        if !self.is_valid_frontier(versions) {
            return Err(QueryError::InvalidVersion);
        }
        let mut candidates: Frontier = versions.iter().copied().collect();
        candidates.sort_unstable();
        candidates.dedup();

        if candidates.len() <= 1 {
            return Ok(candidates);
        }

        // The common ancestors of every candidate are exactly the LVs present in *all* of
        // their (inclusive) histories -- the meet of the candidates in the partial order, not
        // their tips.
        let mut common: HashSet<LV> = self.full_history(&candidates[..1]);
        for &lv in &candidates[1..] {
            let hist = self.full_history(&[lv]);
            common.retain(|v| hist.contains(v));
        }

        // Of those common ancestors, keep only the maximal ones: an LV survives if no *other*
        // member of the common set has it in its history.
        let mut result: Vec<LV> = common.iter().copied()
            .filter(|&lv| {
                !common.iter().any(|&other| {
                    other != lv && self.version_contains_lv(&[other], lv).unwrap_or(false)
                })
            })
            .collect();
        result.sort_unstable();
        result.dedup();
        Ok(result.into_iter().collect())
    }

    /// The LVs in the history of `versions` which are not in the history of their common
    /// ancestors, i.e. the region of the graph which is genuinely concurrent/conflicting.
    pub fn find_conflicting(&self, versions: &[LV]) -> Result<Vec<DTRange>, QueryError> {
        let common = self.find_dominators(versions)?;
        let summary = self.summarize_version(&common)?;
        self.diff(versions, &summary)
    }

    /// Compare two single versions.
    pub fn compare_versions(&self, a: LV, b: LV) -> Result<VersionOrdering, QueryError> {
        if a == b {
            return Ok(VersionOrdering::Equal);
        }
        if self.version_contains_lv(&[a], b)? {
            return Ok(VersionOrdering::Descendant);
        }
        if self.version_contains_lv(&[b], a)? {
            return Ok(VersionOrdering::Ancestor);
        }
        Ok(VersionOrdering::Concurrent)
    }

    /// Visit every LV in the history of `to` that is not in the history of `from`, in reverse
    /// topological order (children before parents, i.e. the order a reader would need to
    /// *retreat* through to undo them). `is_merge` is true iff the LV sits at the start of an
    /// entry with more than one parent; `is_parent_of_previous` is true when this LV is the
    /// first (primary) parent of the previously-visited LV.
    ///
    /// If `to` is already in the history of `from`, nothing is visited.
    pub fn iter_versions_between<F>(&self, from: &[LV], to: &[LV], mut f: F) -> Result<(), QueryError>
    where
        F: FnMut(LV, bool, bool) -> IterControl,
    {
        if !self.is_valid_frontier(from) || !self.is_valid_frontier(to) {
            return Err(QueryError::InvalidVersion);
        }

        let from_history = self.full_history(from);
        if to.iter().all(|&lv| from_history.contains(&lv)) {
            return Ok(());
        }

        // Collect the target set, then visit it in descending LV order. Since every parent has
        // a strictly smaller LV than its child (invariant 3), descending LV order is always a
        // valid reverse-topological order.
        let mut target: Vec<LV> = self.full_history(to).into_iter()
            .filter(|lv| !from_history.contains(lv))
            .collect();
        target.sort_unstable_by(|a, b| b.cmp(a));

        let mut prev_primary_parent: Option<LV> = None;
        for lv in target {
            let entry = self.find_cg_entry(lv).unwrap();
            let is_merge = lv == entry.span.start && entry.parents.len() > 1;
            let is_parent_of_previous = prev_primary_parent == Some(lv);

            if f(lv, is_parent_of_previous, is_merge) == IterControl::Stop {
                return Ok(());
            }

            prev_primary_parent = if lv == entry.span.start {
                entry.parents.first().copied()
            } else {
                Some(lv - 1)
            };
        }
        Ok(())
    }

    /// The LVs in the current graph's full history which are not covered by `summary`.
    pub fn intersect_with_summary(&self, summary: &VersionSummary) -> Vec<LV> {
        let mut out: Vec<LV> = (0..self.next_lv)
            .filter(|&lv| !self.summary_covers(summary, lv))
            .collect();
        out.sort_unstable();
        out
    }

    /// As [`CausalGraph::intersect_with_summary`], but returned as reconstructed CG entry runs
    /// (with run boundaries and parent pointers recomputed for each uncovered contiguous
    /// slice): parents of the first LV of a sliced run are the original entry's parents,
    /// otherwise `[lv - 1]`.
    pub fn intersect_with_summary_full(&self, summary: &VersionSummary) -> Vec<CGEntry> {
        let uncovered = self.intersect_with_summary(summary);
        let mut out: Vec<CGEntry> = Vec::new();

        for lv in uncovered {
            let source = self.find_cg_entry(lv).unwrap();
            let parents = source.parent_at_offset(lv);

            if let Some(last) = out.last_mut() {
                if last.span.end == lv && last.agent == source.agent && parents.as_slice() == [last.span.last()] {
                    last.span.end = lv + 1;
                    continue;
                }
            }
            out.push(CGEntry {
                span: DTRange::new(lv, lv + 1),
                agent: source.agent,
                seq_start: source.seq_at(lv),
                parents,
            });
        }
        out
    }
}
