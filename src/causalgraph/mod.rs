//! The causal graph: a compact, append-only record of operation identities, their parent
//! relationships, and the bidirectional mapping between `(agent, seq)` raw versions and dense
//! local version indices.
//!
//! This is the largest component in the crate. [`mod@entry`] defines the two run types the
//! graph is built from; [`graph`] holds the ancestry, diff, dominator, and traversal queries;
//! this module owns the `CausalGraph` struct itself plus identity assignment (`add_raw`) and
//! the raw-version <-> LV mapping.

pub mod entry;
pub mod graph;
pub mod check;

use rle::{AppendRle, HasLength, Searchable};
use smallvec::smallvec;
use crate::agent::{Agent, AgentId, Sequence};
use crate::causalgraph::entry::{CGEntry, ClientEntry};
use crate::dtrange::DTRange;
use crate::error::CGError;
use crate::frontier::{add_to_frontier, remove_from_frontier, Frontier};
use crate::lv::LV;

#[derive(Debug, Clone)]
pub(crate) struct ClientData {
    pub(crate) name: Agent,
    /// Sorted, non-overlapping runs mapping this agent's sequence numbers onto LVs. Per
    /// invariant 2, their union is exactly the set of sequences ever assigned to this agent,
    /// with no gaps.
    pub(crate) entries: Vec<ClientEntry>,
}

/// Result of a successful [`CausalGraph::add_raw`] call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum AddResult {
    /// A new run of LVs was allocated for this operation.
    Added { range: DTRange },
    /// This `(agent, seq)` identity was already present; no mutation occurred. A soft no-op,
    /// not an error -- see open question 3 in the design notes for why this -- rather than a
    /// reference to the pre-existing entry -- is what gets returned.
    Duplicate { range: DTRange },
}

impl AddResult {
    /// The LV range this identity occupies, whether freshly added or already present.
    pub fn range(&self) -> DTRange {
        match self {
            AddResult::Added { range } | AddResult::Duplicate { range } => *range,
        }
    }
}

/// The causal graph. Stores operation metadata as run-length entries, maintains the current
/// frontier (`heads`), and answers ancestry, diff, dominator, summary, intersection, and
/// traversal queries (see [`graph`]).
#[derive(Debug, Clone, Default)]
pub struct CausalGraph {
    /// CG entries, sorted by starting LV, covering `[0, next_lv)` with no gaps or overlaps.
    pub(crate) entries: Vec<CGEntry>,
    /// Per-agent client data, indexed by [`AgentId`].
    pub(crate) client_data: Vec<ClientData>,
    /// The frontier: LVs with no descendant in the graph. Kept sorted and deduplicated.
    pub(crate) heads: Frontier,
    /// One past the highest LV ever assigned.
    pub(crate) next_lv: LV,
}

impl CausalGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_lv(&self) -> LV {
        self.next_lv
    }

    pub fn heads(&self) -> &[LV] {
        &self.heads
    }

    fn get_agent_id(&self, name: &str) -> Option<AgentId> {
        self.client_data.iter().position(|c| c.name == name)
    }

    fn get_or_create_agent_id(&mut self, name: &str) -> AgentId {
        if let Some(id) = self.get_agent_id(name) {
            return id;
        }
        self.client_data.push(ClientData { name: Agent::from(name), entries: Vec::new() });
        self.client_data.len() - 1
    }

    /// The agent's name, for diagnostics.
    pub fn agent_name(&self, agent: AgentId) -> &str {
        &self.client_data[agent].name
    }

    /// The next sequence number this agent is expected to use -- one past the end of its most
    /// recent run, or 0 if the agent has never been seen.
    pub fn next_seq_for(&self, name: &str) -> Sequence {
        match self.get_agent_id(name) {
            Some(id) => self.client_data[id].entries.last().map_or(0, |e| e.seq_end()),
            None => 0,
        }
    }

    fn client_entries_for(&self, agent: AgentId) -> &[ClientEntry] {
        &self.client_data[agent].entries
    }

    /// Binary-search an agent's client entries for the run containing `seq`.
    fn find_client_entry(&self, agent: AgentId, seq: Sequence) -> Option<(&ClientEntry, usize)> {
        let entries = self.client_entries_for(agent);
        // "first index with key > target" search, then step back one.
        let idx = entries.partition_point(|e| e.seq_range.start <= seq);
        if idx == 0 { return None; }
        let entry = &entries[idx - 1];
        let offset = entry.get_offset(seq)?;
        Some((entry, offset))
    }

    /// Binary-search the CG entries for the run containing `lv`.
    fn find_cg_entry(&self, lv: LV) -> Option<&CGEntry> {
        let idx = self.entries.partition_point(|e| e.span.start <= lv);
        if idx == 0 { return None; }
        let entry = &self.entries[idx - 1];
        entry.contains(lv).then_some(entry)
    }

    fn is_valid_lv(&self, lv: LV) -> bool {
        lv < self.next_lv
    }

    pub(crate) fn is_valid_frontier(&self, frontier: &[LV]) -> bool {
        frontier.iter().all(|&lv| self.is_valid_lv(lv))
    }

    /// Map a raw `(agent, seq)` version to its LV, if known.
    pub fn raw_to_lv(&self, agent: &str, seq: Sequence) -> Option<LV> {
        let agent_id = self.get_agent_id(agent)?;
        let (entry, offset) = self.find_client_entry(agent_id, seq)?;
        Some(entry.lv_at_seq(entry.seq_range.start + offset))
    }

    /// Map an LV back to its raw `(agent, seq)` version.
    pub fn lv_to_raw(&self, lv: LV) -> Option<(&str, Sequence)> {
        let entry = self.find_cg_entry(lv)?;
        Some((self.agent_name(entry.agent), entry.seq_at(lv)))
    }

    /// As [`CausalGraph::lv_to_raw`], but also returns the parents of this specific LV (the
    /// entry's parents at offset 0, or the single preceding LV otherwise).
    pub fn lv_to_raw_with_parents(&self, lv: LV) -> Option<(&str, Sequence, Frontier)> {
        let entry = self.find_cg_entry(lv)?;
        Some((self.agent_name(entry.agent), entry.seq_at(lv), entry.parent_at_offset(lv)))
    }

    /// Append a new run of `length` operations by `agent`, starting at `seq`, with the given
    /// parents.
    ///
    /// `raw_parents = None` resolves to the current heads (distinct from `Some(&[])`, which
    /// means "parents are the root" and is only valid for the very first operations in the
    /// graph). Duplicate identities are a soft no-op: if `(agent, seq)` is already known, this
    /// returns `AddResult::Duplicate` without mutating anything, making replay of the same
    /// operation idempotent under reordered or repeated replay.
    pub fn add_raw(
        &mut self,
        agent: &str,
        seq: Sequence,
        length: usize,
        raw_parents: Option<&[(&str, Sequence)]>,
    ) -> Result<AddResult, CGError> {
        debug_assert!(length >= 1);

        let agent_id = self.get_or_create_agent_id(agent);
        let next_seq = self.client_data[agent_id].entries.last().map_or(0, |e| e.seq_end());

        if seq < next_seq {
            // Could be a duplicate of an existing run, or could overlap one partially (which we
            // treat as out-of-order since partial overlaps can't be serviced as a clean no-op).
            if let Some((entry, offset)) = self.find_client_entry(agent_id, seq) {
                if offset + length <= entry.len() {
                    let start = entry.lv_at_seq(seq);
                    return Ok(AddResult::Duplicate { range: DTRange::new_from_len(start, length) });
                }
            }
            return Err(CGError::OutOfOrder);
        }
        if seq > next_seq {
            return Err(CGError::Gap);
        }

        let parent_lvs: Frontier = match raw_parents {
            None => self.heads.clone(),
            Some(raw) => {
                let mut lvs = Frontier::new();
                for &(p_agent, p_seq) in raw {
                    let lv = self.raw_to_lv(p_agent, p_seq).ok_or(CGError::UnknownParent)?;
                    lvs.push(lv);
                }
                lvs.sort_unstable();
                lvs.dedup();
                lvs
            }
        };
        if parent_lvs.iter().any(|&p| !self.is_valid_lv(p)) {
            return Err(CGError::UnknownParent);
        }

        let range = DTRange::new_from_len(self.next_lv, length);

        let new_entry = CGEntry {
            span: range,
            agent: agent_id,
            seq_start: seq,
            parents: parent_lvs.clone(),
        };
        self.entries.push_rle(new_entry);

        self.client_data[agent_id].entries.push_rle(ClientEntry {
            seq_range: DTRange::new_from_len(seq, length),
            lv_start: range.start,
        });

        for &p in &parent_lvs {
            remove_from_frontier(&mut self.heads, p);
        }
        add_to_frontier(&mut self.heads, range.last());

        self.next_lv = range.end;

        Ok(AddResult::Added { range })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_graph_has_no_heads() {
        let cg = CausalGraph::new();
        assert!(cg.heads().is_empty());
        assert_eq!(cg.next_lv(), 0);
    }

    #[test]
    fn add_raw_assigns_dense_lvs() {
        let mut cg = CausalGraph::new();
        let r1 = cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        assert_eq!(r1.range(), DTRange::new(0, 1));
        let r2 = cg.add_raw("a", 1, 2, None).unwrap();
        assert_eq!(r2.range(), DTRange::new(1, 3));
        assert_eq!(cg.heads(), &[2]);
        assert_eq!(cg.next_lv(), 3);
    }

    #[test]
    fn add_raw_rejects_gap() {
        let mut cg = CausalGraph::new();
        cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        assert_eq!(cg.add_raw("a", 5, 1, None), Err(CGError::Gap));
    }

    #[test]
    fn add_raw_rejects_unknown_parent() {
        let mut cg = CausalGraph::new();
        assert_eq!(cg.add_raw("a", 0, 1, Some(&[("b", 0)])), Err(CGError::UnknownParent));
    }

    #[test]
    fn add_raw_duplicate_is_a_soft_noop() {
        let mut cg = CausalGraph::new();
        let r1 = cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        let before = cg.next_lv();
        let r2 = cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        assert_eq!(cg.next_lv(), before);
        assert!(matches!(r2, AddResult::Duplicate { .. }));
        assert_eq!(r1.range(), r2.range());
    }

    #[test]
    fn raw_lv_roundtrip() {
        let mut cg = CausalGraph::new();
        cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        cg.add_raw("b", 0, 1, Some(&[])).unwrap();
        for lv in 0..cg.next_lv() {
            let (agent, seq) = cg.lv_to_raw(lv).unwrap();
            assert_eq!(cg.raw_to_lv(agent, seq), Some(lv));
        }
    }

    #[test]
    fn run_length_merge_extends_prior_entry() {
        let mut cg = CausalGraph::new();
        cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        cg.add_raw("a", 1, 1, None).unwrap();
        assert_eq!(cg.entries.len(), 1);
        assert_eq!(cg.entries[0].span, DTRange::new(0, 2));
    }

    #[test]
    fn concurrent_agents_do_not_merge_entries() {
        let mut cg = CausalGraph::new();
        cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        cg.add_raw("b", 0, 1, Some(&[])).unwrap();
        assert_eq!(cg.entries.len(), 2);
        assert_eq!(cg.heads(), &[0, 1]);
    }
}
