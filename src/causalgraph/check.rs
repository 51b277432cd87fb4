//! Debug-only invariant checking for the causal graph: a method tests call liberally, not
//! wired into normal control flow.

use crate::causalgraph::CausalGraph;

impl CausalGraph {
    /// Assert the causal graph's structural invariants hold: entries are contiguous and
    /// gap-free, parents always precede their children, per-agent sequences are gap-free, the
    /// raw/LV mapping round-trips, and heads are exactly the LVs with no descendant. Panics on
    /// violation. Intended for use in tests and fuzzers, not on any hot path.
    pub fn dbg_check(&self) {
        // Invariant 1: entries are sorted, non-overlapping, and cover [0, next_lv).
        let mut expect_start = 0;
        for entry in &self.entries {
            assert_eq!(entry.span.start, expect_start, "CG entries must have no gaps");
            assert!(entry.span.start < entry.span.end, "CG entries must be non-empty");
            expect_start = entry.span.end;
        }
        assert_eq!(expect_start, self.next_lv, "CG entries must cover [0, next_lv)");

        // Invariant 3: parents are always strictly less than the entry's starting LV.
        for entry in &self.entries {
            for &p in &entry.parents {
                assert!(p < entry.span.start, "parents must precede their children");
            }
            assert!(
                entry.parents.windows(2).all(|w| w[0] < w[1]),
                "entry parents must be sorted and deduplicated"
            );
        }

        // Invariant 2: per agent, client entries are sorted, non-overlapping, and gap-free.
        for client in &self.client_data {
            let mut expect_seq = 0;
            for entry in &client.entries {
                assert_eq!(entry.seq_range.start, expect_seq, "client entries must have no gaps");
                expect_seq = entry.seq_range.end;
            }
        }

        // Every LV must resolve back to the raw version which maps forward to it.
        for lv in 0..self.next_lv {
            let (agent, seq) = self.lv_to_raw(lv).expect("every lv must resolve to a raw version");
            assert_eq!(self.raw_to_lv(agent, seq), Some(lv), "raw_to_lv must invert lv_to_raw");
        }

        // Invariant 4: heads are sorted, deduplicated, and have no descendant in the graph.
        assert!(self.heads.windows(2).all(|w| w[0] < w[1]), "heads must be sorted and deduplicated");
        for &h in &self.heads {
            assert!(h < self.next_lv, "heads must be valid LVs");
        }
        for lv in 0..self.next_lv {
            if self.heads.contains(&lv) { continue; }
            let has_descendant = self.heads.iter().any(|&h| {
                h != lv && self.version_contains_lv(&[h], lv).unwrap_or(false)
            }) || (lv + 1..self.next_lv).any(|other| {
                self.parents_of(other).contains(&lv)
            });
            assert!(has_descendant, "lv {lv} not in heads must have a descendant");
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::causalgraph::CausalGraph;

    #[test]
    fn dbg_check_passes_on_linear_history() {
        let mut cg = CausalGraph::new();
        cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        cg.add_raw("a", 1, 3, None).unwrap();
        cg.dbg_check();
    }

    #[test]
    fn dbg_check_passes_on_concurrent_history() {
        let mut cg = CausalGraph::new();
        cg.add_raw("a", 0, 1, Some(&[])).unwrap();
        cg.add_raw("b", 0, 1, Some(&[])).unwrap();
        cg.add_raw("a", 1, 1, None).unwrap();
        cg.dbg_check();
    }
}
