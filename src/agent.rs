//! Agent identifiers, sequence numbers, and the `(agent, seq)` raw version they combine into.

use smartstring::alias::String as SmartString;
use crate::lv::LV;

/// An opaque identifier for an author / replica. Equality is by value; the crate never looks
/// inside an agent's name.
pub type Agent = SmartString;

/// A per-agent, zero-based, gap-free operation counter.
pub type Sequence = usize;

/// The globally unique identity of a single operation: the agent which created it and that
/// agent's sequence number at creation time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RawVersion<'a> {
    pub agent: &'a str,
    pub seq: Sequence,
}

impl<'a> RawVersion<'a> {
    pub fn new(agent: &'a str, seq: Sequence) -> Self {
        RawVersion { agent, seq }
    }
}

/// An index into the causal graph's per-agent client table, assigned the first time an agent
/// name is seen.
pub type AgentId = usize;
