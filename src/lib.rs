//! A collaborative list-editing engine built on the event-graph-walker approach: a compact
//! append-only causal graph of operation identities, paired with a replay engine that
//! reconstructs document state at any reachable version by applying and un-applying operations
//! in causal order.
//!
//! The two halves live in [`causalgraph`] (identity, ancestry, and version algebra) and
//! [`walker`] (the state machine that turns that graph, plus an [`oplog::OperationLog`], into a
//! materialized [`item::EditContext`]). Most callers only need [`walker::Walker`].

mod agent;
pub mod causalgraph;
mod dtrange;
mod error;
mod frontier;
mod item;
mod lv;
mod oplog;
pub mod walker;

pub use agent::{Agent, AgentId, RawVersion, Sequence};
pub use causalgraph::CausalGraph;
pub use dtrange::DTRange;
pub use error::{CGError, QueryError, WalkerError};
pub use frontier::Frontier;
pub use item::EditContext;
pub use lv::{LV, ROOT};
pub use oplog::{ListOp, OperationLog};
pub use walker::{BranchSnapshot, Walker};
