//! Error types surfaced by the causal graph and the walker.
//!
//! Following the rest of the crate, these are small hand-rolled enums rather than a
//! `thiserror`-derived type -- there's no dependency on error-formatting machinery anywhere in
//! this codebase, and these error sets are small and stable enough that the boilerplate isn't
//! worth pulling in a macro crate for.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors which can occur while adding a new run of operations to the causal graph via
/// [`CausalGraph::add_raw`](crate::causalgraph::CausalGraph::add_raw).
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum CGError {
    /// `add_raw` was called with a sequence number higher than the agent's next expected
    /// sequence -- there's a gap in that agent's history.
    Gap,
    /// `add_raw` was called with a sequence number lower than the agent's next expected
    /// sequence, but not matching an existing entry either (out of order, not a duplicate).
    OutOfOrder,
    /// A parent raw version does not resolve to any LV in the graph.
    UnknownParent,
}

impl Display for CGError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CGError::Gap => write!(f, "sequence number leaves a gap in the agent's history"),
            CGError::OutOfOrder => write!(f, "sequence number conflicts with existing history for this agent"),
            CGError::UnknownParent => write!(f, "parent version is not present in the causal graph"),
        }
    }
}

impl Error for CGError {}

/// Errors raised while querying the causal graph for ancestry information.
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum QueryError {
    /// An LV or frontier member referenced a version outside `[0, next_lv)`, or not present in
    /// the graph the query was run against.
    InvalidVersion,
}

impl Display for QueryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidVersion => write!(f, "version is out of bounds for this causal graph"),
        }
    }
}

impl Error for QueryError {}

/// Errors raised by the walker while advancing, retreating, or merging the edit context.
#[derive(Debug, Clone, Eq, PartialEq)]
#[non_exhaustive]
pub enum WalkerError {
    /// A query against the causal graph failed.
    Query(QueryError),
    /// `add_raw` rejected the operation being integrated.
    Graph(CGError),
    /// `retreat` was asked to move to a target which is not an ancestor of the current frontier.
    InvalidRetreat,
    /// `retreat_op` or `apply_op` found the edit context in a state inconsistent with the
    /// requested LV (e.g. retreating an insert that was never applied).
    StateMismatch,
    /// An internal invariant was violated -- should be unreachable outside of a bug or external
    /// mutation of the operation log / causal graph.
    InconsistentState,
}

impl Display for WalkerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WalkerError::Query(e) => write!(f, "{e}"),
            WalkerError::Graph(e) => write!(f, "{e}"),
            WalkerError::InvalidRetreat => write!(f, "retreat target is not an ancestor of the current frontier"),
            WalkerError::StateMismatch => write!(f, "edit context is in an inconsistent state for the requested version"),
            WalkerError::InconsistentState => write!(f, "internal invariant violated"),
        }
    }
}

impl Error for WalkerError {}

impl From<QueryError> for WalkerError {
    fn from(e: QueryError) -> Self {
        WalkerError::Query(e)
    }
}

impl From<CGError> for WalkerError {
    fn from(e: CGError) -> Self {
        WalkerError::Graph(e)
    }
}
