//! Research session state.
//!
//! [`Research`] is the long-lived record of one session, owned by the
//! orchestrator for the session's lifetime. `queries` and `learnings`
//! are append-only: entries are never removed or reordered once pushed.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a research session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchStatus {
    /// The session is running (or has not started).
    InProgress,
    /// Report synthesis completed.
    Done,
}

/// One unit of research work: a search query plus the goal it serves.
///
/// Ephemeral and frontier-scoped: consumed by exactly one executor
/// invocation, which may produce zero or more successor items for the
/// next depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryItem {
    /// The search query text.
    pub query: String,
    /// What this query is meant to establish.
    pub goal: String,
}

impl QueryItem {
    /// Creates a new query item.
    #[must_use]
    pub fn new(query: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            goal: goal.into(),
        }
    }
}

/// Accumulated state of one research session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Research {
    /// Opaque session identifier, immutable after creation.
    pub id: String,
    /// Human-readable session name, immutable after creation.
    pub name: String,
    /// Historical record of every item ever dispatched: seeds plus all
    /// discovered follow-ups, in dispatch order. Append-only.
    pub queries: Vec<QueryItem>,
    /// The questions the session set out to answer. Immutable input.
    pub questions: Vec<String>,
    /// Facts extracted across all depths. Append-only.
    pub learnings: Vec<String>,
    /// Session status; set to [`ResearchStatus::Done`] only after report
    /// synthesis completes.
    pub status: ResearchStatus,
}

impl Research {
    /// Creates a new in-progress session with empty learnings.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        queries: Vec<QueryItem>,
        questions: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            queries,
            questions,
            learnings: Vec::new(),
            status: ResearchStatus::InProgress,
        }
    }
}
