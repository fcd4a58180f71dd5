//! Errors for the fallible construction and configuration APIs.
//!
//! Tracing and triangulation never fail with these; they report through
//! [`CellResult`](crate::algorithms::cell::CellResult) and
//! [`TriangulationResult`](crate::algorithms::triangulate::TriangulationResult).

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CellTraceError {
    /// An edge or query referenced a node that does not exist.
    #[error("node `{0}` does not exist")]
    InvalidNode(usize),
    #[error("edge would connect node `{0}` to itself")]
    SelfLoop(usize),
    #[error("nodes `{0}` and `{1}` are already connected")]
    DuplicateEdge(usize, usize),
    #[error("coordinate `{0}` is not finite or out of bounds")]
    NonFinite(&'static str),
    #[error("limit exceeded: {what} (max {max})")]
    LimitExceeded { what: &'static str, max: usize },
    /// The projected table does not line up with the cluster's nodes.
    #[error("expected {expected} projected positions, got {got}")]
    ProjectionMismatch { expected: usize, got: usize },
    #[error("projection normal must be finite and non-zero")]
    InvalidNormal,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid json: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CellTraceError {
    fn from(e: serde_json::Error) -> Self {
        CellTraceError::Json(e.to_string())
    }
}
