//! Decision-maker boundary.

use async_trait::async_trait;

use crate::error::LexGraphResult;
use crate::types::Decision;

/// Turns formatted graph evidence into a compliance verdict.
///
/// Implementations should always produce a best-effort [`Decision`]; an `Err`
/// tells the caller the collaborator is unavailable, and callers recover with
/// a graph-only fallback.
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    /// Decide on `question` given the formatted evidence and caller context.
    async fn decide(
        &self,
        question: &str,
        formatted_evidence: &str,
        extra_context: &str,
    ) -> LexGraphResult<Decision>;
}
