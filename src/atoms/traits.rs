// ── Scout Atoms: Traits ────────────────────────────────────────────────────
// Seams between the pure filters and the network client.

use async_trait::async_trait;

use super::error::EvolutionResult;
use super::types::Group;

/// Anything that can produce the full group list for one instance.
/// The Evolution client implements it; tests substitute an in-memory list.
#[async_trait]
pub trait GroupSource: Send + Sync {
    async fn fetch_all_groups(&self) -> EvolutionResult<Vec<Group>>;
}
