//! Outbound surface contracts.
//!
//! The engine never speaks the platform wire protocol itself; it consumes
//! two abstract capabilities behind async traits: an entity search/retrieval
//! surface and a text-inference surface. Production implementations are
//! HTTP clients; tests swap in mocks.

pub mod gateway;
pub mod inference;
pub mod records;

#[cfg(test)]
pub(crate) mod mock;

pub use gateway::HttpGateway;
pub use inference::{HttpInference, InferenceConfig, TextInference};
pub use records::{MessagePage, RawEntity, RawMessage};

use crate::error::SurfaceError;
use async_trait::async_trait;

/// The abstract entity search/retrieval capability.
///
/// Assumed rate-limited on the remote side; callers that loop over
/// entities throttle themselves (see the enrichment orchestrator).
#[async_trait]
pub trait EntitySearch: Send + Sync {
    /// Exact/fuzzy match against entity titles and handles.
    async fn search_entities(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError>;

    /// Search scoped to the resolvable-contacts surface.
    async fn search_contacts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError>;

    /// Full-text search over message content, with referenced entities.
    async fn search_messages(&self, query: &str, limit: usize)
        -> Result<MessagePage, SurfaceError>;

    /// Resolve a public handle to an entity, `None` when unknown.
    async fn resolve_handle(&self, handle: &str) -> Result<Option<RawEntity>, SurfaceError>;

    /// Most recent content items for an entity, newest first.
    async fn recent_messages(
        &self,
        entity_ref: &str,
        limit: usize,
    ) -> Result<Vec<RawMessage>, SurfaceError>;

    /// Entities similar/related to the given one.
    async fn similar_entities(
        &self,
        entity_id: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError>;
}
