//! Configurable in-memory surfaces for async tests.

use crate::error::{InferenceError, SurfaceError};
use crate::surface::{EntitySearch, MessagePage, RawEntity, RawMessage, TextInference};
use async_trait::async_trait;
use std::collections::HashMap;

/// Build a usable entity record for tests.
pub(crate) fn entity(
    id: &str,
    title: &str,
    handle: Option<&str>,
    participants: u64,
    verified: bool,
) -> RawEntity {
    RawEntity {
        id: Some(id.to_string()),
        title: Some(title.to_string()),
        handle: handle.map(str::to_string),
        broadcast: true,
        participant_count: Some(participants),
        about: None,
        verified,
    }
}

/// Build a text message with a date, for metrics tests.
pub(crate) fn message(id: u64, text: &str, date: i64, views: u64) -> RawMessage {
    RawMessage {
        id,
        peer_id: None,
        text: Some(text.to_string()),
        date: Some(date),
        views: Some(views),
        reactions: Some(views / 10),
        has_media: false,
        is_forward: false,
    }
}

/// Entity-search surface backed by fixed responses.
#[derive(Default)]
pub(crate) struct MockSurface {
    pub entities: Vec<RawEntity>,
    pub contacts: Vec<RawEntity>,
    pub message_page: MessagePage,
    pub resolved: HashMap<String, RawEntity>,
    pub recent: HashMap<String, Vec<RawMessage>>,
    pub similar: HashMap<String, Vec<RawEntity>>,
    /// Make `search_entities` fail, for isolation tests.
    pub fail_entities: bool,
    /// Make `recent_messages` fail for this entity ref.
    pub fail_recent_for: Option<String>,
}

#[async_trait]
impl EntitySearch for MockSurface {
    async fn search_entities(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError> {
        if self.fail_entities {
            return Err(SurfaceError::Unavailable("mock outage".to_string()));
        }
        Ok(self.entities.iter().take(limit).cloned().collect())
    }

    async fn search_contacts(
        &self,
        _query: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError> {
        Ok(self.contacts.iter().take(limit).cloned().collect())
    }

    async fn search_messages(
        &self,
        _query: &str,
        _limit: usize,
    ) -> Result<MessagePage, SurfaceError> {
        Ok(self.message_page.clone())
    }

    async fn resolve_handle(&self, handle: &str) -> Result<Option<RawEntity>, SurfaceError> {
        Ok(self.resolved.get(handle).cloned())
    }

    async fn recent_messages(
        &self,
        entity_ref: &str,
        limit: usize,
    ) -> Result<Vec<RawMessage>, SurfaceError> {
        if self.fail_recent_for.as_deref() == Some(entity_ref) {
            return Err(SurfaceError::Unavailable("mock fetch failure".to_string()));
        }
        Ok(self
            .recent
            .get(entity_ref)
            .map(|msgs| msgs.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn similar_entities(
        &self,
        entity_id: &str,
        limit: usize,
    ) -> Result<Vec<RawEntity>, SurfaceError> {
        Ok(self
            .similar
            .get(entity_id)
            .map(|sim| sim.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

/// Text-inference surface returning a canned reply.
#[derive(Default)]
pub(crate) struct MockInference {
    pub reply: Option<String>,
    pub fail: bool,
}

#[async_trait]
impl TextInference for MockInference {
    async fn complete(&self, _prompt: &str) -> Result<String, InferenceError> {
        if self.fail {
            return Err(InferenceError::Transport(
                "mock transport failure".to_string(),
            ));
        }
        Ok(self.reply.clone().unwrap_or_default())
    }
}
