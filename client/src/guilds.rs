//! Guild list memoized per client.

use crate::api::ReviewApi;
use crate::dto::Guild;
use crate::error::ClientError;
use std::sync::Arc;
use tokio::sync::OnceCell;
use vetted_types::GuildId;

/// Fetches the guild list once and serves it from memory afterwards.
///
/// Concurrent first callers share a single backend request. A failed fetch is
/// not remembered; the next caller tries again.
pub struct GuildDirectory<A> {
    api: Arc<A>,
    guilds: OnceCell<Vec<Guild>>,
}

impl<A: ReviewApi> GuildDirectory<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            guilds: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.guilds.initialized()
    }

    pub async fn guilds(&self) -> Result<&[Guild], ClientError> {
        self.guilds
            .get_or_try_init(|| self.api.list_guilds())
            .await
            .map(Vec::as_slice)
    }

    pub async fn find(&self, id: &GuildId) -> Result<Option<&Guild>, ClientError> {
        Ok(self.guilds().await?.iter().find(|g| &g.id == id))
    }
}
