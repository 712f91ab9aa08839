//! Group enumeration. Re-fetches on every call; nothing is cached.

use crate::domain::{DomainError, Group};
use crate::usecases::Session;
use std::sync::Arc;
use tracing::info;

/// Lists the groups visible to the current session.
pub struct GroupDirectory {
    session: Arc<Session>,
}

impl GroupDirectory {
    pub fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Fetch all chats and keep the group chats, in the order the client
    /// delivered them (not guaranteed stable). Fails with `NotReady` before
    /// the session reaches ready, without touching the transport.
    pub async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        self.session.require_ready()?;

        info!("listing groups");
        let chats = self.session.transport().fetch_chats().await?;
        info!(count = chats.len(), "chats loaded");

        let groups: Vec<Group> = chats
            .into_iter()
            .filter(|chat| chat.is_group)
            .map(|chat| Group {
                id: chat.id,
                name: chat.name,
            })
            .collect();
        info!(count = groups.len(), "groups found");

        Ok(groups)
    }
}
