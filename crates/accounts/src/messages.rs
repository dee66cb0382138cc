//! Support-chat message repository over the messages document.

use crate::error::{AccountError, Result};
use blockbridge_core::Message;
use blockbridge_store::{fetch, store_record, DocumentHandle, DocumentStore};
use std::sync::Arc;

/// CRUD over the support-chat message list.
#[derive(Clone)]
pub struct MessageRepository {
    store: Arc<dyn DocumentStore>,
}

impl MessageRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the conversation between two parties, oldest first.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn conversation(&self, a: &str, b: &str) -> Result<Vec<Message>> {
        let (items, _) = self.load().await?;
        let mut thread: Vec<Message> = items
            .into_iter()
            .filter(|m| {
                (m.sender == a && m.recipient == b) || (m.sender == b && m.recipient == a)
            })
            .collect();
        thread.sort_by(|x, y| x.timestamp.cmp(&y.timestamp));
        Ok(thread)
    }

    /// Appends a new message and persists the whole list.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn send(&self, sender: &str, recipient: &str, content: &str) -> Result<Message> {
        let (mut items, version) = self.load().await?;
        let message = Message::new(sender, recipient, content);
        items.push(message.clone());
        self.persist(&items, version).await?;
        Ok(message)
    }

    /// Marks a message as read by its recipient.
    ///
    /// # Errors
    /// Returns [`AccountError::MessageNotFound`] if the id is unknown, or a
    /// store error.
    pub async fn mark_read(&self, id: &str) -> Result<Message> {
        let (mut items, version) = self.load().await?;

        let message = items
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AccountError::MessageNotFound(id.to_string()))?;

        message.read = true;
        let updated = message.clone();
        self.persist(&items, version).await?;
        Ok(updated)
    }

    async fn load(&self) -> Result<(Vec<Message>, u64)> {
        Ok(fetch(self.store.as_ref(), DocumentHandle::Messages).await?)
    }

    async fn persist(&self, items: &[Message], version: u64) -> Result<()> {
        store_record(self.store.as_ref(), DocumentHandle::Messages, &items, version).await?;
        Ok(())
    }
}
