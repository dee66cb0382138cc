//! Notification repository over the notifications document.

use crate::error::{AccountError, Result};
use blockbridge_core::Notification;
use blockbridge_store::{fetch, store_record, DocumentHandle, DocumentStore};
use std::sync::Arc;

/// CRUD over the notification list.
#[derive(Clone)]
pub struct NotificationRepository {
    store: Arc<dyn DocumentStore>,
}

impl NotificationRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns every notification (admin view).
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn list_all(&self) -> Result<Vec<Notification>> {
        let (items, _) = self.load().await?;
        Ok(items)
    }

    /// Returns the notifications visible to one user: broadcasts plus their
    /// own personal and system records, newest first.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn list_for(&self, user_id: &str) -> Result<Vec<Notification>> {
        let (items, _) = self.load().await?;
        let mut visible: Vec<Notification> = items
            .into_iter()
            .filter(|n| n.is_visible_to(user_id))
            .collect();
        visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(visible)
    }

    /// Appends a notification and persists the whole list.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn create(&self, notification: Notification) -> Result<Notification> {
        let (mut items, version) = self.load().await?;
        items.push(notification.clone());
        self.persist(&items, version).await?;

        tracing::info!(
            notification_id = %notification.id,
            kind = notification.kind.as_str(),
            "notification created"
        );
        Ok(notification)
    }

    /// Marks a notification read for one user. Marking twice is a no-op.
    ///
    /// # Errors
    /// Returns [`AccountError::NotificationNotFound`] if the id is unknown,
    /// or a store error.
    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<Notification> {
        let (mut items, version) = self.load().await?;

        let notification = items
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| AccountError::NotificationNotFound(id.to_string()))?;

        if notification.mark_read_by(user_id) {
            let updated = notification.clone();
            self.persist(&items, version).await?;
            Ok(updated)
        } else {
            Ok(notification.clone())
        }
    }

    async fn load(&self) -> Result<(Vec<Notification>, u64)> {
        Ok(fetch(self.store.as_ref(), DocumentHandle::Notifications).await?)
    }

    async fn persist(&self, items: &[Notification], version: u64) -> Result<()> {
        store_record(
            self.store.as_ref(),
            DocumentHandle::Notifications,
            &items,
            version,
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_store::MemoryStore;

    fn repo() -> NotificationRepository {
        NotificationRepository::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_list_empty_document() {
        assert!(repo().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_list_for_user() {
        let repo = repo();
        repo.create(Notification::general("Maintenance", "Tonight"))
            .await
            .unwrap();
        repo.create(Notification::personal("Hi", "Just you", "user-1"))
            .await
            .unwrap();
        repo.create(Notification::personal("Hi", "Someone else", "user-2"))
            .await
            .unwrap();

        let visible = repo.list_for("user-1").await.unwrap();
        assert_eq!(visible.len(), 2);
        assert!(visible.iter().all(|n| n.is_visible_to("user-1")));
    }

    #[tokio::test]
    async fn test_mark_read_tracks_per_user() {
        let repo = repo();
        let n = repo
            .create(Notification::general("Hello", "World"))
            .await
            .unwrap();

        let updated = repo.mark_read(&n.id, "user-1").await.unwrap();
        assert!(updated.is_read_by("user-1"));
        assert!(!updated.is_read_by("user-2"));

        // Idempotent, and persists only once.
        let again = repo.mark_read(&n.id, "user-1").await.unwrap();
        assert_eq!(again.read_by.len(), 1);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_id() {
        let err = repo().mark_read("nope", "user-1").await.unwrap_err();
        assert!(matches!(err, AccountError::NotificationNotFound(_)));
    }
}
