//! User repository over the users document.
//!
//! Persistence is whole-document read-modify-write: every mutation fetches
//! the full user list, splices it in memory, and writes the full list back.
//! The version token read at the start of the cycle guards the write, so a
//! concurrent writer surfaces as [`StoreError::Conflict`] instead of a
//! silent lost update.
//!
//! [`StoreError::Conflict`]: blockbridge_store::StoreError::Conflict

use crate::error::{AccountError, Result};
use blockbridge_core::models::user::tier_in_range;
use blockbridge_core::{User, WalletEntry};
use blockbridge_store::{fetch, store_record, DocumentHandle, DocumentStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shape of the users document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct UsersDocument {
    #[serde(default)]
    users: Vec<User>,
}

/// CRUD over the user list.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    /// Creates a new repository instance.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns all users; an unwritten document reads as an empty list.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn list(&self) -> Result<Vec<User>> {
        let (doc, _) = self.load().await?;
        Ok(doc.users)
    }

    /// Finds a user by login email (case-insensitive).
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let (doc, _) = self.load().await?;
        Ok(doc
            .users
            .into_iter()
            .find(|u| u.email.eq_ignore_ascii_case(email)))
    }

    /// Finds a user by id.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let (doc, _) = self.load().await?;
        Ok(doc.users.into_iter().find(|u| u.id == id))
    }

    /// Appends a new user and persists the whole list.
    ///
    /// # Errors
    /// Returns [`AccountError::DuplicateEmail`] if the email is already
    /// registered, or a store error.
    pub async fn insert(&self, user: User) -> Result<User> {
        let (mut doc, version) = self.load().await?;

        if doc
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(AccountError::DuplicateEmail(user.email));
        }

        doc.users.push(user.clone());
        self.persist(&doc, version).await?;

        tracing::info!(user_id = %user.id, email = %user.email, "user created");
        Ok(user)
    }

    /// Locates a user by id, applies `patch`, and persists the whole list.
    ///
    /// Returns the updated record.
    ///
    /// # Errors
    /// Returns [`AccountError::NotFound`] if no user has the id, or a store
    /// error.
    pub async fn update_in_place<F>(&self, id: &str, patch: F) -> Result<User>
    where
        F: FnOnce(&mut User),
    {
        let (mut doc, version) = self.load().await?;

        let user = doc
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        patch(user);
        let updated = user.clone();

        self.persist(&doc, version).await?;
        Ok(updated)
    }

    /// Replaces a user's wallet collection.
    ///
    /// # Errors
    /// Returns [`AccountError::NotFound`] or a store error.
    pub async fn set_wallets(&self, id: &str, wallets: Vec<WalletEntry>) -> Result<User> {
        self.update_in_place(id, |u| u.wallets = wallets).await
    }

    /// Sets a user's access tier.
    ///
    /// # Errors
    /// Returns [`AccountError::InvalidTier`] for a tier outside 1..=12,
    /// [`AccountError::NotFound`], or a store error.
    pub async fn set_tier(&self, id: &str, tier: u8) -> Result<User> {
        if !tier_in_range(tier) {
            return Err(AccountError::InvalidTier(tier));
        }
        let updated = self.update_in_place(id, |u| u.tier = tier).await?;
        tracing::info!(user_id = %id, tier, "tier updated");
        Ok(updated)
    }

    async fn load(&self) -> Result<(UsersDocument, u64)> {
        Ok(fetch(self.store.as_ref(), DocumentHandle::Users).await?)
    }

    async fn persist(&self, doc: &UsersDocument, version: u64) -> Result<()> {
        store_record(self.store.as_ref(), DocumentHandle::Users, doc, version).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new()))
    }

    fn sample_user(email: &str) -> User {
        User::new(email, Some("sample".to_string()), "hash")
    }

    #[tokio::test]
    async fn test_list_empty_document() {
        assert!(repo().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_find_by_email() {
        let repo = repo();
        repo.insert(sample_user("a@x.com")).await.unwrap();

        let found = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(found.email, "a@x.com");

        // Lookup is case-insensitive.
        assert!(repo.find_by_email("A@X.COM").await.unwrap().is_some());
        assert!(repo.find_by_email("b@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_duplicate_email_fails() {
        let repo = repo();
        repo.insert(sample_user("a@x.com")).await.unwrap();

        let err = repo.insert(sample_user("a@x.com")).await.unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail(_)));

        // The failed attempt left the list unchanged.
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_duplicate_differs_only_in_case() {
        let repo = repo();
        repo.insert(sample_user("a@x.com")).await.unwrap();

        let err = repo.insert(sample_user("A@x.com")).await.unwrap_err();
        assert!(matches!(err, AccountError::DuplicateEmail(_)));
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let repo = repo();
        let user = repo.insert(sample_user("a@x.com")).await.unwrap();

        let updated = repo
            .update_in_place(&user.id, |u| u.username = Some("renamed".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.username.as_deref(), Some("renamed"));

        let reloaded = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.username.as_deref(), Some("renamed"));
    }

    #[tokio::test]
    async fn test_update_missing_user_fails() {
        let err = repo()
            .update_in_place("nope", |u| u.tier = 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_set_wallets() {
        let repo = repo();
        let user = repo.insert(sample_user("a@x.com")).await.unwrap();

        let wallets = vec![WalletEntry::new("BTC", dec!(1), dec!(40000))];
        let updated = repo.set_wallets(&user.id, wallets).await.unwrap();

        assert_eq!(updated.wallets.len(), 1);
        assert_eq!(updated.wallets[0].balance, dec!(1));
    }

    #[tokio::test]
    async fn test_set_tier_bounds() {
        let repo = repo();
        let user = repo.insert(sample_user("a@x.com")).await.unwrap();

        assert_eq!(repo.set_tier(&user.id, 12).await.unwrap().tier, 12);

        let err = repo.set_tier(&user.id, 13).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidTier(13)));

        let err = repo.set_tier(&user.id, 0).await.unwrap_err();
        assert!(matches!(err, AccountError::InvalidTier(0)));
    }
}
