//! Transfer request repository.
//!
//! Funding and withdrawal requests live in separate documents but share one
//! shape and lifecycle, so a single repository serves both, parameterized by
//! document handle. Requests are never deleted; resolved ones remain as the
//! audit trail.

use crate::error::{Result, WorkflowError};
use blockbridge_core::{RequestStatus, TransferRequest};
use blockbridge_store::{fetch, store_record, DocumentHandle, DocumentStore};
use rust_decimal::Decimal;
use std::sync::Arc;

/// CRUD over one transfer-request document.
#[derive(Clone)]
pub struct RequestRepository {
    store: Arc<dyn DocumentStore>,
    handle: DocumentHandle,
}

impl RequestRepository {
    /// Repository over the funding-requests document.
    #[must_use]
    pub fn funding(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            handle: DocumentHandle::FundingRequests,
        }
    }

    /// Repository over the withdrawal-requests document.
    #[must_use]
    pub fn withdrawals(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            handle: DocumentHandle::WithdrawalRequests,
        }
    }

    /// Returns every request (admin view), newest first.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn list(&self) -> Result<Vec<TransferRequest>> {
        let (mut items, _) = self.load().await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Returns one user's requests, newest first.
    ///
    /// # Errors
    /// Returns an error if the store operation fails.
    pub async fn list_for(&self, user_id: &str) -> Result<Vec<TransferRequest>> {
        let mut items = self.list().await?;
        items.retain(|r| r.user_id == user_id);
        Ok(items)
    }

    /// Finds a request by id.
    ///
    /// # Errors
    /// Returns [`WorkflowError::RequestNotFound`] if the id is unknown, or a
    /// store error.
    pub async fn find(&self, id: &str) -> Result<TransferRequest> {
        let (items, _) = self.load().await?;
        items
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| WorkflowError::RequestNotFound(id.to_string()))
    }

    /// Creates a Pending request.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidAmount`] for a non-positive amount,
    /// or a store error.
    pub async fn submit(
        &self,
        user_id: &str,
        asset: &str,
        amount: Decimal,
        detail: Option<String>,
    ) -> Result<TransferRequest> {
        if amount <= Decimal::ZERO {
            return Err(WorkflowError::InvalidAmount(amount));
        }

        let (mut items, version) = self.load().await?;
        let request = TransferRequest::new(user_id, asset, amount, detail);
        items.push(request.clone());
        self.persist(&items, version).await?;

        tracing::info!(
            request_id = %request.id,
            user_id = %user_id,
            document = %self.handle,
            %amount,
            "request submitted"
        );
        Ok(request)
    }

    /// Moves a Pending request to a terminal status.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidStateTransition`] if the request was
    /// already resolved, [`WorkflowError::RequestNotFound`], or a store
    /// error.
    pub async fn resolve(&self, id: &str, status: RequestStatus) -> Result<TransferRequest> {
        let (mut items, version) = self.load().await?;

        let request = items
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| WorkflowError::RequestNotFound(id.to_string()))?;

        if !request.is_pending() {
            return Err(WorkflowError::invalid_transition(id, request.status));
        }

        request.status = status;
        let resolved = request.clone();
        self.persist(&items, version).await?;
        Ok(resolved)
    }

    async fn load(&self) -> Result<(Vec<TransferRequest>, u64)> {
        Ok(fetch(self.store.as_ref(), self.handle).await?)
    }

    async fn persist(&self, items: &[TransferRequest], version: u64) -> Result<()> {
        store_record(self.store.as_ref(), self.handle, &items, version).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockbridge_store::MemoryStore;
    use rust_decimal_macros::dec;

    fn repo() -> RequestRepository {
        RequestRepository::funding(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_submit_and_list_for_user() {
        let repo = repo();
        repo.submit("user-1", "USDC", dec!(50), None).await.unwrap();
        repo.submit("user-2", "USDC", dec!(10), None).await.unwrap();

        let mine = repo.list_for("user-1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].amount, dec!(50));
    }

    #[tokio::test]
    async fn test_submit_rejects_non_positive_amounts() {
        let repo = repo();
        for amount in [dec!(0), dec!(-1)] {
            let err = repo.submit("user-1", "USDC", amount, None).await.unwrap_err();
            assert!(matches!(err, WorkflowError::InvalidAmount(_)));
        }
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_pending_request() {
        let repo = repo();
        let req = repo.submit("user-1", "USDC", dec!(50), None).await.unwrap();

        let resolved = repo.resolve(&req.id, RequestStatus::Declined).await.unwrap();
        assert_eq!(resolved.status, RequestStatus::Declined);
    }

    #[tokio::test]
    async fn test_resolve_is_terminal() {
        let repo = repo();
        let req = repo.submit("user-1", "USDC", dec!(50), None).await.unwrap();
        repo.resolve(&req.id, RequestStatus::Approved).await.unwrap();

        let err = repo
            .resolve(&req.id, RequestStatus::Declined)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::InvalidStateTransition {
                status: RequestStatus::Approved,
                ..
            }
        ));

        // Status unchanged by the failed transition.
        let found = repo.find(&req.id).await.unwrap();
        assert_eq!(found.status, RequestStatus::Approved);
    }

    #[tokio::test]
    async fn test_resolve_unknown_id() {
        let err = repo()
            .resolve("nope", RequestStatus::Approved)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::RequestNotFound(_)));
    }

    #[tokio::test]
    async fn test_funding_and_withdrawals_are_separate_documents() {
        let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
        let funding = RequestRepository::funding(store.clone());
        let withdrawals = RequestRepository::withdrawals(store);

        funding.submit("user-1", "USDC", dec!(50), None).await.unwrap();
        assert!(withdrawals.list().await.unwrap().is_empty());
    }
}
