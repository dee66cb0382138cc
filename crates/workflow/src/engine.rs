//! Approval engine for funding and withdrawal requests.
//!
//! State machine per request: `Pending --approve--> Approved`,
//! `Pending --decline--> Declined`; both transitions terminal. The ledger
//! mutation happens exactly on the approve transition.
//!
//! Approval is two writes (wallet, then status) with no transaction around
//! them. A failure between the two surfaces as
//! [`WorkflowError::PartialApproval`] so an operator can reconcile, rather
//! than being silently swallowed.

use crate::error::{Result, WorkflowError};
use crate::requests::RequestRepository;
use blockbridge_accounts::{AccountError, UserRepository};
use blockbridge_core::{apply_delta, RequestStatus, TransferRequest, User};
use rust_decimal::Decimal;

/// Resolves funding and withdrawal requests against user wallets.
#[derive(Clone)]
pub struct WorkflowEngine {
    users: UserRepository,
    funding: RequestRepository,
    withdrawals: RequestRepository,
}

impl WorkflowEngine {
    /// Creates a new engine.
    #[must_use]
    pub fn new(
        users: UserRepository,
        funding: RequestRepository,
        withdrawals: RequestRepository,
    ) -> Self {
        Self {
            users,
            funding,
            withdrawals,
        }
    }

    /// The funding-request repository.
    #[must_use]
    pub fn funding(&self) -> &RequestRepository {
        &self.funding
    }

    /// The withdrawal-request repository.
    #[must_use]
    pub fn withdrawals(&self) -> &RequestRepository {
        &self.withdrawals
    }

    /// Approves a funding request, crediting the requested asset.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidStateTransition`] if the request is
    /// not Pending, [`WorkflowError::PartialApproval`] if the credit was
    /// applied but the status write failed, or an account/store error.
    pub async fn approve_funding(&self, request_id: &str) -> Result<TransferRequest> {
        let request = self.funding.find(request_id).await?;
        self.apply_approval(&self.funding, &request, request.amount)
            .await
    }

    /// Approves a withdrawal request, debiting the requested asset.
    ///
    /// # Errors
    /// Returns [`LedgerError::InsufficientFunds`] (before anything is
    /// persisted) if the debit would overdraw the wallet; otherwise the same
    /// errors as [`Self::approve_funding`].
    ///
    /// [`LedgerError::InsufficientFunds`]: blockbridge_core::LedgerError::InsufficientFunds
    pub async fn approve_withdrawal(&self, request_id: &str) -> Result<TransferRequest> {
        let request = self.withdrawals.find(request_id).await?;
        self.apply_approval(&self.withdrawals, &request, -request.amount)
            .await
    }

    /// Declines a funding request. No ledger effect.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidStateTransition`] if the request is
    /// not Pending, or a store error.
    pub async fn decline_funding(&self, request_id: &str) -> Result<TransferRequest> {
        let declined = self
            .funding
            .resolve(request_id, RequestStatus::Declined)
            .await?;
        tracing::info!(request_id = %request_id, "funding request declined");
        Ok(declined)
    }

    /// Declines a withdrawal request. No ledger effect.
    ///
    /// # Errors
    /// Returns [`WorkflowError::InvalidStateTransition`] if the request is
    /// not Pending, or a store error.
    pub async fn decline_withdrawal(&self, request_id: &str) -> Result<TransferRequest> {
        let declined = self
            .withdrawals
            .resolve(request_id, RequestStatus::Declined)
            .await?;
        tracing::info!(request_id = %request_id, "withdrawal request declined");
        Ok(declined)
    }

    /// Shared approve path: ledger mutation, wallet persist, status persist.
    async fn apply_approval(
        &self,
        repo: &RequestRepository,
        request: &TransferRequest,
        delta: Decimal,
    ) -> Result<TransferRequest> {
        if !request.is_pending() {
            return Err(WorkflowError::invalid_transition(
                &request.id,
                request.status,
            ));
        }

        let user = self.load_user(&request.user_id).await?;

        // Ledger rejection (overdraw) aborts before anything is persisted.
        let wallets = apply_delta(&user.wallets, &request.asset, delta)?;
        self.users.set_wallets(&user.id, wallets).await?;

        match repo.resolve(&request.id, RequestStatus::Approved).await {
            Ok(approved) => {
                tracing::info!(
                    request_id = %approved.id,
                    user_id = %user.id,
                    asset = %request.asset,
                    %delta,
                    "request approved"
                );
                Ok(approved)
            }
            Err(source) => {
                tracing::warn!(
                    request_id = %request.id,
                    user_id = %user.id,
                    error = %source,
                    "wallet updated but status write failed"
                );
                Err(WorkflowError::PartialApproval {
                    request_id: request.id.clone(),
                    user_id: user.id.clone(),
                    source: Box::new(source),
                })
            }
        }
    }

    async fn load_user(&self, user_id: &str) -> Result<User> {
        Ok(self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AccountError::NotFound(user_id.to_string()))?)
    }
}
