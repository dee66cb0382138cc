//! Shared application state for the API.

use crate::auth::TokenSigner;
use blockbridge_accounts::{
    MessageRepository, NotificationRepository, SessionGuard, UserRepository,
};
use blockbridge_core::AuthConfig;
use blockbridge_store::DocumentStore;
use blockbridge_workflow::{RequestRepository, WorkflowEngine};
use std::sync::Arc;

/// Everything the handlers need, wired once at startup.
pub struct AppState {
    pub guard: SessionGuard,
    pub users: UserRepository,
    pub notifications: NotificationRepository,
    pub messages: MessageRepository,
    pub engine: WorkflowEngine,
    pub tokens: TokenSigner,
}

impl AppState {
    /// Wires repositories, guard, and engine over one document store.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, auth: &AuthConfig) -> Self {
        let users = UserRepository::new(store.clone());
        let notifications = NotificationRepository::new(store.clone());
        let messages = MessageRepository::new(store.clone());
        let guard = SessionGuard::new(users.clone(), notifications.clone());
        let engine = WorkflowEngine::new(
            users.clone(),
            RequestRepository::funding(store.clone()),
            RequestRepository::withdrawals(store),
        );

        Self {
            guard,
            users,
            notifications,
            messages,
            engine,
            tokens: TokenSigner::new(auth),
        }
    }
}
