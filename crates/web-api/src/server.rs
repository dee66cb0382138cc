use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    state: Arc<AppState>,
}

impl ApiServer {
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/api/register", post(handlers::register))
            .route("/api/login", post(handlers::login))
            .route("/api/me", get(handlers::me))
            .route("/api/users", get(handlers::list_users))
            .route("/api/users/:id/wallets", patch(handlers::update_wallets))
            .route("/api/users/:id/tier", patch(handlers::update_tier))
            .route(
                "/api/funding-requests",
                get(handlers::list_funding).post(handlers::submit_funding),
            )
            .route(
                "/api/funding-requests/:id/approve",
                post(handlers::approve_funding),
            )
            .route(
                "/api/funding-requests/:id/decline",
                post(handlers::decline_funding),
            )
            .route(
                "/api/withdrawal-requests",
                get(handlers::list_withdrawals).post(handlers::submit_withdrawal),
            )
            .route(
                "/api/withdrawal-requests/:id/approve",
                post(handlers::approve_withdrawal),
            )
            .route(
                "/api/withdrawal-requests/:id/decline",
                post(handlers::decline_withdrawal),
            )
            .route(
                "/api/notifications",
                get(handlers::list_notifications).post(handlers::create_notification),
            )
            .route(
                "/api/notifications/:id/read",
                post(handlers::mark_notification_read),
            )
            .route("/api/messages", post(handlers::send_message))
            .route("/api/messages/:peer", get(handlers::conversation))
            .route("/api/messages/:id/read", post(handlers::mark_message_read))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Web API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
