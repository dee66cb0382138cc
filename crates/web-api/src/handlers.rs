//! Request handlers for the BlockBridge API.

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use blockbridge_accounts::SessionGuard;
use blockbridge_core::{
    Message, Notification, Role, TransferRequest, UserProfile, WalletEntry,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn require_admin(user: &UserProfile) -> Result<(), ApiError> {
    if SessionGuard::authorize(user, Role::Admin) {
        Ok(())
    } else {
        Err(ApiError::forbidden())
    }
}

// =============================================================================
// Session
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Registers a new account and signs the caller in.
///
/// # Errors
/// Returns 409 if the email is already registered.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let user = state
        .guard
        .register(&req.email, req.username, &req.password)
        .await?;
    let token = state.tokens.issue(&user.id)?;

    Ok((StatusCode::CREATED, Json(SessionResponse { token, user })))
}

/// Exchanges credentials for a session token.
///
/// # Errors
/// Returns 401 on bad credentials, without revealing which field was wrong.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = state.guard.authenticate(&req.email, &req.password).await?;
    let token = state.tokens.issue(&user.id)?;

    Ok(Json(SessionResponse { token, user }))
}

/// Returns the caller's own profile.
pub async fn me(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user)
}

// =============================================================================
// Users (admin)
// =============================================================================

#[derive(Deserialize)]
pub struct UpdateWalletsRequest {
    pub wallets: Vec<WalletEntry>,
}

#[derive(Deserialize)]
pub struct UpdateTierRequest {
    pub tier: u8,
}

/// Lists all accounts (sanitized).
///
/// # Errors
/// Returns 403 for non-admin callers.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<UserProfile>>, ApiError> {
    require_admin(&caller)?;
    let users = state.users.list().await?;
    Ok(Json(users.iter().map(|u| u.profile()).collect()))
}

/// Replaces a user's wallet collection.
///
/// # Errors
/// Returns 403 for non-admin callers, 422 for a negative balance, 404 for
/// an unknown user.
pub async fn update_wallets(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateWalletsRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    require_admin(&caller)?;

    if req.wallets.iter().any(|w| w.balance < Decimal::ZERO) {
        return Err(ApiError::unprocessable("wallet balance cannot be negative"));
    }

    let user = state.users.set_wallets(&user_id, req.wallets).await?;
    Ok(Json(user.profile()))
}

/// Sets a user's access tier.
///
/// # Errors
/// Returns 403 for non-admin callers, 422 for a tier outside 1..=12, 404
/// for an unknown user.
pub async fn update_tier(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<String>,
    Json(req): Json<UpdateTierRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    require_admin(&caller)?;
    let user = state.users.set_tier(&user_id, req.tier).await?;
    Ok(Json(user.profile()))
}

// =============================================================================
// Funding requests
// =============================================================================

#[derive(Deserialize)]
pub struct SubmitTransferRequest {
    pub asset: String,
    pub amount: Decimal,
    pub detail: Option<String>,
}

/// Submits a funding request for the caller.
///
/// # Errors
/// Returns 422 for a non-positive amount.
pub async fn submit_funding(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(req): Json<SubmitTransferRequest>,
) -> Result<(StatusCode, Json<TransferRequest>), ApiError> {
    let request = state
        .engine
        .funding()
        .submit(&caller.id, &req.asset, req.amount, req.detail)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Lists funding requests: all of them for admins, the caller's own
/// otherwise.
pub async fn list_funding(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<TransferRequest>>, ApiError> {
    let requests = if caller.is_admin() {
        state.engine.funding().list().await?
    } else {
        state.engine.funding().list_for(&caller.id).await?
    };
    Ok(Json(requests))
}

/// Approves a funding request, crediting the user's wallet.
///
/// # Errors
/// Returns 403 for non-admin callers, 409 if the request is already
/// resolved, 500 if the credit was applied but the status write failed.
pub async fn approve_funding(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<TransferRequest>, ApiError> {
    require_admin(&caller)?;
    Ok(Json(state.engine.approve_funding(&request_id).await?))
}

/// Declines a funding request. No wallet effect.
///
/// # Errors
/// Returns 403 for non-admin callers, 409 if the request is already
/// resolved.
pub async fn decline_funding(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<TransferRequest>, ApiError> {
    require_admin(&caller)?;
    Ok(Json(state.engine.decline_funding(&request_id).await?))
}

// =============================================================================
// Withdrawal requests
// =============================================================================

/// Submits a withdrawal request for the caller.
///
/// # Errors
/// Returns 422 for a non-positive amount.
pub async fn submit_withdrawal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(req): Json<SubmitTransferRequest>,
) -> Result<(StatusCode, Json<TransferRequest>), ApiError> {
    let request = state
        .engine
        .withdrawals()
        .submit(&caller.id, &req.asset, req.amount, req.detail)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// Lists withdrawal requests: all of them for admins, the caller's own
/// otherwise.
pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<TransferRequest>>, ApiError> {
    let requests = if caller.is_admin() {
        state.engine.withdrawals().list().await?
    } else {
        state.engine.withdrawals().list_for(&caller.id).await?
    };
    Ok(Json(requests))
}

/// Approves a withdrawal request, debiting the user's wallet.
///
/// # Errors
/// Returns 403 for non-admin callers, 409 if the request is already
/// resolved, 422 if the debit would overdraw the wallet (nothing is
/// applied), 500 if the debit was applied but the status write failed.
pub async fn approve_withdrawal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<TransferRequest>, ApiError> {
    require_admin(&caller)?;
    Ok(Json(state.engine.approve_withdrawal(&request_id).await?))
}

/// Declines a withdrawal request. No wallet effect.
///
/// # Errors
/// Returns 403 for non-admin callers, 409 if the request is already
/// resolved.
pub async fn decline_withdrawal(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(request_id): Path<String>,
) -> Result<Json<TransferRequest>, ApiError> {
    require_admin(&caller)?;
    Ok(Json(state.engine.decline_withdrawal(&request_id).await?))
}

// =============================================================================
// Notifications
// =============================================================================

#[derive(Deserialize)]
pub struct CreateNotificationRequest {
    pub title: String,
    pub message: String,
    /// "general" or "personal".
    pub kind: String,
    pub recipient_id: Option<String>,
}

/// Lists the notifications visible to the caller, newest first.
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.notifications.list_for(&caller.id).await?))
}

/// Creates a broadcast or personal notification.
///
/// # Errors
/// Returns 403 for non-admin callers, 422 for an unknown kind or a personal
/// notification without a recipient, 404 for an unknown recipient.
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(req): Json<CreateNotificationRequest>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    require_admin(&caller)?;

    let notification = match req.kind.as_str() {
        "general" => Notification::general(req.title, req.message),
        "personal" => {
            let recipient_id = req
                .recipient_id
                .ok_or_else(|| ApiError::unprocessable("personal notification needs a recipient"))?;
            // The recipient must exist.
            state
                .users
                .find_by_id(&recipient_id)
                .await?
                .ok_or_else(|| {
                    ApiError::new(StatusCode::NOT_FOUND, format!("user not found: {recipient_id}"))
                })?;
            Notification::personal(req.title, req.message, recipient_id)
        }
        other => {
            return Err(ApiError::unprocessable(format!(
                "unknown notification kind: {other}"
            )))
        }
    };

    let created = state.notifications.create(notification).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Marks a notification read for the caller. Idempotent.
///
/// # Errors
/// Returns 404 for an unknown notification.
pub async fn mark_notification_read(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(notification_id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(
        state
            .notifications
            .mark_read(&notification_id, &caller.id)
            .await?,
    ))
}

// =============================================================================
// Support messages
// =============================================================================

#[derive(Deserialize)]
pub struct SendMessageRequest {
    pub recipient: String,
    pub content: String,
}

/// Returns the caller's conversation with `peer`, oldest first.
pub async fn conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Path(peer): Path<String>,
) -> Result<Json<Vec<Message>>, ApiError> {
    Ok(Json(state.messages.conversation(&caller.id, &peer).await?))
}

/// Sends a support-chat message from the caller.
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    AuthUser(caller): AuthUser,
    Json(req): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    let message = state
        .messages
        .send(&caller.id, &req.recipient, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Marks a message as read.
///
/// # Errors
/// Returns 404 for an unknown message.
pub async fn mark_message_read(
    State(state): State<Arc<AppState>>,
    AuthUser(_caller): AuthUser,
    Path(message_id): Path<String>,
) -> Result<Json<Message>, ApiError> {
    Ok(Json(state.messages.mark_read(&message_id).await?))
}
