//! Session and authorization guard.
//!
//! Resolves credentials to a sanitized user profile and gates role-scoped
//! operations. Secrets are stored and compared as salted argon2 hashes
//! only; the raw secret never leaves this module.

use crate::error::{AccountError, Result};
use crate::notifications::NotificationRepository;
use crate::repository::UserRepository;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use blockbridge_core::{Notification, Role, User, UserProfile};

/// Title of the registration welcome notification.
const WELCOME_TITLE: &str = "Welcome to BlockBridge";

/// Body of the registration welcome notification.
const WELCOME_MESSAGE: &str =
    "Your account is ready. A promotional credit has been added to your wallet.";

/// Authentication and authorization front door.
#[derive(Clone)]
pub struct SessionGuard {
    users: UserRepository,
    notifications: NotificationRepository,
}

impl SessionGuard {
    /// Creates a new guard.
    #[must_use]
    pub fn new(users: UserRepository, notifications: NotificationRepository) -> Self {
        Self {
            users,
            notifications,
        }
    }

    /// Registers a new account with default role, tier, and wallet set.
    ///
    /// Emits a system welcome notification; a failure there is logged and
    /// does not fail the registration.
    ///
    /// # Errors
    /// Returns [`AccountError::DuplicateEmail`] if the email is taken, or a
    /// hashing/store error.
    pub async fn register(
        &self,
        email: &str,
        username: Option<String>,
        secret: &str,
    ) -> Result<UserProfile> {
        let hash = hash_secret(secret)?;
        let user = self.users.insert(User::new(email, username, hash)).await?;

        if let Err(err) = self
            .notifications
            .create(Notification::system(WELCOME_TITLE, WELCOME_MESSAGE, &user.id))
            .await
        {
            tracing::warn!(user_id = %user.id, error = %err, "welcome notification failed");
        }

        Ok(user.profile())
    }

    /// Resolves credentials to a sanitized user.
    ///
    /// # Errors
    /// Returns [`AccountError::InvalidCredentials`] on an unknown email or a
    /// wrong secret; the two cases are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, secret: &str) -> Result<UserProfile> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AccountError::InvalidCredentials)?;

        if !verify_secret(secret, &user.password_hash) {
            return Err(AccountError::InvalidCredentials);
        }

        tracing::debug!(user_id = %user.id, "authenticated");
        Ok(user.profile())
    }

    /// Returns true iff `user` may act at `required` scope. Admin satisfies
    /// any check.
    #[must_use]
    pub fn authorize(user: &UserProfile, required: Role) -> bool {
        user.authorized(required)
    }

    /// Provisions (or re-provisions) the admin account with an
    /// operator-supplied credential.
    ///
    /// An existing account with the email is upgraded to Admin and its
    /// credential replaced; otherwise a fresh Admin account is created.
    ///
    /// # Errors
    /// Returns a hashing or store error.
    pub async fn seed_admin(
        &self,
        email: &str,
        username: Option<String>,
        secret: &str,
    ) -> Result<UserProfile> {
        let hash = hash_secret(secret)?;

        let user = match self.users.find_by_email(email).await? {
            Some(existing) => {
                self.users
                    .update_in_place(&existing.id, |u| {
                        u.role = Role::Admin;
                        u.password_hash = hash;
                    })
                    .await?
            }
            None => {
                let mut user = User::new(email, username, hash);
                user.role = Role::Admin;
                self.users.insert(user).await?
            }
        };

        tracing::info!(user_id = %user.id, "admin account provisioned");
        Ok(user.profile())
    }
}

fn hash_secret(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::PasswordHash(e.to_string()))
}

fn verify_secret(secret: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok()
}
