//! User account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wallet::{default_wallets, WalletEntry};

/// Lowest assignable access tier.
pub const TIER_MIN: u8 = 1;

/// Highest assignable access tier.
pub const TIER_MAX: u8 = 12;

/// Returns true if `tier` is within the assignable range.
#[must_use]
pub fn tier_in_range(tier: u8) -> bool {
    (TIER_MIN..=TIER_MAX).contains(&tier)
}

/// Account role. Admin implicitly satisfies any User-scope check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Standard account.
    User,
    /// Platform operator.
    Admin,
}

impl Role {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Account lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Account is usable.
    Active,
    /// Account has been disabled.
    Inactive,
    /// Account awaits activation.
    Pending,
}

impl AccountStatus {
    /// Returns the string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Pending => "Pending",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "pending" => Some(Self::Pending),
            _ => None,
        }
    }
}

/// A user account as persisted in the users document.
///
/// `password_hash` is an argon2 PHC string. It stays inside the repository
/// boundary; anything returned to callers goes through [`User::profile`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Unique login key.
    pub email: String,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Salted argon2 hash of the login secret.
    pub password_hash: String,
    /// Account role.
    pub role: Role,
    /// Access/benefit level, 1..=12.
    pub tier: u8,
    /// Lifecycle status.
    pub account_status: AccountStatus,
    /// Asset balances owned by this account.
    pub wallets: Vec<WalletEntry>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new account with the default role, tier, status, and
    /// welcome wallet set.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: Option<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            username,
            password_hash: password_hash.into(),
            role: Role::User,
            tier: TIER_MIN,
            account_status: AccountStatus::Active,
            wallets: default_wallets(),
            created_at: Utc::now(),
        }
    }

    /// Returns true for Admin accounts.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The outward-facing view of this account, with the credential hash
    /// stripped.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
            username: self.username.clone(),
            role: self.role,
            tier: self.tier,
            account_status: self.account_status,
            wallets: self.wallets.clone(),
            created_at: self.created_at,
        }
    }
}

/// Sanitized user view returned outside the repository boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique identifier.
    pub id: String,
    /// Login email.
    pub email: String,
    /// Optional display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Account role.
    pub role: Role,
    /// Access/benefit level.
    pub tier: u8,
    /// Lifecycle status.
    pub account_status: AccountStatus,
    /// Asset balances.
    pub wallets: Vec<WalletEntry>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Returns true for Admin accounts.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns true iff this account may act at `required` scope.
    ///
    /// Admin satisfies any check; a User satisfies only User-scope checks.
    #[must_use]
    pub fn authorized(&self, required: Role) -> bool {
        self.role == required || self.role == Role::Admin
    }
}
