//! Domain models persisted through the document store.

pub mod message;
pub mod notification;
pub mod request;
pub mod user;
pub mod wallet;

pub use message::Message;
pub use notification::{Notification, NotificationKind};
pub use request::{RequestStatus, TransferRequest};
pub use user::{tier_in_range, AccountStatus, Role, User, UserProfile, TIER_MAX, TIER_MIN};
pub use wallet::{
    asset_display_name, default_wallets, is_reference_asset, WalletEntry, REFERENCE_ASSETS,
};
