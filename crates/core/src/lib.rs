pub mod config;
pub mod config_loader;
pub mod ledger;
pub mod models;

pub use config::{AppConfig, AuthConfig, BinConfig, ServerConfig, StoreConfig};
pub use config_loader::ConfigLoader;
pub use ledger::{apply_delta, balance_of, total_value_usd, LedgerError};
pub use models::{
    AccountStatus, Message, Notification, NotificationKind, RequestStatus, Role, TransferRequest,
    User, UserProfile, WalletEntry,
};
