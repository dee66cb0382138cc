pub mod error;
pub mod guard;
pub mod messages;
pub mod notifications;
pub mod repository;

pub use error::{AccountError, Result};
pub use guard::SessionGuard;
pub use messages::MessageRepository;
pub use notifications::NotificationRepository;
pub use repository::UserRepository;
