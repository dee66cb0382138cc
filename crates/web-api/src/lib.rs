pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use auth::{AuthUser, TokenSigner};
pub use error::ApiError;
pub use server::ApiServer;
pub use state::AppState;
