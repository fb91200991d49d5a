// Authentication module
// Credential lifecycle, session persistence and the refresh exchange

pub mod types;

mod refresh;
mod service;
mod session;

pub use refresh::TokenRefresher;
pub use service::AuthService;
pub use session::SessionStore;
