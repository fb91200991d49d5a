// CareLink Client - library root
// Authenticated HTTP transport and credential lifecycle for the CareLink API

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod navigator;
pub mod storage;

pub use auth::{AuthService, SessionStore, TokenRefresher};
pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
