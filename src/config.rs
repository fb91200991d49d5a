use std::env;

const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_CONNECT_TIMEOUT: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT: u64 = 30;

/// Client configuration
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Root URL of the API server
    pub api_url: String,

    /// Path prefix all endpoints are relative to
    pub api_prefix: String,

    /// Connect timeout in seconds
    pub connect_timeout: u64,

    /// Request timeout in seconds
    pub request_timeout: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Load configuration from the environment with priority: ENV > defaults
    pub fn from_env() -> Self {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        Self {
            api_url: env::var("API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| DEFAULT_API_PREFIX.to_string()),

            connect_timeout: env::var("HTTP_CONNECT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT),

            request_timeout: env::var("HTTP_REQUEST_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        }
    }

    /// Full base URL every endpoint path is appended to
    pub fn base_url(&self) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), self.api_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.api_prefix, "/api/v1");
        assert_eq!(config.connect_timeout, 10);
        assert_eq!(config.request_timeout, 30);
    }

    #[test]
    fn test_base_url_joins_prefix() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8080/api/v1");
    }

    #[test]
    fn test_base_url_trims_trailing_slash() {
        let config = ClientConfig {
            api_url: "https://api.example.com/".to_string(),
            ..ClientConfig::default()
        };
        assert_eq!(config.base_url(), "https://api.example.com/api/v1");
    }
}
