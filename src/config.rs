// Application configuration, loaded from environment variables and CLI flags.

use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::client::ApiSettings;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REGISTER_PATH: &str = "/api/users/register";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the game API, including any proxy path prefix.
    pub api_base_url: String,
    /// Static bearer token sent with every API call.
    pub api_token: String,
    /// Path of the create-user endpoint, relative to the base URL.
    pub register_path: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Transport timeout for API calls.
    pub http_timeout: Duration,
    /// Hex key for sealing hidden user fields; random per process if unset.
    pub seal_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `ADMIN_API_BASE_URL` - game API base URL (default: `http://localhost:8080`)
    /// - `ADMIN_API_TOKEN` - bearer token for the game API (default: empty)
    /// - `ADMIN_REGISTER_PATH` - create-user endpoint path (default: `/api/users/register`)
    /// - `PORT` - HTTP server port (default: 3000)
    /// - `ADMIN_HTTP_TIMEOUT_SECS` - API call timeout in seconds (default: 30)
    /// - `ADMIN_SEAL_KEY` - 32-byte hex key for management page seals (default: random)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--api <URL>` - Override the API base URL
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a config from explicit args and an environment lookup.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = Self::parse_cli_value(args, "--api")
            .or_else(|| env("ADMIN_API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let api_token = env("ADMIN_API_TOKEN").unwrap_or_default();

        let register_path =
            env("ADMIN_REGISTER_PATH").unwrap_or_else(|| DEFAULT_REGISTER_PATH.to_string());

        // Port: CLI flag --port takes precedence, then env var, then default
        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let http_timeout = env("ADMIN_HTTP_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let seal_key = env("ADMIN_SEAL_KEY").filter(|key| !key.trim().is_empty());

        Config {
            api_base_url,
            api_token,
            register_path,
            port,
            http_timeout,
            seal_key,
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.api_base_url.clone(),
            token: self.api_token.clone(),
            register_path: self.register_path.clone(),
            timeout: self.http_timeout,
        }
    }

    /// Short SHA-256 fingerprint of the token, safe to log.
    pub fn token_fingerprint(&self) -> Option<String> {
        if self.api_token.is_empty() {
            return None;
        }
        let digest = Sha256::digest(self.api_token.as_bytes());
        Some(hex::encode(&digest[..4]))
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| match pair {
            [name, value] if name == flag => Some(value.clone()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(args: &[&str], vars: &[(&str, &str)]) -> Config {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_sources(&args, |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&["game-admin"], &[]);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.api_token, "");
        assert_eq!(config.register_path, DEFAULT_REGISTER_PATH);
        assert_eq!(config.port, 3000);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.token_fingerprint(), None);
        assert_eq!(config.seal_key, None);
    }

    #[test]
    fn test_env_values() {
        let config = load(
            &["game-admin"],
            &[
                ("ADMIN_API_BASE_URL", "https://api.example.test/proxy"),
                ("ADMIN_API_TOKEN", "secret"),
                ("ADMIN_REGISTER_PATH", "/api/users"),
                ("PORT", "8081"),
                ("ADMIN_HTTP_TIMEOUT_SECS", "5"),
                ("ADMIN_SEAL_KEY", "00ff"),
            ],
        );
        assert_eq!(config.api_base_url, "https://api.example.test/proxy");
        assert_eq!(config.register_path, "/api/users");
        assert_eq!(config.port, 8081);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.api_settings().token, "secret");
        assert_eq!(config.seal_key.as_deref(), Some("00ff"));
    }

    #[test]
    fn test_cli_overrides_env() {
        let config = load(
            &["game-admin", "--port", "9000", "--api", "http://cli.test"],
            &[("PORT", "8081"), ("ADMIN_API_BASE_URL", "http://env.test")],
        );
        assert_eq!(config.port, 9000);
        assert_eq!(config.api_base_url, "http://cli.test");
    }

    #[test]
    fn test_invalid_port_falls_back() {
        let config = load(&["game-admin", "--port", "abc"], &[("PORT", "nope")]);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_token_fingerprint_hides_token() {
        let config = load(&["game-admin"], &[("ADMIN_API_TOKEN", "secret")]);
        let fp = config.token_fingerprint().unwrap();
        assert_eq!(fp.len(), 8);
        assert!(!fp.contains("secret"));
    }
}
