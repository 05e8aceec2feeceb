//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PROFILE_HUB_BASE_URL` - Public URL of the app (OAuth redirect base)
//! - `FIREBASE_PROJECT_ID` - Firebase / Google Cloud project identifier
//! - `FIREBASE_API_KEY` - Firebase web API key
//! - `GOOGLE_CLIENT_ID` - Google OAuth client ID
//! - `GOOGLE_CLIENT_SECRET` - Google OAuth client secret
//! - Service account key file (see `GOOGLE_CREDENTIALS_PATH`)
//!
//! ## Optional
//! - `PROFILE_HUB_HOST` - Bind address (default: 127.0.0.1)
//! - `PROFILE_HUB_PORT` - Listen port (default: 3000)
//! - `FIREBASE_COLLECTION` - Profile collection (default: users)
//! - `GOOGLE_CREDENTIALS_PATH` - Service account key file (default: serviceAccountKey.json)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use secrecy::SecretString;
use thiserror::Error;

use crate::store::firestore::ServiceAccountKey;

const DEFAULT_CREDENTIALS_PATH: &str = "serviceAccountKey.json";
const DEFAULT_COLLECTION: &str = "users";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
    #[error("Unreadable service credentials at {0}: {1}")]
    Credentials(PathBuf, String),
}

/// Profile Hub application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the app
    pub base_url: String,
    /// Google OAuth client configuration
    pub google: GoogleOAuthConfig,
    /// Firebase project and document store configuration
    pub firebase: FirebaseConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Google OAuth 2.0 client configuration.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct GoogleOAuthConfig {
    /// OAuth client ID (safe to expose in browser redirects)
    pub client_id: String,
    /// OAuth client secret (server-side only)
    pub client_secret: SecretString,
}

impl std::fmt::Debug for GoogleOAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleOAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Firebase project configuration shared by the identity and store clients.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Project identifier (Firestore database owner)
    pub project_id: String,
    /// Web API key, sent with end-user requests
    pub api_key: String,
    /// Collection holding profile documents
    pub collection: String,
    /// Service account used by the privileged submit endpoint
    pub service_account: ServiceAccountKey,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// if the client secret fails validation, or if the service credential
    /// file cannot be read.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PROFILE_HUB_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PROFILE_HUB_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("PROFILE_HUB_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PROFILE_HUB_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("PROFILE_HUB_BASE_URL")?
            .trim_end_matches('/')
            .to_string();

        let google = GoogleOAuthConfig::from_env()?;
        let firebase = FirebaseConfig::from_env()?;

        Ok(Self {
            host,
            port,
            base_url,
            google,
            firebase,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// OAuth callback URL registered with Google.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.base_url)
    }

    /// Whether cookies must be marked `Secure`.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl GoogleOAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            client_id: get_required_env("GOOGLE_CLIENT_ID")?,
            client_secret: get_validated_secret("GOOGLE_CLIENT_SECRET")?,
        })
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let credentials_path = PathBuf::from(get_env_or_default(
            "GOOGLE_CREDENTIALS_PATH",
            DEFAULT_CREDENTIALS_PATH,
        ));

        Ok(Self {
            project_id: get_required_env("FIREBASE_PROJECT_ID")?,
            api_key: get_required_env("FIREBASE_API_KEY")?,
            collection: get_env_or_default("FIREBASE_COLLECTION", DEFAULT_COLLECTION),
            service_account: load_service_account(&credentials_path)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnvVar(key.to_string())),
    }
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Read the service account key, resolving relative paths against the working directory.
fn load_service_account(path: &Path) -> Result<ServiceAccountKey, ConfigError> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| ConfigError::Credentials(path.to_path_buf(), e.to_string()))?
            .join(path)
    };

    ServiceAccountKey::from_file(&resolved)
        .map_err(|e| ConfigError::Credentials(resolved, e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Copy the value from the Google Cloud console."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Configuration for router tests: local base URL and the dummy service key.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) fn test_config() -> AppConfig {
    use crate::store::firestore::credentials::TEST_SERVICE_ACCOUNT_JSON;

    AppConfig {
        host: IpAddr::from([127, 0, 0, 1]),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        google: GoogleOAuthConfig {
            client_id: "client-123.apps.googleusercontent.com".to_string(),
            client_secret: SecretString::from("GOCSPX-3fQ9zL1mT8vK2rB7nW4yH6dJ0c"),
        },
        firebase: FirebaseConfig {
            project_id: "demo-project".to_string(),
            api_key: "AIzaDemoKey".to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            service_account: ServiceAccountKey::from_json(TEST_SERVICE_ACCOUNT_JSON).unwrap(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::store::firestore::credentials::TEST_SERVICE_ACCOUNT_JSON;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-client-secret", "GOOGLE_CLIENT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "GOOGLE_CLIENT_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_google_style() {
        let result = validate_secret_strength("GOCSPX-3fQ9zL1mT8vK2rB7nW4yH6dJ0c", "GOOGLE_CLIENT_SECRET");
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_credentials_file_is_fatal() {
        let result = load_service_account(Path::new("/nonexistent/serviceAccountKey.json"));
        assert!(matches!(result, Err(ConfigError::Credentials(_, _))));
    }

    #[test]
    fn test_load_service_account_from_absolute_path() {
        let path = std::env::temp_dir().join(format!(
            "profile-hub-sa-{}.json",
            uuid::Uuid::new_v4()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(TEST_SERVICE_ACCOUNT_JSON.as_bytes()).unwrap();

        let key = load_service_account(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(key.client_email, "profile-hub@demo-project.iam.gserviceaccount.com");
    }

    #[test]
    fn test_google_config_debug_redacts_secret() {
        let config = GoogleOAuthConfig {
            client_id: "client_id_value".to_string(),
            client_secret: SecretString::from("super_secret_client_secret"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("client_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_client_secret"));
    }
}
