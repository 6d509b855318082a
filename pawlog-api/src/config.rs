/// Configuration management for the API server
///
/// This module loads configuration from environment variables (optionally from a
/// `.env` file) and provides a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 5000)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, or `*` (default: *)
/// - `REQUEST_TIMEOUT_SECONDS`: Per-request timeout (default: 30)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for token signing, at least 32 characters (required)
/// - `JWT_TTL_SECONDS`: Token lifetime, at most 30 days (default: 3600)
/// - `PASSWORD_HASH_MEMORY_KIB` / `PASSWORD_HASH_ITERATIONS` / `PASSWORD_HASH_PARALLELISM`:
///   Argon2id cost (default: 65536 / 3 / 4)
/// - `BLOB_STORE_ENDPOINT`, `BLOB_STORE_BUCKET`: blob store location (required)
/// - `BLOB_STORE_TOKEN`: bearer token for the blob store (optional)
/// - `BLOB_STORE_TIMEOUT_SECONDS`: upload timeout (default: 60)
/// - `UPLOAD_REQUIRE_AUTH`: require a bearer token and ownership for uploads (default: false)
/// - `UPLOAD_MAX_BYTES`: largest accepted upload body (default: 50 MiB)
///
/// # Example
///
/// ```no_run
/// use pawlog_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use pawlog_shared::auth::password::PasswordPolicy;
use pawlog_shared::blob::HttpBlobConfig;
use std::env;
use std::str::FromStr;

const DEFAULT_UPLOAD_MAX_BYTES: usize = 50 * 1024 * 1024;

/// Longest accepted token lifetime (30 days)
const MAX_JWT_TTL_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Password hashing cost
    pub password: PasswordPolicy,

    /// Blob store configuration
    pub blob: BlobConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,

    pub request_timeout_seconds: u64,

    /// Largest accepted upload body in bytes
    pub upload_max_bytes: usize,

    /// Put the upload route behind the authorization gate
    pub upload_require_auth: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub ttl_seconds: i64,
}

/// Blob store configuration
#[derive(Debug, Clone)]
pub struct BlobConfig {
    pub endpoint: String,
    pub bucket: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl BlobConfig {
    pub fn http(&self) -> HttpBlobConfig {
        HttpBlobConfig {
            endpoint: self.endpoint.clone(),
            bucket: self.bucket.clone(),
            token: self.token.clone(),
            timeout_seconds: self.timeout_seconds,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &str| {
            var(key).ok_or_else(|| anyhow::anyhow!("{} environment variable is required", key))
        };

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let jwt_ttl: i64 = parse_or(var("JWT_TTL_SECONDS"), "JWT_TTL_SECONDS", 3600)?;
        if jwt_ttl <= 0 {
            anyhow::bail!("JWT_TTL_SECONDS must be positive");
        }
        if jwt_ttl > MAX_JWT_TTL_SECONDS {
            anyhow::bail!("JWT_TTL_SECONDS must be at most {}", MAX_JWT_TTL_SECONDS);
        }

        let cors_origins = var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty() && o != "*")
                    .collect()
            })
            .unwrap_or_default();

        let defaults = PasswordPolicy::default();

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(var("API_PORT"), "API_PORT", 5000)?,
                cors_origins,
                request_timeout_seconds: parse_or(
                    var("REQUEST_TIMEOUT_SECONDS"),
                    "REQUEST_TIMEOUT_SECONDS",
                    30,
                )?,
                upload_max_bytes: parse_or(
                    var("UPLOAD_MAX_BYTES"),
                    "UPLOAD_MAX_BYTES",
                    DEFAULT_UPLOAD_MAX_BYTES,
                )?,
                upload_require_auth: parse_flag(var("UPLOAD_REQUIRE_AUTH"), "UPLOAD_REQUIRE_AUTH")?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(
                    var("DATABASE_MAX_CONNECTIONS"),
                    "DATABASE_MAX_CONNECTIONS",
                    10,
                )?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_seconds: jwt_ttl,
            },
            password: PasswordPolicy {
                memory_kib: parse_or(
                    var("PASSWORD_HASH_MEMORY_KIB"),
                    "PASSWORD_HASH_MEMORY_KIB",
                    defaults.memory_kib,
                )?,
                iterations: parse_or(
                    var("PASSWORD_HASH_ITERATIONS"),
                    "PASSWORD_HASH_ITERATIONS",
                    defaults.iterations,
                )?,
                parallelism: parse_or(
                    var("PASSWORD_HASH_PARALLELISM"),
                    "PASSWORD_HASH_PARALLELISM",
                    defaults.parallelism,
                )?,
            },
            blob: BlobConfig {
                endpoint: required("BLOB_STORE_ENDPOINT")?,
                bucket: required("BLOB_STORE_BUCKET")?,
                token: var("BLOB_STORE_TOKEN"),
                timeout_seconds: parse_or(
                    var("BLOB_STORE_TIMEOUT_SECONDS"),
                    "BLOB_STORE_TIMEOUT_SECONDS",
                    60,
                )?,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value", key)),
        None => Ok(default),
    }
}

fn parse_flag(value: Option<String>, key: &str) -> anyhow::Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes" | "on") => Ok(true),
        Some("false" | "0" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("{} must be a boolean, got '{}'", key, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const REQUIRED: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgresql://localhost/test"),
        ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
        ("BLOB_STORE_ENDPOINT", "https://blobs.example.com"),
        ("BLOB_STORE_BUCKET", "media"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(REQUIRED)).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:5000");
        assert!(config.api.cors_origins.is_empty());
        assert_eq!(config.api.request_timeout_seconds, 30);
        assert_eq!(config.api.upload_max_bytes, 50 * 1024 * 1024);
        assert!(!config.api.upload_require_auth);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.ttl_seconds, 3600);
        assert_eq!(config.password, PasswordPolicy::default());
        assert_eq!(config.blob.timeout_seconds, 60);
        assert!(config.blob.token.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut vars = REQUIRED.to_vec();
        vars.extend([
            ("API_PORT", "8081"),
            ("CORS_ORIGINS", "https://a.example.com, https://b.example.com"),
            ("UPLOAD_REQUIRE_AUTH", "true"),
            ("PASSWORD_HASH_ITERATIONS", "2"),
            ("BLOB_STORE_TOKEN", "blob-token"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.api.port, 8081);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example.com", "https://b.example.com"]
        );
        assert!(config.api.upload_require_auth);
        assert_eq!(config.password.iterations, 2);
        assert_eq!(config.blob.http().token.as_deref(), Some("blob-token"));
    }

    #[test]
    fn test_missing_or_invalid_values() {
        let missing = Config::from_lookup(lookup(&REQUIRED[1..])).unwrap_err();
        assert!(missing.to_string().contains("DATABASE_URL"));

        let mut short_secret = REQUIRED.to_vec();
        short_secret[1] = ("JWT_SECRET", "too-short");
        assert!(Config::from_lookup(lookup(&short_secret)).is_err());

        let mut bad_port = REQUIRED.to_vec();
        bad_port.push(("API_PORT", "eighty"));
        assert!(Config::from_lookup(lookup(&bad_port)).is_err());

        let mut huge_ttl = REQUIRED.to_vec();
        huge_ttl.push(("JWT_TTL_SECONDS", "9223372036854775807"));
        let err = Config::from_lookup(lookup(&huge_ttl)).unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_SECONDS"));

        let mut max_ttl = REQUIRED.to_vec();
        max_ttl.push(("JWT_TTL_SECONDS", "2592000"));
        assert_eq!(Config::from_lookup(lookup(&max_ttl)).unwrap().jwt.ttl_seconds, 2_592_000);

        let mut bad_flag = REQUIRED.to_vec();
        bad_flag.push(("UPLOAD_REQUIRE_AUTH", "maybe"));
        assert!(Config::from_lookup(lookup(&bad_flag)).is_err());
    }
}
