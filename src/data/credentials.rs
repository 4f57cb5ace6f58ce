//! API key sources.
//!
//! The key is resolved once, up front, and handed to `FredClient::new`; nothing
//! downstream reads the environment or a database on its own.

use std::fmt;
use std::str::FromStr;

use sqlx::Connection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use tracing::debug;

use crate::error::AppError;

pub const API_KEY_ENV: &str = "FRED_API_KEY";
pub const DEFAULT_KEY_QUERY: &str = "SELECT api FROM fred_api_key LIMIT 1";

/// A FRED API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Accept a raw value if it is non-blank; surrounding whitespace is trimmed.
    pub fn parse(raw: Option<String>, origin: &str) -> Result<Self, AppError> {
        match raw.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(Self(key.to_string())),
            Some(_) => Err(AppError::CredentialMissing(format!("{origin} is blank"))),
            None => Err(AppError::CredentialMissing(format!("{origin} not found"))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

pub trait CredentialSource {
    fn api_key(&self) -> Result<ApiKey, AppError>;
}

/// Reads the key from the process environment after loading `.env`.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::with_var(API_KEY_ENV)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialSource for EnvCredentials {
    fn api_key(&self) -> Result<ApiKey, AppError> {
        dotenvy::dotenv().ok();
        ApiKey::parse(
            std::env::var(&self.var).ok(),
            &format!("environment variable {} (or .env)", self.var),
        )
    }
}

/// Looks the key up in a SQLite table with a single query.
///
/// One connection is opened per lookup and closed before the result is
/// inspected, whether the query succeeded or not.
#[derive(Debug, Clone)]
pub struct SqliteCredentials {
    url: String,
    query: String,
}

impl SqliteCredentials {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: DEFAULT_KEY_QUERY.to_string(),
        }
    }

    /// Override the lookup query. It must return one text column.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    async fn lookup(&self) -> Result<Option<String>, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(&self.url)?.read_only(true);
        let mut conn = SqliteConnection::connect_with(&options).await?;

        let row: Result<Option<(Option<String>,)>, sqlx::Error> =
            sqlx::query_as(&self.query).fetch_optional(&mut conn).await;

        if let Err(e) = conn.close().await {
            debug!("closing credential database connection failed: {e}");
        }

        Ok(row?.and_then(|(value,)| value))
    }
}

impl CredentialSource for SqliteCredentials {
    fn api_key(&self) -> Result<ApiKey, AppError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::CredentialMissing(format!("failed to start database runtime: {e}")))?;

        let value = runtime.block_on(self.lookup()).map_err(|e| {
            AppError::CredentialMissing(format!("could not read API key from database {}: {e}", self.url))
        })?;

        ApiKey::parse(value, &format!("API key row in {}", self.url))
    }
}

/// Fixed key, for tests and embedding.
#[derive(Debug, Clone)]
pub struct StaticCredentials(pub ApiKey);

impl CredentialSource for StaticCredentials {
    fn api_key(&self) -> Result<ApiKey, AppError> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::*;

    fn temp_db(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("fred_phillips_{name}_{}.sqlite", std::process::id()));
        let _ = std::fs::remove_file(&path);
        path
    }

    fn seed(path: &Path, statements: &[&str]) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async {
            let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
                .unwrap()
                .create_if_missing(true);
            let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
            for stmt in statements {
                sqlx::query(stmt).execute(&mut conn).await.unwrap();
            }
            conn.close().await.unwrap();
        });
    }

    #[test]
    fn api_key_rejects_blank_and_missing() {
        assert!(matches!(
            ApiKey::parse(Some("   ".into()), "test"),
            Err(AppError::CredentialMissing(_))
        ));
        assert!(matches!(ApiKey::parse(None, "test"), Err(AppError::CredentialMissing(_))));
        assert_eq!(ApiKey::parse(Some(" abc \n".into()), "test").unwrap().expose(), "abc");
    }

    #[test]
    fn api_key_debug_is_redacted() {
        let key = ApiKey::parse(Some("supersecret".into()), "test").unwrap();
        assert!(!format!("{key:?}").contains("supersecret"));
    }

    #[test]
    fn env_source_reports_missing_variable() {
        let source = EnvCredentials::with_var("FRED_PHILLIPS_TEST_KEY_THAT_IS_NEVER_SET");
        let err = source.api_key().unwrap_err();
        assert!(matches!(err, AppError::CredentialMissing(_)));
        assert!(err.to_string().contains("FRED_PHILLIPS_TEST_KEY_THAT_IS_NEVER_SET"));
    }

    #[test]
    fn sqlite_source_reads_first_key() {
        let path = temp_db("reads");
        seed(
            &path,
            &[
                "CREATE TABLE fred_api_key (api TEXT)",
                "INSERT INTO fred_api_key (api) VALUES ('db-key-123')",
            ],
        );

        let source = SqliteCredentials::new(format!("sqlite://{}", path.display()));
        let key = source.api_key().unwrap();
        assert_eq!(key.expose(), "db-key-123");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sqlite_source_empty_table_is_missing_credential() {
        let path = temp_db("empty");
        seed(&path, &["CREATE TABLE fred_api_key (api TEXT)"]);

        let source = SqliteCredentials::new(format!("sqlite://{}", path.display()));
        assert!(matches!(source.api_key(), Err(AppError::CredentialMissing(_))));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sqlite_source_null_value_is_missing_credential() {
        let path = temp_db("null");
        seed(
            &path,
            &[
                "CREATE TABLE keys (api TEXT)",
                "INSERT INTO keys (api) VALUES (NULL)",
            ],
        );

        let source = SqliteCredentials::new(format!("sqlite://{}", path.display()))
            .with_query("SELECT api FROM keys LIMIT 1");
        assert!(matches!(source.api_key(), Err(AppError::CredentialMissing(_))));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn sqlite_source_missing_table_is_missing_credential() {
        let path = temp_db("notable");
        seed(&path, &["CREATE TABLE other (x INTEGER)"]);

        let source = SqliteCredentials::new(format!("sqlite://{}", path.display()));
        let err = source.api_key().unwrap_err();
        assert!(matches!(err, AppError::CredentialMissing(_)));

        let _ = std::fs::remove_file(&path);
    }
}
