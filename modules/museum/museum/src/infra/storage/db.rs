//! Connection setup.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// In-memory SQLite lives exactly as long as its single connection.
const MEMORY_LIFETIME: Duration = Duration::from_secs(60 * 60 * 24 * 365);

#[must_use]
pub fn is_memory_url(url: &str) -> bool {
    url.starts_with("sqlite::memory:") || url.contains("mode=memory")
}

/// Opens the pool. In-memory SQLite URLs are pinned to one long-lived
/// connection so the schema survives between requests.
///
/// # Errors
/// Returns the driver error when the database cannot be reached.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(url.to_owned());
    options.sqlx_logging(false);

    if is_memory_url(url) {
        options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(MEMORY_LIFETIME)
            .max_lifetime(MEMORY_LIFETIME);
    } else {
        options.max_connections(max_connections.max(1));
    }

    tracing::debug!(memory = is_memory_url(url), "connecting to database");
    Database::connect(options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls() {
        assert!(is_memory_url("sqlite::memory:"));
        assert!(is_memory_url("sqlite:file:museum?mode=memory&cache=shared"));
        assert!(!is_memory_url("sqlite://museum.db?mode=rwc"));
        assert!(!is_memory_url("postgres://localhost/museum"));
    }
}
