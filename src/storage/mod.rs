//! PostgreSQL adapters for the domain ports.

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::Config;
use crate::{AccountError, OrderError};

pub mod orders;
pub mod outbox;
pub mod users;

pub use orders::PgOrderStore;
pub use outbox::PgOutbox;
pub use users::PgUserStore;

pub async fn connect(config: &Config) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new().max_connections(config.db_max_connections).connect(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!(max_connections = config.db_max_connections, "database ready, migrations applied");
    Ok(pool)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl From<sqlx::Error> for OrderError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            return OrderError::Conflict;
        }
        match e {
            sqlx::Error::RowNotFound => OrderError::NotFound,
            other => OrderError::Persistence(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AccountError {
    fn from(e: sqlx::Error) -> Self {
        if is_unique_violation(&e) {
            return AccountError::EmailTaken;
        }
        match e {
            sqlx::Error::RowNotFound => AccountError::NotFound,
            other => AccountError::Persistence(other.to_string()),
        }
    }
}

/// Escapes `%`, `_` and `\` for use inside an `ILIKE` pattern.
pub(crate) fn like_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
