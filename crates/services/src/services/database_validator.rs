//! Schema checks behind the health endpoint.

use db::REQUIRED_TABLES;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum DatabaseValidationError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub struct DatabaseValidator {
    pool: SqlitePool,
}

impl DatabaseValidator {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Check that migrations ran and every table the app reads exists.
    pub async fn validate(&self) -> Result<ValidationResult, DatabaseValidationError> {
        if !self.table_exists("_sqlx_migrations").await? {
            warn!("Database not initialized, _sqlx_migrations table does not exist");
            return Ok(ValidationResult {
                is_initialized: false,
                migrations_applied: 0,
                latest_migration: None,
                missing_tables: REQUIRED_TABLES.iter().map(|t| t.to_string()).collect(),
            });
        }

        let migrations_applied =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
                .fetch_one(&self.pool)
                .await?;
        let latest_migration = sqlx::query_scalar::<_, String>(
            "SELECT description FROM _sqlx_migrations WHERE success = 1 ORDER BY version DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        let missing_tables = self.missing_tables(REQUIRED_TABLES).await?;

        if missing_tables.is_empty() {
            debug!(migrations_applied, "Database schema OK");
        } else {
            warn!(missing = ?missing_tables, "Database schema incomplete");
        }

        Ok(ValidationResult {
            is_initialized: true,
            migrations_applied: migrations_applied as usize,
            latest_migration,
            missing_tables,
        })
    }

    pub async fn missing_tables(
        &self,
        required_tables: &[&str],
    ) -> Result<Vec<String>, DatabaseValidationError> {
        let mut missing = Vec::new();
        for table in required_tables {
            if !self.table_exists(table).await? {
                missing.push(table.to_string());
            }
        }
        Ok(missing)
    }

    async fn table_exists(&self, name: &str) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = $1",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_initialized: bool,
    pub migrations_applied: usize,
    pub latest_migration: Option<String>,
    pub missing_tables: Vec<String>,
}

impl ValidationResult {
    pub fn is_ok(&self) -> bool {
        self.is_initialized && self.missing_tables.is_empty()
    }

    pub fn summary(&self) -> String {
        if !self.is_initialized {
            "Database not initialized - migrations need to be run".to_string()
        } else if !self.missing_tables.is_empty() {
            format!("Missing tables: {}", self.missing_tables.join(", "))
        } else {
            format!("Database OK - {} migrations applied", self.migrations_applied)
        }
    }
}
