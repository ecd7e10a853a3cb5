//! # Database Migrations
//!
//! Embedded SQL migrations for the key-value table.
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/` with the next sequence number
//! 2. Name format: `NNN_description.sql` (e.g., `002_add_expiry.sql`)
//! 3. Write idempotent SQL (use `IF NOT EXISTS` where possible)
//! 4. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::StorageResult;

/// Embedded migrations from this crate's `migrations/` directory.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Runs all pending database migrations.
///
/// Idempotent: already-applied migrations are skipped, which makes it safe
/// to call on every startup.
pub async fn run_migrations(pool: &SqlitePool) -> StorageResult<()> {
    info!(count = MIGRATOR.migrations.len(), "Applying storage migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}
