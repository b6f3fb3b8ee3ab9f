//! Schema metadata and migration.
use super::PgErr;
use tokio_postgres::Client;

/// Schema metadata for PostgreSQL tables.
///
/// Provides compile-time SQL generation for table creation and indexing.
/// All methods return `&'static str` so statements can be assembled with
/// [`const_format::concatcp!`].
///
/// This trait contains no I/O operations. See [`migrate`].
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for all indices.
    fn indices() -> &'static str;
    /// Returns idempotent seed rows, if the table has any.
    fn seeds() -> &'static str {
        ""
    }
}

/// Creates the table, its indices and its seed rows if absent.
pub async fn migrate<T: Schema>(client: &Client) -> Result<(), PgErr> {
    log::debug!("migrating table {}", T::name());
    client.batch_execute(T::creates()).await?;
    client.batch_execute(T::indices()).await?;
    match T::seeds() {
        "" => Ok(()),
        seeds => client.batch_execute(seeds).await,
    }
}
