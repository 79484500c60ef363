use sqlx::PgPool;

/// Create the ledger tables and indexes (all `IF NOT EXISTS`, safe to rerun).
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(include_str!("../../sql/schema.sql"))
        .execute(pool)
        .await?;
    tracing::debug!("ledger schema applied");
    Ok(())
}
