//! Database module
//!
//! Schema check run at start-up. The schema itself lives in
//! `migrations/0001_financeiro.sql`.

use sqlx::PgPool;

/// Tables the financial core reads or writes
pub const REQUIRED_TABLES: [&str; 5] = [
    "orcamentos",
    "apontamentos",
    "cronogramas_recebimento",
    "contas_pagar",
    "contas_receber",
];

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables 
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    Ok(true)
}
