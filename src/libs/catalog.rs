use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::libs::error::CatalogError;
use crate::libs::schema::ColumnInfo;

/// Read-only view of a database catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Base tables in `schema`, ordered by name.
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError>;

    /// Columns of `schema.table` in ordinal order.
    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, CatalogError>;
}

const TABLES_SQL: &str = r#"
    SELECT table_name::text
    FROM information_schema.tables
    WHERE table_schema = $1
      AND table_type = 'BASE TABLE'
    ORDER BY table_name
"#;

// numeric_precision is reported in bits for integer types.
const COLUMNS_SQL: &str = r#"
    SELECT
        c.column_name::text,
        c.data_type::text,
        c.udt_name::text,
        c.numeric_precision::int4,
        (c.is_nullable = 'YES') AS is_nullable,
        EXISTS (
            SELECT 1
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
              ON kcu.constraint_schema = tc.constraint_schema
             AND kcu.constraint_name = tc.constraint_name
             AND kcu.table_name = tc.table_name
            WHERE tc.constraint_type = 'PRIMARY KEY'
              AND tc.table_schema = c.table_schema
              AND tc.table_name = c.table_name
              AND kcu.column_name = c.column_name
        ) AS is_primary_key
    FROM information_schema.columns c
    WHERE c.table_schema = $1
      AND c.table_name = $2
    ORDER BY c.ordinal_position
"#;

type ColumnRow = (String, String, Option<String>, Option<i32>, Option<bool>, Option<bool>);

/// PostgreSQL catalog backed by `information_schema`.
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub async fn connect(database_url: &str) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(CatalogError::Connect)?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl Catalog for PgCatalog {
    async fn list_tables(&self, schema: &str) -> Result<Vec<String>, CatalogError> {
        let rows: Vec<(String,)> = sqlx::query_as(TABLES_SQL)
            .bind(schema)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| CatalogError::ListTables {
                schema: schema.to_string(),
                source,
            })?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn list_columns(&self, schema: &str, table: &str) -> Result<Vec<ColumnInfo>, CatalogError> {
        let rows: Vec<ColumnRow> = sqlx::query_as(COLUMNS_SQL)
            .bind(schema)
            .bind(table)
            .fetch_all(&self.pool)
            .await
            .map_err(|source| CatalogError::ListColumns {
                schema: schema.to_string(),
                table: table.to_string(),
                source,
            })?;

        Ok(rows
            .into_iter()
            .map(
                |(name, sql_type, udt_name, precision, is_nullable, is_primary_key)| ColumnInfo {
                    name,
                    sql_type,
                    udt_name,
                    precision,
                    is_nullable: is_nullable.unwrap_or(true),
                    is_primary_key: is_primary_key.unwrap_or(false),
                },
            )
            .collect())
    }
}
