//! PostgreSQL Repository Implementations

use crate::domain::entities::{QueryLogEntry, StoredQueryLog, Transient};
use crate::domain::repository::{QueryLogRepository, TransientRepository};
use crate::domain::value_objects::{Pagination, QueryLogFilter};
use crate::error::TransientResult;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

/// Upsert on name. A stored E(B-V) survives a refetch since the registry
/// never provides one.
const UPSERT_TRANSIENT: &str = r#"
    INSERT INTO transients (name, redshift, ra, dec, ebv)
    VALUES ($1, $2, $3, $4, $5)
    ON CONFLICT (name) DO UPDATE SET
        redshift = EXCLUDED.redshift,
        ra = EXCLUDED.ra,
        dec = EXCLUDED.dec
    RETURNING name, redshift, ra, dec, ebv
"#;

/// PostgreSQL-backed repository
#[derive(Clone)]
pub struct PgTransientRepository {
    pool: PgPool,
}

impl PgTransientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TransientRepository for PgTransientRepository {
    async fn lookup_by_name(&self, name: &str) -> TransientResult<Option<Transient>> {
        let row = sqlx::query_as::<_, TransientRow>(
            "SELECT name, redshift, ra, dec, ebv FROM transients WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TransientRow::into_transient))
    }

    async fn lookup_many(
        &self,
        names: &[String],
        page: Pagination,
    ) -> TransientResult<Vec<Transient>> {
        let rows = sqlx::query_as::<_, TransientRow>(
            r#"
            SELECT name, redshift, ra, dec, ebv
            FROM transients
            WHERE name = ANY($1)
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(names)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransientRow::into_transient).collect())
    }

    async fn list(&self, page: Pagination) -> TransientResult<Vec<Transient>> {
        let rows = sqlx::query_as::<_, TransientRow>(
            r#"
            SELECT name, redshift, ra, dec, ebv
            FROM transients
            ORDER BY id
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TransientRow::into_transient).collect())
    }

    async fn save(&self, transient: &Transient) -> TransientResult<Transient> {
        let row = sqlx::query_as::<_, TransientRow>(UPSERT_TRANSIENT)
            .bind(&transient.name)
            .bind(transient.redshift)
            .bind(transient.ra)
            .bind(transient.dec)
            .bind(transient.ebv)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(name = %row.name, "Transient stored");
        Ok(row.into_transient())
    }

    async fn save_many(&self, transients: &[Transient]) -> TransientResult<Vec<Transient>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(transients.len());

        for transient in transients {
            let row = sqlx::query_as::<_, TransientRow>(UPSERT_TRANSIENT)
                .bind(&transient.name)
                .bind(transient.redshift)
                .bind(transient.ra)
                .bind(transient.dec)
                .bind(transient.ebv)
                .fetch_one(&mut *tx)
                .await?;
            stored.push(row.into_transient());
        }

        tx.commit().await?;

        tracing::info!(count = stored.len(), "Transients stored");
        Ok(stored)
    }

    async fn update_redshift(
        &self,
        name: &str,
        redshift: f64,
    ) -> TransientResult<Option<Transient>> {
        let row = sqlx::query_as::<_, TransientRow>(
            r#"
            UPDATE transients SET redshift = $2
            WHERE name = $1
            RETURNING name, redshift, ra, dec, ebv
            "#,
        )
        .bind(name)
        .bind(redshift)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TransientRow::into_transient))
    }

    async fn update_ebv(&self, name: &str, ebv: f64) -> TransientResult<Option<Transient>> {
        let row = sqlx::query_as::<_, TransientRow>(
            r#"
            UPDATE transients SET ebv = $2
            WHERE name = $1
            RETURNING name, redshift, ra, dec, ebv
            "#,
        )
        .bind(name)
        .bind(ebv)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(TransientRow::into_transient))
    }

    async fn delete(&self, name: &str) -> TransientResult<bool> {
        let deleted = sqlx::query("DELETE FROM transients WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl QueryLogRepository for PgTransientRepository {
    async fn append_logs(&self, entries: &[QueryLogEntry]) -> TransientResult<()> {
        let mut tx = self.pool.begin().await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO tnsquery_log (name, query, response, code) VALUES ($1, $2, $3, $4)",
            )
            .bind(&entry.name)
            .bind(&entry.query)
            .bind(&entry.response)
            .bind(i32::from(entry.code))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(count = entries.len(), "Query logs appended");
        Ok(())
    }

    async fn list_logs(&self, filter: &QueryLogFilter) -> TransientResult<Vec<StoredQueryLog>> {
        let rows = sqlx::query_as::<_, QueryLogRow>(
            r#"
            SELECT id, name, query, response, code, created_at
            FROM tnsquery_log
            WHERE ($1::BIGINT IS NULL OR id = $1)
              AND ($2::INT IS NULL OR code = $2)
              AND ($3::VARCHAR IS NULL OR name = $3)
            ORDER BY id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.id)
        .bind(filter.code.map(i32::from))
        .bind(filter.name.as_deref())
        .bind(filter.page.limit())
        .bind(filter.page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(QueryLogRow::into_stored).collect())
    }
}

// Database row types

#[derive(sqlx::FromRow)]
struct TransientRow {
    name: String,
    redshift: Option<f64>,
    ra: Option<f64>,
    dec: Option<f64>,
    ebv: Option<f64>,
}

impl TransientRow {
    fn into_transient(self) -> Transient {
        Transient::new(
            self.name,
            self.redshift.unwrap_or(0.0),
            self.ra.unwrap_or(0.0),
            self.dec.unwrap_or(0.0),
            self.ebv.unwrap_or(0.0),
        )
    }
}

#[derive(sqlx::FromRow)]
struct QueryLogRow {
    id: i64,
    name: Option<String>,
    query: Option<String>,
    response: Option<String>,
    code: Option<i32>,
    created_at: DateTime<Utc>,
}

impl QueryLogRow {
    fn into_stored(self) -> StoredQueryLog {
        StoredQueryLog {
            id: self.id,
            entry: QueryLogEntry {
                name: self.name.unwrap_or_default(),
                query: self.query.unwrap_or_default(),
                response: self.response.unwrap_or_default(),
                code: self
                    .code
                    .and_then(|code| u16::try_from(code).ok())
                    .unwrap_or_default(),
            },
            created_at: self.created_at,
        }
    }
}
