//! Audit log repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use cube_core::error::{AppError, ErrorKind};
use cube_core::result::AppResult;
use cube_core::traits::Repository;
use cube_core::types::pagination::{PageRequest, PageResponse};
use cube_entity::audit::AuditLogEntry;

/// Repository for audit log entries. Entries are append-only.
#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new audit log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<AuditLogEntry, i64> for AuditLogRepository {
    async fn find_by_id(&self, id: &i64) -> AppResult<Option<AuditLogEntry>> {
        sqlx::query_as::<_, AuditLogEntry>("SELECT * FROM audit_log WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find audit entry", e)
            })
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<AuditLogEntry>> {
        let total = self.count().await?;

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            "SELECT * FROM audit_log ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list audit log", e))?;

        Ok(PageResponse::new(entries, page.page, page.page_size, total))
    }

    async fn create(&self, entry: &AuditLogEntry) -> AppResult<AuditLogEntry> {
        sqlx::query_as::<_, AuditLogEntry>(
            "INSERT INTO audit_log \
             (category, action, subject, subject_id, detail, ip_address, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&entry.category)
        .bind(&entry.action)
        .bind(&entry.subject)
        .bind(entry.subject_id)
        .bind(&entry.detail)
        .bind(&entry.ip_address)
        .bind(entry.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to write audit entry", e))
    }

    async fn update(&self, _entry: &AuditLogEntry) -> AppResult<AuditLogEntry> {
        Err(AppError::validation("Audit log entries are immutable"))
    }

    async fn delete(&self, _id: &i64) -> AppResult<bool> {
        Err(AppError::validation("Audit log entries are immutable"))
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM audit_log")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e)
            })?;
        Ok(count as u64)
    }
}
