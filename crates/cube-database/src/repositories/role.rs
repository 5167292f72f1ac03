//! Role repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use cube_core::error::{AppError, ErrorKind};
use cube_core::result::AppResult;
use cube_core::traits::{NamedRepository, Repository};
use cube_core::types::pagination::{PageRequest, PageResponse};
use cube_entity::user::Role;

/// Repository for roles.
#[derive(Debug, Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    /// Create a new role repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error, name: &str, what: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("roles_name_lower_idx") =>
        {
            AppError::conflict(format!("Role '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, what.to_string(), e),
    }
}

#[async_trait]
impl Repository<Role, i32> for RoleRepository {
    async fn find_by_id(&self, id: &i32) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find role", e))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Role>> {
        let total = self.count().await?;

        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list roles", e))?;

        Ok(PageResponse::new(roles, page.page, page.page_size, total))
    }

    async fn create(&self, role: &Role) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name, enabled, is_system, remark, created_at) \
             VALUES ($1, $2, $3, $4, $5) RETURNING *",
        )
        .bind(&role.name)
        .bind(role.enabled)
        .bind(role.is_system)
        .bind(&role.remark)
        .bind(role.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &role.name, "Failed to create role"))
    }

    async fn update(&self, role: &Role) -> AppResult<Role> {
        sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $2, enabled = $3, is_system = $4, remark = $5 \
             WHERE id = $1 RETURNING *",
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(role.enabled)
        .bind(role.is_system)
        .bind(&role.remark)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &role.name, "Failed to update role"))?
        .ok_or_else(|| AppError::not_found(format!("Role {} not found", role.id)))
    }

    async fn delete(&self, id: &i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1 AND NOT is_system")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete role", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count roles", e))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl NamedRepository<Role> for RoleRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        sqlx::query_as::<_, Role>(&super::find_by_name_sql("roles"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find role by name", e)
            })
    }
}
