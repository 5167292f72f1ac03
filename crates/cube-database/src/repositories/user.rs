//! User repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use cube_core::error::{AppError, ErrorKind};
use cube_core::result::AppResult;
use cube_core::traits::{NamedRepository, Repository};
use cube_core::types::pagination::{PageRequest, PageResponse};
use cube_entity::user::User;

/// Repository for user CRUD and lookup operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Flip the online flag of every user, used at startup after a crash.
    pub async fn reset_online(&self) -> AppResult<u64> {
        let result = sqlx::query("UPDATE users SET online = FALSE WHERE online")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to reset online flags", e)
            })?;
        Ok(result.rows_affected())
    }
}

fn map_write_error(e: sqlx::Error, name: &str, what: &str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some("users_name_lower_idx") =>
        {
            AppError::conflict(format!("User '{name}' already exists"))
        }
        _ => AppError::with_source(ErrorKind::Database, what.to_string(), e),
    }
}

#[async_trait]
impl Repository<User, i64> for UserRepository {
    async fn find_by_id(&self, id: &i64) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<User>> {
        let total = self.count().await?;

        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT $1 OFFSET $2")
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))?;

        Ok(PageResponse::new(users, page.page, page.page_size, total))
    }

    async fn create(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, password_hash, display_name, enabled, role_id, role_ids, \
                                online, logins, registered_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING *",
        )
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.enabled)
        .bind(user.role_id)
        .bind(&user.role_ids)
        .bind(user.online)
        .bind(user.logins)
        .bind(user.registered_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.name, "Failed to create user"))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET name = $2, password_hash = $3, display_name = $4, enabled = $5, \
                              role_id = $6, role_ids = $7, online = $8, logins = $9, \
                              last_login_at = $10, last_login_ip = $11, updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.enabled)
        .bind(user.role_id)
        .bind(&user.role_ids)
        .bind(user.online)
        .bind(user.logins)
        .bind(user.last_login_at)
        .bind(&user.last_login_ip)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.name, "Failed to update user"))?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", user.id)))
    }

    async fn delete(&self, id: &i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count users", e))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl NamedRepository<User> for UserRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(&super::find_by_name_sql("users"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by name", e)
            })
    }
}
