//! Menu repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use cube_core::error::{AppError, ErrorKind};
use cube_core::result::AppResult;
use cube_core::traits::{NamedRepository, Repository};
use cube_core::types::pagination::{PageRequest, PageResponse};
use cube_entity::menu::Menu;

/// Repository for navigation menus.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: PgPool,
}

impl MenuRepository {
    /// Create a new menu repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Menu, i32> for MenuRepository {
    async fn find_by_id(&self, id: &i32) -> AppResult<Option<Menu>> {
        sqlx::query_as::<_, Menu>("SELECT * FROM menus WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find menu", e))
    }

    async fn find_all(&self, page: &PageRequest) -> AppResult<PageResponse<Menu>> {
        let total = self.count().await?;

        let menus = sqlx::query_as::<_, Menu>(
            "SELECT * FROM menus ORDER BY parent_id, sort, id LIMIT $1 OFFSET $2",
        )
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list menus", e))?;

        Ok(PageResponse::new(menus, page.page, page.page_size, total))
    }

    async fn create(&self, menu: &Menu) -> AppResult<Menu> {
        sqlx::query_as::<_, Menu>(
            "INSERT INTO menus (name, display_name, url, parent_id, sort, visible) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&menu.name)
        .bind(&menu.display_name)
        .bind(&menu.url)
        .bind(menu.parent_id)
        .bind(menu.sort)
        .bind(menu.visible)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("menus_name_lower_idx") =>
            {
                AppError::conflict(format!("Menu '{}' already exists", menu.name))
            }
            _ => AppError::with_source(ErrorKind::Database, "Failed to create menu", e),
        })
    }

    async fn update(&self, menu: &Menu) -> AppResult<Menu> {
        sqlx::query_as::<_, Menu>(
            "UPDATE menus SET name = $2, display_name = $3, url = $4, parent_id = $5, \
                              sort = $6, visible = $7 \
             WHERE id = $1 RETURNING *",
        )
        .bind(menu.id)
        .bind(&menu.name)
        .bind(&menu.display_name)
        .bind(&menu.url)
        .bind(menu.parent_id)
        .bind(menu.sort)
        .bind(menu.visible)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update menu", e))?
        .ok_or_else(|| AppError::not_found(format!("Menu {} not found", menu.id)))
    }

    async fn delete(&self, id: &i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete menu", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menus")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count menus", e))?;
        Ok(count as u64)
    }
}

#[async_trait]
impl NamedRepository<Menu> for MenuRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Menu>> {
        sqlx::query_as::<_, Menu>(&super::find_by_name_sql("menus"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find menu by name", e)
            })
    }
}
