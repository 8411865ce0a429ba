use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::like_pattern;
use crate::domain::aggregates::User;
use crate::domain::ports::{ListUsersParams, UserStore};
use crate::AccountError;

const USER_COLUMNS: &str = "id, email, password_hash, name, roles, created_at, updated_at";

pub(crate) fn list_query(params: &ListUsersParams) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users WHERE 1=1"));
    if let Some(email) = params.email.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND email ILIKE ").push_bind(like_pattern(email));
    }
    if let Some(name) = params.name.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(name));
    }
    if let Some(role) = params.role.as_deref().filter(|s| !s.is_empty()) {
        qb.push(" AND ").push_bind(role.to_string()).push(" = ANY(roles)");
    }
    qb.push(" ORDER BY ").push(params.sort.as_sql());
    qb.push(" LIMIT ").push_bind(params.limit);
    qb.push(" OFFSET ").push_bind(params.offset);
    qb
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, user: &User) -> Result<(), AccountError> {
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, name, roles, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.roles)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AccountError> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AccountError> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> Result<Option<User>, AccountError> {
        let user = sqlx::query_as(&format!("UPDATE users SET name = $1, updated_at = $2 WHERE id = $3 RETURNING {USER_COLUMNS}"))
            .bind(name)
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn list(&self, params: &ListUsersParams) -> Result<Vec<User>, AccountError> {
        Ok(list_query(params).build_query_as().fetch_all(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::SortOrder;

    #[test]
    fn test_unfiltered_user_listing() {
        let params = ListUsersParams { limit: 20, ..Default::default() };
        let sql = list_query(&params).sql().to_string();
        assert!(sql.ends_with("WHERE 1=1 ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2"), "{sql}");
    }

    #[test]
    fn test_user_filters_are_bound() {
        let params = ListUsersParams {
            email: Some("ada".into()),
            name: Some(String::new()),
            role: Some("admin".into()),
            sort: SortOrder::CreatedAsc,
            limit: 10,
            offset: 10,
        };
        let sql = list_query(&params).sql().to_string();
        assert!(sql.contains("AND email ILIKE $1 AND $2 = ANY(roles)"), "{sql}");
        assert!(!sql.contains("name ILIKE"), "{sql}");
        assert!(sql.contains("ORDER BY created_at ASC"), "{sql}");
    }
}
