//! User repository implementation

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::store::ProfileStore;
use crate::models::{CreateUserRequest, User, UserProfile};
use crate::utils::errors::Result;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user profile row
    pub async fn create(&self, request: CreateUserRequest) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, photo_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, photo_url, created_at, updated_at
            "#,
        )
        .bind(request.id)
        .bind(request.name)
        .bind(request.photo_url)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find user by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, photo_url, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update display fields
    pub async fn update_profile(&self, id: &str, name: Option<String>, photo_url: Option<String>) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                photo_url = COALESCE($3, photo_url),
                updated_at = $4
            WHERE id = $1
            RETURNING id, name, photo_url, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(photo_url)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT id, name, photo_url FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }
}
