//! Typed queries over the `users` table used by the signup and login
//! pipeline. Every call fetches the current pool handle so a reconnect is
//! transparent to callers.

use crate::store::{Store, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::Row;
use uuid::Uuid;

/// Credential material fetched at login.
#[derive(Debug, sqlx::FromRow)]
pub struct Credential {
    pub id: Uuid,
    pub username: String,
    pub password: String,
    pub secret: String,
}

#[derive(Debug, Serialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Profile {
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Store {
    pub async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        let pool = self.pool().await;

        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1) AS exists")
            .bind(username)
            .fetch_one(&pool)
            .await
            .map_err(|e| self.observe(e))?;

        Ok(row.get("exists"))
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        let pool = self.pool().await;

        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1) AS exists")
            .bind(email)
            .fetch_one(&pool)
            .await
            .map_err(|e| self.observe(e))?;

        Ok(row.get("exists"))
    }

    /// Insert a new account. The unique constraints on `username` and
    /// `email` are the authoritative backstop for concurrent signups; a
    /// violation surfaces as [`StoreError::Duplicate`].
    pub async fn insert_account(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        secret: &str,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let pool = self.pool().await;

        sqlx::query(
            "INSERT INTO users (id, username, email, password, secret) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(secret)
        .execute(&pool)
        .await
        .map_err(|e| self.observe(e))?;

        Ok(id)
    }

    pub async fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Credential>, StoreError> {
        let pool = self.pool().await;

        sqlx::query_as::<_, Credential>(
            "SELECT id, username, password, secret FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&pool)
        .await
        .map_err(|e| self.observe(e))
    }

    pub async fn profile_by_id(&self, id: Uuid) -> Result<Option<Profile>, StoreError> {
        let pool = self.pool().await;

        sqlx::query_as::<_, Profile>("SELECT username, email, created_at FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&pool)
            .await
            .map_err(|e| self.observe(e))
    }

    pub async fn update_email(&self, id: Uuid, email: &str) -> Result<(), StoreError> {
        let pool = self.pool().await;

        sqlx::query("UPDATE users SET email = $2 WHERE id = $1")
            .bind(id)
            .bind(email)
            .execute(&pool)
            .await
            .map_err(|e| self.observe(e))?;

        Ok(())
    }
}
