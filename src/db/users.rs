use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::models::{DbUser, NewUser, decode_opt_ts, decode_ts, encode_ts};
use super::sqlite::PresenterStorage;
use crate::error::PresenterError;

const USER_COLUMNS: &str =
    "SELECT id, username, email, password_hash, created_at, last_login FROM users";

impl PresenterStorage {
    pub async fn find_user_by_username(
        &self,
        username: &str,
    ) -> Result<Option<DbUser>, PresenterError> {
        let row = sqlx::query(&format!("{USER_COLUMNS} WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<DbUser>, PresenterError> {
        let row = sqlx::query(&format!("{USER_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, PresenterError> {
        let hit: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(hit.is_some())
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, PresenterError> {
        let hit: Option<(i64,)> =
            sqlx::query_as("SELECT 1 FROM users WHERE lower(email) = lower(?)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(hit.is_some())
    }

    pub async fn insert_user(&self, user: NewUser) -> Result<DbUser, PresenterError> {
        let created_at = Utc::now();
        let id = sqlx::query(
            "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(encode_ts(&created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            // UNIQUE(username) settles concurrent registrations
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                PresenterError::validation("Username already exists")
            }
            other => PresenterError::DatabaseError(other),
        })?
        .last_insert_rowid();

        self.find_user_by_id(id)
            .await?
            .ok_or(PresenterError::DatabaseError(sqlx::Error::RowNotFound))
    }

    pub async fn touch_last_login(
        &self,
        id: i64,
        at: DateTime<Utc>,
    ) -> Result<(), PresenterError> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(encode_ts(&at))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<bool, PresenterError> {
        let done = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(done.rows_affected() > 0)
    }
}

fn user_from_row(row: SqliteRow) -> Result<DbUser, PresenterError> {
    let created_at: String = row.try_get("created_at")?;
    Ok(DbUser {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: decode_ts(&created_at)?,
        last_login: decode_opt_ts(row.try_get("last_login")?)?,
    })
}
