use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

use super::model::{parse_id, NewUser, User, UserPatch};
use super::store::{StoreError, StoreResult, UserStore};

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { db })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

/// Unique-constraint hits are caller mistakes, everything else is backend trouble.
fn map_db_err(e: sqlx::Error, what: &'static str) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some(c) if c.contains("email") => "email",
                Some(c) if c.contains("username") => "username",
                _ => "unique field",
            };
            return StoreError::Validation(format!("{field} already taken"));
        }
    }
    StoreError::Backend(anyhow::Error::new(e).context(what))
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, username, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, username, email, password_hash, role, token, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.role)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_db_err(e, "insert user"))
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<User> {
        let id = parse_id(id)?;
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, email, password_hash, role, token, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_db_err(e, "find user by id"))?
        .ok_or(StoreError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, email, password_hash, role, token, created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_db_err(e, "find user by username"))?
        .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: &str, patch: UserPatch) -> StoreResult<User> {
        let id = parse_id(id)?;
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET name          = COALESCE($2, name),
                   username      = COALESCE($3, username),
                   email         = COALESCE($4, email),
                   password_hash = COALESCE($5, password_hash),
                   role          = COALESCE($6, role),
                   updated_at    = now()
             WHERE id = $1
            RETURNING id, name, username, email, password_hash, role, token, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.username)
        .bind(patch.email)
        .bind(patch.password_hash)
        .bind(patch.role)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_db_err(e, "update user"))?
        .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let id = parse_id(id)?;
        let done = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| map_db_err(e, "delete user"))?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, email, password_hash, role, token, created_at, updated_at
            FROM users
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .map_err(|e| map_db_err(e, "list users"))
    }

    async fn set_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        let done = sqlx::query("UPDATE users SET token = $2 WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.db)
            .await
            .map_err(|e| map_db_err(e, "store token"))?;
        if done.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn close(&self) {
        self.db.close().await;
    }
}
