use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::model::{NewUser, User, UserPatch};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid id `{0}`")]
    InvalidId(String),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for user records. Ids arrive as raw path segments so every
/// backend rejects malformed ids the same way.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, user: NewUser) -> StoreResult<User>;
    async fn find_by_id(&self, id: &str) -> StoreResult<User>;
    async fn find_by_username(&self, username: &str) -> StoreResult<User>;
    async fn update(&self, id: &str, patch: UserPatch) -> StoreResult<User>;
    async fn delete(&self, id: &str) -> StoreResult<()>;
    /// All users in insertion order.
    async fn list(&self) -> StoreResult<Vec<User>>;
    async fn set_token(&self, id: Uuid, token: &str) -> StoreResult<()>;

    async fn close(&self) {}
}
