use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{parse_id, NewUser, User, UserPatch};
use super::store::{StoreError, StoreResult, UserStore};

/// In-process store used by tests and by database-less runs. The vector
/// keeps insertion order.
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn ensure_unique(
    users: &[User],
    skip: Option<Uuid>,
    username: &str,
    email: &str,
) -> StoreResult<()> {
    for other in users.iter().filter(|u| Some(u.id) != skip) {
        if other.username == username {
            return Err(StoreError::Validation(format!(
                "username `{username}` already taken"
            )));
        }
        if other.email == email {
            return Err(StoreError::Validation(format!(
                "email `{email}` already registered"
            )));
        }
    }
    Ok(())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        ensure_unique(&users, None, &new.username, &new.email)?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            token: None,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<User> {
        let id = parse_id(id)?;
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn find_by_username(&self, username: &str) -> StoreResult<User> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: &str, patch: UserPatch) -> StoreResult<User> {
        let id = parse_id(id)?;
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;

        let mut updated = users[idx].clone();
        patch.apply(&mut updated);
        ensure_unique(&users, Some(id), &updated.username, &updated.email)?;
        updated.updated_at = OffsetDateTime::now_utc();
        users[idx] = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let id = parse_id(id)?;
        let mut users = self.users.write().await;
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        users.remove(idx);
        Ok(())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn set_token(&self, id: Uuid, token: &str) -> StoreResult<()> {
        let mut users = self.users.write().await;
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        user.token = Some(token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser::new(Some("Test"), Some(username), Some(email), Some("prodigy"), "prodigy")
            .unwrap()
            .with_password_hash("hash".into())
    }

    #[tokio::test]
    async fn create_then_find() {
        let store = MemoryUserStore::new();
        let user = store.create(new_user("ada", "ada@example.com")).await.unwrap();

        let by_id = store.find_by_id(&user.id.to_string()).await.unwrap();
        assert_eq!(by_id.username, "ada");
        let by_name = store.find_by_username("ada").await.unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(by_name.token.is_none());
    }

    #[tokio::test]
    async fn create_rejects_duplicates() {
        let store = MemoryUserStore::new();
        store.create(new_user("ada", "ada@example.com")).await.unwrap();

        let err = store.create(new_user("ada", "other@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        let err = store.create(new_user("grace", "ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn find_by_id_distinguishes_malformed_and_missing() {
        let store = MemoryUserStore::new();
        assert!(matches!(
            store.find_by_id("abc").await,
            Err(StoreError::InvalidId(_))
        ));
        assert!(matches!(
            store.find_by_id(&Uuid::new_v4().to_string()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = MemoryUserStore::new();
        for name in ["carol", "alice", "bob"] {
            store
                .create(new_user(name, &format!("{name}@example.com")))
                .await
                .unwrap();
        }
        let names: Vec<_> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["carol", "alice", "bob"]);
    }

    #[tokio::test]
    async fn update_merges_and_checks_uniqueness() {
        let store = MemoryUserStore::new();
        let ada = store.create(new_user("ada", "ada@example.com")).await.unwrap();
        store.create(new_user("grace", "grace@example.com")).await.unwrap();

        let patch = UserPatch {
            role: Some("mentor".into()),
            ..Default::default()
        };
        let updated = store.update(&ada.id.to_string(), patch).await.unwrap();
        assert_eq!(updated.role, "mentor");
        assert_eq!(updated.email, "ada@example.com");

        let clash = UserPatch {
            username: Some("grace".into()),
            ..Default::default()
        };
        let err = store.update(&ada.id.to_string(), clash).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = MemoryUserStore::new();
        let ada = store.create(new_user("ada", "ada@example.com")).await.unwrap();
        let id = ada.id.to_string();

        store.delete(&id).await.unwrap();
        assert!(matches!(store.find_by_id(&id).await, Err(StoreError::NotFound)));
        assert!(matches!(store.delete(&id).await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn set_token_is_stored() {
        let store = MemoryUserStore::new();
        let ada = store.create(new_user("ada", "ada@example.com")).await.unwrap();
        store.set_token(ada.id, "t1").await.unwrap();
        let found = store.find_by_username("ada").await.unwrap();
        assert_eq!(found.token.as_deref(), Some("t1"));
    }
}
