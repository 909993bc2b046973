use std::collections::HashMap;

use async_trait::async_trait;
use models::{Gender, User};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::UserRepository;
use crate::errors::ServiceError;

/// Process-lifetime user table keyed by id.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    inner: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the sample user Joe Jones under a fresh id.
    pub fn with_sample_user() -> Self {
        let id = Uuid::new_v4();
        let joe = User::new("Joe", "Jones", Gender::Male, 20, "JoeJones2021@gmail.com").with_id(id);
        let mut map = HashMap::new();
        map.insert(id, joe);
        Self { inner: RwLock::new(map) }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn select_all(&self) -> Result<Vec<User>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn select_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, id: Uuid, user: User) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        if map.insert(id, user).is_some() {
            debug!(user_id = %id, "insert overwrote existing entry");
        }
        Ok(())
    }

    async fn update(&self, user: User) -> Result<(), ServiceError> {
        let id = user
            .id
            .ok_or_else(|| ServiceError::Validation("user id is required for update".into()))?;
        let mut map = self.inner.write().await;
        map.insert(id, user);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.remove(&id).is_some())
    }

    async fn len(&self) -> Result<usize, ServiceError> {
        Ok(self.inner.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anna() -> User {
        User::new("Anna", "Montana", Gender::Female, 30, "Anna@gmail.com")
    }

    #[tokio::test]
    async fn sample_user_is_seeded() -> Result<(), anyhow::Error> {
        let store = InMemoryUserRepository::with_sample_user();
        let all = store.select_all().await?;
        assert_eq!(all.len(), 1);
        let joe = &all[0];
        assert!(joe.id.is_some());
        assert_eq!(joe.first_name, "Joe");
        assert_eq!(joe.last_name, "Jones");
        assert_eq!(joe.gender, Gender::Male);
        assert_eq!(joe.age, 20);
        assert_eq!(joe.email, "JoeJones2021@gmail.com");
        Ok(())
    }

    #[tokio::test]
    async fn insert_select_and_overwrite() -> Result<(), anyhow::Error> {
        let store = InMemoryUserRepository::new();
        assert_eq!(store.len().await?, 0);

        let id = Uuid::new_v4();
        store.insert(id, anna().with_id(id)).await?;
        assert_eq!(store.select_by_id(id).await?, Some(anna().with_id(id)));

        // same key replaces rather than duplicates
        let older = User { age: 31, ..anna() }.with_id(id);
        store.insert(id, older.clone()).await?;
        assert_eq!(store.len().await?, 1);
        assert_eq!(store.select_by_id(id).await?, Some(older));
        Ok(())
    }

    #[tokio::test]
    async fn missing_id_is_absent_not_error() -> Result<(), anyhow::Error> {
        let store = InMemoryUserRepository::with_sample_user();
        assert_eq!(store.select_by_id(Uuid::new_v4()).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn update_writes_without_existence_check() -> Result<(), anyhow::Error> {
        let store = InMemoryUserRepository::new();
        let id = Uuid::new_v4();
        store.update(anna().with_id(id)).await?;
        assert_eq!(store.select_by_id(id).await?.map(|u| u.first_name), Some("Anna".into()));
        Ok(())
    }

    #[tokio::test]
    async fn update_without_id_is_rejected() {
        let store = InMemoryUserRepository::new();
        let err = store.update(anna()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_absent_id_still_succeeds() -> Result<(), anyhow::Error> {
        let store = InMemoryUserRepository::new();
        let id = Uuid::new_v4();
        store.insert(id, anna().with_id(id)).await?;
        assert!(store.delete(id).await?);
        assert!(!store.delete(id).await?);
        assert_eq!(store.select_by_id(id).await?, None);
        Ok(())
    }
}
