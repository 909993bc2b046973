//! Storage abstractions for the service layer
//!
//! `UserRepository` is the record table the service talks to. It holds no
//! business rules: existence checks and id minting live in `UserService`.

pub mod memory;

use async_trait::async_trait;
use models::User;
use uuid::Uuid;

use crate::errors::ServiceError;

pub use memory::InMemoryUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Every stored record, in no particular order.
    async fn select_all(&self) -> Result<Vec<User>, ServiceError>;
    async fn select_by_id(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    /// Store `user` under `id`, overwriting any existing entry.
    async fn insert(&self, id: Uuid, user: User) -> Result<(), ServiceError>;
    /// Overwrite the entry at `user.id` without checking that it exists.
    async fn update(&self, user: User) -> Result<(), ServiceError>;
    /// Remove the entry at `id`; returns whether one existed. Removing an absent id succeeds.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;
    async fn len(&self) -> Result<usize, ServiceError>;
}

/// Repositories for tests that need a misbehaving backend.
pub mod mock {
    use super::*;

    /// Every call fails with `ServiceError::Storage`.
    #[derive(Debug, Default)]
    pub struct FailingUserRepository;

    fn unavailable() -> ServiceError {
        ServiceError::Storage("backend unavailable".into())
    }

    #[async_trait]
    impl UserRepository for FailingUserRepository {
        async fn select_all(&self) -> Result<Vec<User>, ServiceError> { Err(unavailable()) }
        async fn select_by_id(&self, _id: Uuid) -> Result<Option<User>, ServiceError> { Err(unavailable()) }
        async fn insert(&self, _id: Uuid, _user: User) -> Result<(), ServiceError> { Err(unavailable()) }
        async fn update(&self, _user: User) -> Result<(), ServiceError> { Err(unavailable()) }
        async fn delete(&self, _id: Uuid) -> Result<bool, ServiceError> { Err(unavailable()) }
        async fn len(&self) -> Result<usize, ServiceError> { Err(unavailable()) }
    }
}
