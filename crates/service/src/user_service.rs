use std::sync::Arc;

use models::{Gender, User};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::storage::UserRepository;

/// Outcome of a mutation that may target a missing user.
///
/// A missing id is a normal result here, not a `ServiceError`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    Applied,
    NotFound,
}

impl MutationStatus {
    pub fn is_applied(self) -> bool {
        matches!(self, MutationStatus::Applied)
    }
}

/// User business rules on top of a [`UserRepository`]: gender filtering,
/// existence checks before mutation and id assignment.
pub struct UserService<R: UserRepository + ?Sized> {
    repo: Arc<R>,
    // Held across check-then-write sequences so concurrent mutations cannot interleave.
    write_lock: Mutex<()>,
}

impl<R: UserRepository + ?Sized> UserService<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo, write_lock: Mutex::new(()) }
    }

    /// All users, or only those whose gender matches `gender` (case-insensitive).
    ///
    /// # Examples
    /// ```
    /// use service::{storage::InMemoryUserRepository, user_service::UserService};
    /// use std::sync::Arc;
    /// let svc = UserService::new(Arc::new(InMemoryUserRepository::with_sample_user()));
    /// let males = tokio_test::block_on(svc.get_all_users(Some("male"))).unwrap();
    /// assert_eq!(males.len(), 1);
    /// let err = tokio_test::block_on(svc.get_all_users(Some("robot"))).unwrap_err();
    /// assert!(err.to_string().contains("Invalid gender"));
    /// ```
    #[instrument(skip(self))]
    pub async fn get_all_users(&self, gender: Option<&str>) -> Result<Vec<User>, ServiceError> {
        let wanted = match gender {
            None => None,
            Some(raw) => Some(raw.parse::<Gender>().map_err(|e| {
                warn!(error = %e, "rejecting gender filter");
                ServiceError::invalid_argument("Invalid gender")
            })?),
        };

        let users = self.repo.select_all().await?;
        let Some(wanted) = wanted else {
            return Ok(users);
        };
        let filtered: Vec<User> = users.into_iter().filter(|u| u.gender == wanted).collect();
        debug!(count = filtered.len(), gender = %wanted, "filtered users");
        Ok(filtered)
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        self.repo.select_by_id(id).await
    }

    /// Assign a fresh id to `user` (discarding any it carried) and store it.
    /// The caller reads the new id back from `user.id`.
    #[instrument(skip(self, user))]
    pub async fn insert_user(&self, user: &mut User) -> Result<MutationStatus, ServiceError> {
        let _guard = self.write_lock.lock().await;
        let id = self.mint_id().await?;
        user.id = Some(id);
        self.repo.insert(id, user.clone()).await?;
        info!(user_id = %id, "user_inserted");
        Ok(MutationStatus::Applied)
    }

    /// Replace the stored record at `user.id`. `NotFound` leaves storage untouched.
    #[instrument(skip(self, user), fields(user_id = ?user.id))]
    pub async fn update_user(&self, user: User) -> Result<MutationStatus, ServiceError> {
        let Some(id) = user.id else {
            debug!("update without id");
            return Ok(MutationStatus::NotFound);
        };
        let _guard = self.write_lock.lock().await;
        if self.repo.select_by_id(id).await?.is_none() {
            debug!("update target missing");
            return Ok(MutationStatus::NotFound);
        }
        self.repo.update(user).await?;
        info!("user_updated");
        Ok(MutationStatus::Applied)
    }

    #[instrument(skip(self))]
    pub async fn remove_user(&self, id: Uuid) -> Result<MutationStatus, ServiceError> {
        let _guard = self.write_lock.lock().await;
        if self.repo.select_by_id(id).await?.is_none() {
            debug!("delete target missing");
            return Ok(MutationStatus::NotFound);
        }
        self.repo.delete(id).await?;
        info!("user_removed");
        Ok(MutationStatus::Applied)
    }

    pub async fn count(&self) -> Result<usize, ServiceError> {
        self.repo.len().await
    }

    // Caller must hold `write_lock`.
    async fn mint_id(&self) -> Result<Uuid, ServiceError> {
        loop {
            let id = Uuid::new_v4();
            if self.repo.select_by_id(id).await?.is_none() {
                return Ok(id);
            }
            warn!(user_id = %id, "generated id already in use; retrying");
        }
    }
}
