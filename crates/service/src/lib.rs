//! Service layer for the users API.
//! - `storage`: the record table behind the `UserRepository` trait.
//! - `user_service`: business rules (gender filter, existence checks, id assignment).

pub mod errors;
pub mod storage;
pub mod user_service;

pub use errors::ServiceError;
pub use user_service::{MutationStatus, UserService};
