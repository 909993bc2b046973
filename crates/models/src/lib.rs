pub mod errors;
pub mod user;

pub use user::{Gender, User};
