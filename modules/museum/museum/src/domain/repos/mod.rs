//! Repository traits for museum persistence.
//!
//! All methods accept a generic connection (`DatabaseConnection` or
//! `DatabaseTransaction`) so services decide the transactional boundary.

pub mod catalog_repo;
pub mod modified_repo;
pub mod users_repo;

pub use catalog_repo::CatalogRepository;
pub use modified_repo::ModifiedRepository;
pub use users_repo::{NewUser, UserCredentials, UsersRepository};
