//! Persistence: SeaORM entities, migrations and repository implementations.
//!
//! Nothing outside this module touches SeaORM entities; services see only the
//! repository traits from `domain::repos`.

pub mod catalog_sea_repo;
pub mod db;
pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod modified_sea_repo;
pub mod users_sea_repo;

pub use catalog_sea_repo::SeaCatalogRepository;
pub use db::connect;
pub use migrations::Migrator;
pub use modified_sea_repo::SeaModifiedRepository;
pub use users_sea_repo::SeaUsersRepository;
