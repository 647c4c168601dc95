//! Object storage adapters.

pub mod mock;
pub mod s3;

pub use mock::MockStorage;
pub use s3::S3Storage;
