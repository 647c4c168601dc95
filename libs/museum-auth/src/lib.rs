#![warn(warnings)]

pub mod claims;
pub mod errors;
pub mod jwt;
pub mod password;

#[cfg(feature = "axum-ext")]
pub mod axum_ext;

pub use claims::{Caller, Claims};
pub use errors::AuthError;
pub use jwt::TokenService;
pub use password::{hash_password, verify_password};
