use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an authenticated request, inserted into request extensions by
/// the bearer middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

/// JWT payload issued at signup/login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Caller {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            email: c.email,
            name: c.name,
        }
    }
}
