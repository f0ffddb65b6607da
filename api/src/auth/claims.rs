use db::models::user::Role;
use serde::{Deserialize, Serialize};
use services::Actor;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

/// Verified caller identity, extracted from the Bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Service-layer view of the caller.
    pub fn actor(&self) -> Actor {
        Actor::new(self.0.sub, self.0.role)
    }
}
