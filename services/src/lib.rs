pub mod account;
pub mod application;
pub mod catalog;
pub mod error;
pub mod evaluation;
pub mod notification;
pub mod placement;
pub mod report;
pub mod student;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::ServiceError;

use db::models::user::Role;

/// Authenticated caller, extracted from JWT claims at the HTTP edge and
/// passed explicitly into every operation that checks ownership or role.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: i64, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    pub fn is_supervisor(&self) -> bool {
        self.role == Role::Supervisor
    }
}
