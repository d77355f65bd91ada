use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};
use tracing::debug;

use crate::auth::gate::{Operation, permits};
use crate::error::AppError;
use crate::model::role::Role;
use crate::model::user::User;

/// Caller identity, inserted into request extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Row id of the linked employee record, if any.
    pub employee_id: Option<u64>,
}

impl AuthUser {
    pub fn new(user: &User, employee_id: Option<u64>) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            employee_id,
        }
    }

    pub(crate) fn from_extensions(req: &HttpRequest) -> Result<Self, AppError> {
        req.extensions()
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthenticated)
    }

    /// Role gate for `op`.
    pub fn require(&self, op: Operation) -> Result<(), AppError> {
        if permits(self.role, op.allowed()) {
            Ok(())
        } else {
            debug!(user_id = self.user_id, role = %self.role, ?op, "Role gate denied");
            Err(AppError::Unauthorized)
        }
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Self::from_extensions(req))
    }
}
