//! Role gate.
//!
//! Every guarded operation is named in [`Operation`] and its allow-set lives
//! in one table, [`Operation::allowed`]. Handlers either take a [`Gate<P>`]
//! extractor, which runs the authentication and role checks before the
//! handler body, or call [`AuthUser::require`] when the operation depends on
//! the request (role dashboards).

use std::marker::PhantomData;
use std::ops::Deref;

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures::future::{Ready, ready};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Landing page of one role.
    Dashboard(Role),
    ManageUsers,
    AttachEmployee,
    AdminReports,
    HrReports,
    ManageEmployees,
    ManagePayrolls,
    ManageTeams,
    AssignTask,
    ViewTasks,
    ManageOwnLeads,
    OverseeLeads,
    Profile,
}

impl Operation {
    pub fn allowed(self) -> &'static [Role] {
        use Role::*;

        match self {
            Operation::Dashboard(role) => role.only(),
            Operation::ManageUsers | Operation::AttachEmployee | Operation::AdminReports => {
                &[Admin]
            }
            Operation::HrReports => &[Hr],
            Operation::ManageEmployees => &[Hr, HeadHr],
            Operation::ManagePayrolls => &[Hr, HeadHr, Account, HeadAccount],
            Operation::ManageTeams => &[HeadManager],
            Operation::AssignTask | Operation::ViewTasks => &[Manager],
            Operation::ManageOwnLeads => &[Sales],
            Operation::OverseeLeads => &[HeadSales],
            Operation::Profile => Role::all(),
        }
    }
}

#[inline]
pub fn permits(role: Role, allowed: &[Role]) -> bool {
    allowed.contains(&role)
}

/// Compile-time binding of a handler to an [`Operation`].
pub trait Policy {
    const OPERATION: Operation;
}

macro_rules! policies {
    ($($name:ident),* $(,)?) => {
        $(
            pub struct $name;

            impl Policy for $name {
                const OPERATION: Operation = Operation::$name;
            }
        )*
    };
}

pub mod policy {
    use super::{Operation, Policy};

    policies! {
        ManageUsers,
        AttachEmployee,
        AdminReports,
        HrReports,
        ManageEmployees,
        ManagePayrolls,
        ManageTeams,
        AssignTask,
        ViewTasks,
        ManageOwnLeads,
        OverseeLeads,
        Profile,
    }
}

/// Authenticated caller whose role passed the gate of `P`.
pub struct Gate<P> {
    user: AuthUser,
    _policy: PhantomData<fn() -> P>,
}

impl<P> Gate<P> {
    pub fn into_inner(self) -> AuthUser {
        self.user
    }
}

impl<P> Deref for Gate<P> {
    type Target = AuthUser;

    fn deref(&self) -> &AuthUser {
        &self.user
    }
}

impl<P: Policy> FromRequest for Gate<P> {
    type Error = AppError;
    type Future = Ready<Result<Self, AppError>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let gated = AuthUser::from_extensions(req).and_then(|user| {
            user.require(P::OPERATION)?;
            Ok(Gate {
                user,
                _policy: PhantomData,
            })
        });
        ready(gated)
    }
}
