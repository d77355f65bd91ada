use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Organizational role tag carried by every identity.
///
/// The string form (`head_manager`, `account`, ...) is what gets persisted,
/// embedded in tokens and used as the dashboard path segment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    Admin,
    Hr,
    HeadHr,
    Employee,
    Manager,
    HeadManager,
    Sales,
    HeadSales,
    Support,
    HeadSupport,
    Tech,
    HeadTech,
    Account,
    HeadAccount,
    #[default]
    Customer,
    HeadCustomer,
}

/// Every role, in declaration order (index == discriminant).
static ALL_ROLES: [Role; 16] = [
    Role::Admin,
    Role::Hr,
    Role::HeadHr,
    Role::Employee,
    Role::Manager,
    Role::HeadManager,
    Role::Sales,
    Role::HeadSales,
    Role::Support,
    Role::HeadSupport,
    Role::Tech,
    Role::HeadTech,
    Role::Account,
    Role::HeadAccount,
    Role::Customer,
    Role::HeadCustomer,
];

impl Role {
    pub fn all() -> &'static [Role] {
        &ALL_ROLES
    }

    /// One-element allow-set containing just this role.
    pub fn only(self) -> &'static [Role] {
        std::slice::from_ref(&ALL_ROLES[self as usize])
    }

    /// Human readable label, as shown in admin listings.
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Hr => "HR",
            Role::HeadHr => "Head HR",
            Role::Employee => "Employee",
            Role::Manager => "Manager",
            Role::HeadManager => "Head Manager",
            Role::Sales => "Sales",
            Role::HeadSales => "Head Sales",
            Role::Support => "Support",
            Role::HeadSupport => "Head Support",
            Role::Tech => "Technician",
            Role::HeadTech => "Head Technician",
            Role::Account => "Accountant",
            Role::HeadAccount => "Head Accountant",
            Role::Customer => "Customer",
            Role::HeadCustomer => "Head Customer",
        }
    }

    pub fn dashboard_path(self, api_prefix: &str) -> String {
        format!("{}/{}/dashboard", api_prefix.trim_end_matches('/'), self)
    }
}
