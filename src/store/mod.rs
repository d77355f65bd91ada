//! Storage collaborator.
//!
//! Handlers and services only talk to these traits. Two backends exist:
//! [`MySqlStore`] for deployments and [`MemoryStore`] for tests and demos.
//! Both enforce the same unique constraints and cascades:
//!
//! * identity -> employee -> payroll (delete cascades)
//! * identity (head manager) -> team -> team report (delete cascades)
//! * identity -> team manager/member links (removed)
//! * identity -> lead assignee (set to null)

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use derive_more::Display;
use rust_decimal::Decimal;

use crate::compute::employee_id::EmployeeIdPrefix;
use crate::model::{
    employee::{Employee, EmployeeChanges, EmployeeFields},
    lead::{Lead, LeadChanges, NewLead},
    payroll::{Payroll, PayrollEntry},
    role::Role,
    team::{NewTeam, NewTeamReport, Team, TeamChanges, TeamReport},
    user::{NewUser, User, UserChanges},
};

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Display)]
pub enum StoreError {
    /// Unique or foreign key constraint rejected the write.
    #[display(fmt = "{}", _0)]
    Conflict(String),

    /// The generated employee code was taken by a concurrent insert, or the
    /// allocating transaction lost a lock race. Safe to retry with a fresh code.
    #[display(fmt = "{}", _0)]
    DuplicateCode(String),

    #[display(fmt = "storage backend error: {}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle used as actix app data.
pub type SharedStore = Arc<dyn Store>;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create_user(&self, new: NewUser) -> StoreResult<User>;
    async fn get_user(&self, id: u64) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: u64, changes: UserChanges) -> StoreResult<Option<User>>;
    /// Returns false when no such identity exists.
    async fn delete_user(&self, id: u64) -> StoreResult<bool>;
    async fn record_login(&self, id: u64, at: DateTime<Utc>) -> StoreResult<()>;
    /// All usernames, or only those that logged in since `since`.
    async fn usernames(&self, since: Option<DateTime<Utc>>) -> StoreResult<Vec<String>>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Generates the employee code and inserts the row atomically.
    ///
    /// The existing codes for `prefix` are read and the new row written in a
    /// single transaction. A lost race surfaces as `DuplicateCode`; any
    /// other constraint failure (unknown identity, identity that already has
    /// a record) as `Conflict`.
    async fn insert_employee(
        &self,
        user_id: u64,
        fields: EmployeeFields,
        prefix: &EmployeeIdPrefix,
    ) -> StoreResult<Employee>;
    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>>;
    async fn employee_for_user(&self, user_id: u64) -> StoreResult<Option<Employee>>;
    async fn list_employees(&self) -> StoreResult<Vec<Employee>>;
    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>>;
    async fn count_employees(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait PayrollStore: Send + Sync {
    async fn insert_payroll(&self, entry: PayrollEntry) -> StoreResult<Payroll>;
    async fn get_payroll(&self, id: u64) -> StoreResult<Option<Payroll>>;
    async fn list_payrolls(&self, employee_id: Option<u64>) -> StoreResult<Vec<Payroll>>;
    /// Overwrites every derived column. `created_at` is kept.
    async fn replace_payroll(&self, id: u64, entry: PayrollEntry) -> StoreResult<Option<Payroll>>;
    async fn delete_payroll(&self, id: u64) -> StoreResult<bool>;
    /// Row count and sum of `net_salary`.
    async fn payroll_totals(&self) -> StoreResult<(u64, Decimal)>;
}

#[async_trait]
pub trait TeamStore: Send + Sync {
    async fn create_team(&self, new: NewTeam) -> StoreResult<Team>;
    async fn get_team(&self, id: u64) -> StoreResult<Option<Team>>;
    async fn teams_headed_by(&self, user_id: u64) -> StoreResult<Vec<Team>>;
    async fn teams_managed_by(&self, user_id: u64) -> StoreResult<Vec<Team>>;
    async fn update_team(&self, id: u64, changes: TeamChanges) -> StoreResult<Option<Team>>;
    async fn delete_team(&self, id: u64) -> StoreResult<bool>;
    async fn create_team_report(
        &self,
        team_id: u64,
        report: NewTeamReport,
    ) -> StoreResult<TeamReport>;
    /// Reports of the given teams, newest first.
    async fn reports_for_teams(&self, team_ids: &[u64]) -> StoreResult<Vec<TeamReport>>;
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn create_lead(&self, new: NewLead) -> StoreResult<Lead>;
    async fn get_lead(&self, id: u64) -> StoreResult<Option<Lead>>;
    /// Newest first. `Some(user)` restricts to leads assigned to `user`.
    async fn list_leads(&self, assigned_to: Option<u64>) -> StoreResult<Vec<Lead>>;
    async fn update_lead(&self, id: u64, changes: LeadChanges) -> StoreResult<Option<Lead>>;
    async fn delete_lead(&self, id: u64) -> StoreResult<bool>;
}

pub trait Store: UserStore + EmployeeStore + PayrollStore + TeamStore + LeadStore {}

impl<T> Store for T where T: UserStore + EmployeeStore + PayrollStore + TeamStore + LeadStore {}
