//! In-process store. Every operation runs under one mutex, which makes each
//! call a serializable transaction.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{
    EmployeeStore, LeadStore, PayrollStore, StoreError, StoreResult, TeamStore, UserStore,
};
use crate::compute::employee_id::{EmployeeIdPrefix, next_employee_id};
use crate::model::{
    employee::{Employee, EmployeeChanges, EmployeeFields},
    lead::{Lead, LeadChanges, NewLead},
    payroll::{Payroll, PayrollEntry},
    role::Role,
    team::{NewTeam, NewTeamReport, Team, TeamChanges, TeamReport},
    user::{NewUser, User, UserChanges},
};

#[derive(Default)]
struct Sequences {
    users: u64,
    employees: u64,
    payrolls: u64,
    teams: u64,
    reports: u64,
    leads: u64,
}

fn next(seq: &mut u64) -> u64 {
    *seq += 1;
    *seq
}

#[derive(Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<u64, User>,
    employees: BTreeMap<u64, Employee>,
    payrolls: BTreeMap<u64, Payroll>,
    teams: BTreeMap<u64, Team>,
    reports: BTreeMap<u64, TeamReport>,
    leads: BTreeMap<u64, Lead>,
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<u64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.username.eq_ignore_ascii_case(username))
    }

    fn require_users(&self, ids: &[u64]) -> StoreResult<()> {
        match ids.iter().find(|id| !self.users.contains_key(id)) {
            Some(missing) => Err(StoreError::Conflict(format!(
                "identity {missing} does not exist"
            ))),
            None => Ok(()),
        }
    }

    fn remove_team(&mut self, team_id: u64) -> bool {
        let removed = self.teams.remove(&team_id).is_some();
        if removed {
            self.reports.retain(|_, r| r.team_id != team_id);
        }
        removed
    }

    fn remove_employee(&mut self, employee_id: u64) {
        self.employees.remove(&employee_id);
        self.payrolls.retain(|_, p| p.employee_id != employee_id);
    }
}

fn dedup(mut ids: Vec<u64>) -> Vec<u64> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, u64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let mut t = self.lock();
        if t.username_taken(&new.username, None) {
            return Err(StoreError::Conflict("username already exists".into()));
        }
        let user = User {
            id: next(&mut t.seq.users),
            username: new.username,
            password_hash: new.password_hash,
            role: new.role,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            is_active: new.is_active,
            last_login_at: None,
            created_at: Utc::now(),
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: u64) -> StoreResult<Option<User>> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: u64, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut t = self.lock();
        if let Some(username) = &changes.username {
            if t.users.contains_key(&id) && t.username_taken(username, Some(id)) {
                return Err(StoreError::Conflict("username already exists".into()));
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.username {
            user.username = v;
        }
        if let Some(v) = changes.password_hash {
            user.password_hash = v;
        }
        if let Some(v) = changes.role {
            user.role = v;
        }
        if let Some(v) = changes.first_name {
            user.first_name = v;
        }
        if let Some(v) = changes.last_name {
            user.last_name = v;
        }
        if let Some(v) = changes.email {
            user.email = v;
        }
        if let Some(v) = changes.is_active {
            user.is_active = v;
        }
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let mut t = self.lock();
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }

        let employees: Vec<u64> = t
            .employees
            .values()
            .filter(|e| e.user_id == id)
            .map(|e| e.id)
            .collect();
        for employee_id in employees {
            t.remove_employee(employee_id);
        }

        let headed: Vec<u64> = t
            .teams
            .values()
            .filter(|team| team.head_manager_id == id)
            .map(|team| team.id)
            .collect();
        for team_id in headed {
            t.remove_team(team_id);
        }
        for team in t.teams.values_mut() {
            team.manager_ids.retain(|m| *m != id);
            team.member_ids.retain(|m| *m != id);
        }

        for lead in t.leads.values_mut() {
            if lead.assigned_to == Some(id) {
                lead.assigned_to = None;
            }
        }
        Ok(true)
    }

    async fn record_login(&self, id: u64, at: DateTime<Utc>) -> StoreResult<()> {
        if let Some(user) = self.lock().users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn usernames(&self, since: Option<DateTime<Utc>>) -> StoreResult<Vec<String>> {
        Ok(self
            .lock()
            .users
            .values()
            .filter(|u| match since {
                Some(since) => u.last_login_at.is_some_and(|at| at >= since),
                None => true,
            })
            .map(|u| u.username.clone())
            .collect())
    }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
    async fn insert_employee(
        &self,
        user_id: u64,
        fields: EmployeeFields,
        prefix: &EmployeeIdPrefix,
    ) -> StoreResult<Employee> {
        let mut t = self.lock();
        t.require_users(&[user_id])?;
        if t.employees.values().any(|e| e.user_id == user_id) {
            return Err(StoreError::Conflict(format!(
                "identity {user_id} already has an employee record"
            )));
        }

        let code = next_employee_id(prefix, t.employees.values().map(|e| e.employee_id.as_str()));
        if t.employees.values().any(|e| e.employee_id == code) {
            return Err(StoreError::DuplicateCode(format!("duplicate employee_id {code}")));
        }

        let employee = Employee {
            id: next(&mut t.seq.employees),
            user_id,
            employee_id: code,
            department: fields.department,
            designation: fields.designation,
            contact_number: fields.contact_number,
            basic_salary: fields.basic_salary,
            photo: fields.photo,
        };
        t.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(self.lock().employees.get(&id).cloned())
    }

    async fn employee_for_user(&self, user_id: u64) -> StoreResult<Option<Employee>> {
        Ok(self
            .lock()
            .employees
            .values()
            .find(|e| e.user_id == user_id)
            .cloned())
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(self.lock().employees.values().cloned().collect())
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        let mut t = self.lock();
        let Some(employee) = t.employees.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.department {
            employee.department = v;
        }
        if let Some(v) = changes.designation {
            employee.designation = v;
        }
        if let Some(v) = changes.contact_number {
            employee.contact_number = v;
        }
        if let Some(v) = changes.basic_salary {
            employee.basic_salary = v;
        }
        if let Some(v) = changes.photo {
            employee.photo = v;
        }
        Ok(Some(employee.clone()))
    }

    async fn count_employees(&self) -> StoreResult<u64> {
        Ok(self.lock().employees.len() as u64)
    }
}

#[async_trait]
impl PayrollStore for MemoryStore {
    async fn insert_payroll(&self, entry: PayrollEntry) -> StoreResult<Payroll> {
        let mut t = self.lock();
        if !t.employees.contains_key(&entry.employee_id) {
            return Err(StoreError::Conflict(format!(
                "employee {} does not exist",
                entry.employee_id
            )));
        }
        let b = entry.breakdown;
        let payroll = Payroll {
            id: next(&mut t.seq.payrolls),
            employee_id: entry.employee_id,
            month: entry.month,
            year: entry.year,
            basic_salary: b.basic,
            hra: b.hra,
            allowances: b.allowances,
            deductions: b.deductions,
            net_salary: b.net,
            created_at: Utc::now(),
        };
        t.payrolls.insert(payroll.id, payroll.clone());
        Ok(payroll)
    }

    async fn get_payroll(&self, id: u64) -> StoreResult<Option<Payroll>> {
        Ok(self.lock().payrolls.get(&id).cloned())
    }

    async fn list_payrolls(&self, employee_id: Option<u64>) -> StoreResult<Vec<Payroll>> {
        let mut rows: Vec<Payroll> = self
            .lock()
            .payrolls
            .values()
            .filter(|p| employee_id.is_none_or(|e| p.employee_id == e))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn replace_payroll(&self, id: u64, entry: PayrollEntry) -> StoreResult<Option<Payroll>> {
        let mut t = self.lock();
        if !t.employees.contains_key(&entry.employee_id) {
            return Err(StoreError::Conflict(format!(
                "employee {} does not exist",
                entry.employee_id
            )));
        }
        let Some(payroll) = t.payrolls.get_mut(&id) else {
            return Ok(None);
        };
        let b = entry.breakdown;
        payroll.employee_id = entry.employee_id;
        payroll.month = entry.month;
        payroll.year = entry.year;
        payroll.basic_salary = b.basic;
        payroll.hra = b.hra;
        payroll.allowances = b.allowances;
        payroll.deductions = b.deductions;
        payroll.net_salary = b.net;
        Ok(Some(payroll.clone()))
    }

    async fn delete_payroll(&self, id: u64) -> StoreResult<bool> {
        Ok(self.lock().payrolls.remove(&id).is_some())
    }

    async fn payroll_totals(&self) -> StoreResult<(u64, Decimal)> {
        let t = self.lock();
        let total: Decimal = t.payrolls.values().map(|p| p.net_salary).sum();
        Ok((t.payrolls.len() as u64, total))
    }
}

#[async_trait]
impl TeamStore for MemoryStore {
    async fn create_team(&self, new: NewTeam) -> StoreResult<Team> {
        let mut t = self.lock();
        t.require_users(&[new.head_manager_id])?;
        t.require_users(&new.manager_ids)?;
        t.require_users(&new.member_ids)?;
        let team = Team {
            id: next(&mut t.seq.teams),
            name: new.name,
            head_manager_id: new.head_manager_id,
            manager_ids: dedup(new.manager_ids),
            member_ids: dedup(new.member_ids),
        };
        t.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn get_team(&self, id: u64) -> StoreResult<Option<Team>> {
        Ok(self.lock().teams.get(&id).cloned())
    }

    async fn teams_headed_by(&self, user_id: u64) -> StoreResult<Vec<Team>> {
        Ok(self
            .lock()
            .teams
            .values()
            .filter(|team| team.head_manager_id == user_id)
            .cloned()
            .collect())
    }

    async fn teams_managed_by(&self, user_id: u64) -> StoreResult<Vec<Team>> {
        Ok(self
            .lock()
            .teams
            .values()
            .filter(|team| team.manager_ids.contains(&user_id))
            .cloned()
            .collect())
    }

    async fn update_team(&self, id: u64, changes: TeamChanges) -> StoreResult<Option<Team>> {
        let mut t = self.lock();
        if let Some(ids) = &changes.manager_ids {
            t.require_users(ids)?;
        }
        if let Some(ids) = &changes.member_ids {
            t.require_users(ids)?;
        }
        let Some(team) = t.teams.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            team.name = name;
        }
        if let Some(ids) = changes.manager_ids {
            team.manager_ids = dedup(ids);
        }
        if let Some(ids) = changes.member_ids {
            team.member_ids = dedup(ids);
        }
        Ok(Some(team.clone()))
    }

    async fn delete_team(&self, id: u64) -> StoreResult<bool> {
        Ok(self.lock().remove_team(id))
    }

    async fn create_team_report(
        &self,
        team_id: u64,
        report: NewTeamReport,
    ) -> StoreResult<TeamReport> {
        let mut t = self.lock();
        if !t.teams.contains_key(&team_id) {
            return Err(StoreError::Conflict(format!("team {team_id} does not exist")));
        }
        let report = TeamReport {
            id: next(&mut t.seq.reports),
            team_id,
            title: report.title,
            description: report.description,
            created_at: Utc::now(),
        };
        t.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn reports_for_teams(&self, team_ids: &[u64]) -> StoreResult<Vec<TeamReport>> {
        let mut rows: Vec<TeamReport> = self
            .lock()
            .reports
            .values()
            .filter(|r| team_ids.contains(&r.team_id))
            .cloned()
            .collect();
        newest_first(&mut rows, |r| (r.created_at, r.id));
        Ok(rows)
    }
}

#[async_trait]
impl LeadStore for MemoryStore {
    async fn create_lead(&self, new: NewLead) -> StoreResult<Lead> {
        let mut t = self.lock();
        if let Some(assignee) = new.assigned_to {
            t.require_users(&[assignee])?;
        }
        let now = Utc::now();
        let lead = Lead {
            id: next(&mut t.seq.leads),
            name: new.name,
            email: new.email,
            phone: new.phone,
            company: new.company,
            status: new.status,
            priority: new.priority,
            assigned_to: new.assigned_to,
            notes: new.notes,
            created_at: now,
            updated_at: now,
        };
        t.leads.insert(lead.id, lead.clone());
        Ok(lead)
    }

    async fn get_lead(&self, id: u64) -> StoreResult<Option<Lead>> {
        Ok(self.lock().leads.get(&id).cloned())
    }

    async fn list_leads(&self, assigned_to: Option<u64>) -> StoreResult<Vec<Lead>> {
        let mut rows: Vec<Lead> = self
            .lock()
            .leads
            .values()
            .filter(|l| assigned_to.is_none_or(|user| l.assigned_to == Some(user)))
            .cloned()
            .collect();
        newest_first(&mut rows, |l| (l.created_at, l.id));
        Ok(rows)
    }

    async fn update_lead(&self, id: u64, changes: LeadChanges) -> StoreResult<Option<Lead>> {
        let mut t = self.lock();
        if let Some(Some(assignee)) = changes.assigned_to {
            t.require_users(&[assignee])?;
        }
        let Some(lead) = t.leads.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.status {
            lead.status = v;
        }
        if let Some(v) = changes.priority {
            lead.priority = v;
        }
        if let Some(v) = changes.notes {
            lead.notes = v;
        }
        if let Some(v) = changes.assigned_to {
            lead.assigned_to = v;
        }
        lead.updated_at = Utc::now();
        Ok(Some(lead.clone()))
    }

    async fn delete_lead(&self, id: u64) -> StoreResult<bool> {
        Ok(self.lock().leads.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::payroll::PayrollBreakdown;
    use crate::model::lead::{LeadPriority, LeadStatus};
    use chrono::NaiveDate;

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.into(),
            password_hash: "x".into(),
            role,
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            is_active: true,
        }
    }

    fn fields(basic: i64) -> EmployeeFields {
        EmployeeFields {
            department: "Ops".into(),
            designation: "Clerk".into(),
            contact_number: "555".into(),
            basic_salary: Decimal::new(basic, 0),
            photo: None,
        }
    }

    fn prefix() -> EmployeeIdPrefix {
        EmployeeIdPrefix::for_date(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
    }

    #[tokio::test]
    async fn usernames_are_unique_ignoring_case() {
        let store = MemoryStore::new();
        store.create_user(new_user("alice", Role::Hr)).await.unwrap();
        let err = store.create_user(new_user("ALICE", Role::Hr)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn employee_codes_follow_the_month_sequence() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("a", Role::Employee)).await.unwrap();
        let b = store.create_user(new_user("b", Role::Employee)).await.unwrap();
        let ea = store.insert_employee(a.id, fields(100), &prefix()).await.unwrap();
        let eb = store.insert_employee(b.id, fields(100), &prefix()).await.unwrap();
        assert_eq!(ea.employee_id, "2025100001");
        assert_eq!(eb.employee_id, "2025100002");

        let again = store.insert_employee(a.id, fields(100), &prefix()).await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn deleting_identity_cascades_to_employee_and_payrolls() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("e", Role::Employee)).await.unwrap();
        let other = store.create_user(new_user("o", Role::Employee)).await.unwrap();
        let emp = store.insert_employee(user.id, fields(50_000), &prefix()).await.unwrap();
        let keep = store.insert_employee(other.id, fields(10), &prefix()).await.unwrap();
        for (employee_id, month) in [(emp.id, "January"), (emp.id, "February"), (keep.id, "March")] {
            store
                .insert_payroll(PayrollEntry {
                    employee_id,
                    month: month.into(),
                    year: 2025,
                    breakdown: PayrollBreakdown::from_basic(Decimal::new(100, 0)),
                })
                .await
                .unwrap();
        }

        assert!(store.delete_user(user.id).await.unwrap());
        assert!(store.get_employee(emp.id).await.unwrap().is_none());
        assert!(store.list_payrolls(Some(emp.id)).await.unwrap().is_empty());
        assert_eq!(store.list_payrolls(None).await.unwrap().len(), 1);
        assert!(!store.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_team_cascades_to_reports() {
        let store = MemoryStore::new();
        let head = store.create_user(new_user("h", Role::HeadManager)).await.unwrap();
        let team = store
            .create_team(NewTeam {
                name: "Core".into(),
                head_manager_id: head.id,
                manager_ids: vec![],
                member_ids: vec![],
            })
            .await
            .unwrap();
        for title in ["one", "two"] {
            store
                .create_team_report(
                    team.id,
                    NewTeamReport {
                        title: title.into(),
                        description: String::new(),
                    },
                )
                .await
                .unwrap();
        }
        assert_eq!(store.reports_for_teams(&[team.id]).await.unwrap().len(), 2);

        assert!(store.delete_team(team.id).await.unwrap());
        assert!(store.reports_for_teams(&[team.id]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_identity_unlinks_teams_and_leads() {
        let store = MemoryStore::new();
        let head = store.create_user(new_user("h", Role::HeadManager)).await.unwrap();
        let manager = store.create_user(new_user("m", Role::Manager)).await.unwrap();
        let seller = store.create_user(new_user("s", Role::Sales)).await.unwrap();
        let team = store
            .create_team(NewTeam {
                name: "Core".into(),
                head_manager_id: head.id,
                manager_ids: vec![manager.id, manager.id],
                member_ids: vec![],
            })
            .await
            .unwrap();
        assert_eq!(team.manager_ids, vec![manager.id]);
        let lead = store
            .create_lead(NewLead {
                name: "Acme".into(),
                email: None,
                phone: None,
                company: None,
                status: LeadStatus::Open,
                priority: LeadPriority::High,
                assigned_to: Some(seller.id),
                notes: None,
            })
            .await
            .unwrap();

        store.delete_user(manager.id).await.unwrap();
        store.delete_user(seller.id).await.unwrap();

        let team = store.get_team(team.id).await.unwrap().unwrap();
        assert!(team.manager_ids.is_empty());
        let lead = store.get_lead(lead.id).await.unwrap().unwrap();
        assert_eq!(lead.assigned_to, None);

        store.delete_user(head.id).await.unwrap();
        assert!(store.get_team(team.id).await.unwrap().is_none());
    }
}
