use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::error::ErrorKind;
use sqlx::mysql::MySqlDatabaseError;
use sqlx::{FromRow, MySql, MySqlPool, QueryBuilder};

use super::{
    EmployeeStore, LeadStore, PayrollStore, StoreError, StoreResult, TeamStore, UserStore,
};
use crate::compute::employee_id::{EmployeeIdPrefix, next_employee_id};
use crate::model::{
    employee::{Employee, EmployeeChanges, EmployeeFields},
    lead::{Lead, LeadChanges, LeadPriority, LeadStatus, NewLead},
    payroll::{Payroll, PayrollEntry},
    role::Role,
    team::{NewTeam, NewTeamReport, Team, TeamChanges, TeamReport},
    user::{NewUser, User, UserChanges},
};

// ER_LOCK_DEADLOCK, ER_LOCK_WAIT_TIMEOUT
const RETRYABLE_MYSQL_ERRORS: [u16; 2] = [1213, 1205];

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if matches!(
                db_err.kind(),
                ErrorKind::UniqueViolation | ErrorKind::ForeignKeyViolation
            ) {
                return StoreError::Conflict(db_err.message().to_string());
            }
            if db_err
                .try_downcast_ref::<MySqlDatabaseError>()
                .is_some_and(|e| RETRYABLE_MYSQL_ERRORS.contains(&e.number()))
            {
                return StoreError::Conflict(db_err.message().to_string());
            }
        }
        StoreError::Backend(err.to_string())
    }
}

const EMPLOYEE_CODE_KEY: &str = "uq_employees_employee_id";

/// Like the plain conversion, but reports a taken employee code or a lost
/// lock race during code allocation as `DuplicateCode`.
fn code_allocation_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let code_taken = matches!(db_err.kind(), ErrorKind::UniqueViolation)
            && db_err.message().contains(EMPLOYEE_CODE_KEY);
        let lock_race = db_err
            .try_downcast_ref::<MySqlDatabaseError>()
            .is_some_and(|e| RETRYABLE_MYSQL_ERRORS.contains(&e.number()));
        if code_taken || lock_race {
            return StoreError::DuplicateCode(db_err.message().to_string());
        }
    }
    err.into()
}

const USER_COLUMNS: &str = "id, username, password, role, first_name, last_name, email, \
                            is_active, last_login_at, created_at";
const EMPLOYEE_COLUMNS: &str =
    "id, user_id, employee_id, department, designation, contact_number, basic_salary, photo";
const PAYROLL_COLUMNS: &str = "id, employee_id, month, year, basic_salary, hra, allowances, \
                               deductions, net_salary, created_at";
const LEAD_COLUMNS: &str = "id, name, email, phone, company, status, priority, assigned_to, \
                            notes, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: u64,
    username: String,
    password: String,
    role: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::from_str(&row.role)
            .map_err(|_| StoreError::Backend(format!("unknown role tag {:?}", row.role)))?;
        Ok(User {
            id: row.id,
            username: row.username,
            password_hash: row.password,
            role,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct TeamRow {
    id: u64,
    name: String,
    head_manager_id: u64,
}

#[derive(FromRow)]
struct LeadRow {
    id: u64,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    company: Option<String>,
    status: String,
    priority: String,
    assigned_to: Option<u64>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<LeadRow> for Lead {
    type Error = StoreError;

    fn try_from(row: LeadRow) -> Result<Self, Self::Error> {
        let status = LeadStatus::from_str(&row.status)
            .map_err(|_| StoreError::Backend(format!("unknown lead status {:?}", row.status)))?;
        let priority = LeadPriority::from_str(&row.priority).map_err(|_| {
            StoreError::Backend(format!("unknown lead priority {:?}", row.priority))
        })?;
        Ok(Lead {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            status,
            priority,
            assigned_to: row.assigned_to,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn users_from_rows(rows: Vec<UserRow>) -> StoreResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

fn leads_from_rows(rows: Vec<LeadRow>) -> StoreResult<Vec<Lead>> {
    rows.into_iter().map(Lead::try_from).collect()
}

fn inserted<T>(row: Option<T>, what: &str) -> StoreResult<T> {
    row.ok_or_else(|| StoreError::Backend(format!("{what} vanished after insert")))
}

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn team_links(
        &self,
        table: &str,
        team_ids: &[u64],
    ) -> StoreResult<HashMap<u64, Vec<u64>>> {
        let mut links: HashMap<u64, Vec<u64>> = HashMap::new();
        if team_ids.is_empty() {
            return Ok(links);
        }

        let mut qb = QueryBuilder::<MySql>::new(format!(
            "SELECT team_id, user_id FROM {table} WHERE team_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for id in team_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY user_id");

        let rows: Vec<(u64, u64)> = qb.build_query_as().fetch_all(&self.pool).await?;
        for (team_id, user_id) in rows {
            links.entry(team_id).or_default().push(user_id);
        }
        Ok(links)
    }

    async fn hydrate_teams(&self, rows: Vec<TeamRow>) -> StoreResult<Vec<Team>> {
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        let mut managers = self.team_links("team_managers", &ids).await?;
        let mut members = self.team_links("team_members", &ids).await?;

        Ok(rows
            .into_iter()
            .map(|r| Team {
                id: r.id,
                name: r.name,
                head_manager_id: r.head_manager_id,
                manager_ids: managers.remove(&r.id).unwrap_or_default(),
                member_ids: members.remove(&r.id).unwrap_or_default(),
            })
            .collect())
    }
}

async fn replace_links(
    tx: &mut sqlx::Transaction<'_, MySql>,
    table: &str,
    team_id: u64,
    user_ids: &[u64],
) -> StoreResult<()> {
    sqlx::query(&format!("DELETE FROM {table} WHERE team_id = ?"))
        .bind(team_id)
        .execute(&mut **tx)
        .await?;

    let mut unique = user_ids.to_vec();
    unique.sort_unstable();
    unique.dedup();
    if unique.is_empty() {
        return Ok(());
    }

    let mut qb = QueryBuilder::<MySql>::new(format!("INSERT INTO {table} (team_id, user_id) "));
    qb.push_values(unique, |mut row, user_id| {
        row.push_bind(team_id).push_bind(user_id);
    });
    qb.build().execute(&mut **tx).await?;
    Ok(())
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn create_user(&self, new: NewUser) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password, role, first_name, last_name, email, is_active)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.username)
        .bind(&new.password_hash)
        .bind(new.role.as_ref())
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(new.is_active)
        .execute(&self.pool)
        .await?;

        inserted(self.get_user(result.last_insert_id()).await?, "user")
    }

    async fn get_user(&self, id: u64) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let rows = match role {
            Some(role) => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {USER_COLUMNS} FROM users WHERE role = ? ORDER BY id"
                ))
                .bind(role.as_ref())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, UserRow>(&format!(
                    "SELECT {USER_COLUMNS} FROM users ORDER BY id"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        users_from_rows(rows)
    }

    async fn update_user(&self, id: u64, changes: UserChanges) -> StoreResult<Option<User>> {
        let mut qb = QueryBuilder::<MySql>::new("UPDATE users SET ");
        let mut touched = false;
        {
            let mut set = qb.separated(", ");
            if let Some(v) = changes.username {
                set.push("username = ").push_bind_unseparated(v);
                touched = true;
            }
            if let Some(v) = changes.password_hash {
                set.push("password = ").push_bind_unseparated(v);
                touched = true;
            }
            if let Some(v) = changes.role {
                set.push("role = ").push_bind_unseparated(v.as_ref().to_string());
                touched = true;
            }
            if let Some(v) = changes.first_name {
                set.push("first_name = ").push_bind_unseparated(v);
                touched = true;
            }
            if let Some(v) = changes.last_name {
                set.push("last_name = ").push_bind_unseparated(v);
                touched = true;
            }
            if let Some(v) = changes.email {
                set.push("email = ").push_bind_unseparated(v);
                touched = true;
            }
            if let Some(v) = changes.is_active {
                set.push("is_active = ").push_bind_unseparated(v);
                touched = true;
            }
        }

        if touched {
            qb.push(" WHERE id = ").push_bind(id);
            qb.build().execute(&self.pool).await?;
        }
        self.get_user(id).await
    }

    async fn delete_user(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn record_login(&self, id: u64, at: DateTime<Utc>) -> StoreResult<()> {
        sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn usernames(&self, since: Option<DateTime<Utc>>) -> StoreResult<Vec<String>> {
        let names = match since {
            Some(since) => {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT username
                    FROM users
                    WHERE last_login_at >= ?
                    ORDER BY last_login_at DESC
                    "#,
                )
                .bind(since)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, String>("SELECT username FROM users")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(names)
    }
}

#[async_trait]
impl EmployeeStore for MySqlStore {
    async fn insert_employee(
        &self,
        user_id: u64,
        fields: EmployeeFields,
        prefix: &EmployeeIdPrefix,
    ) -> StoreResult<Employee> {
        let mut tx = self.pool.begin().await?;

        // Locks the month's index range so concurrent inserts queue up here.
        let existing: Vec<String> = sqlx::query_scalar(
            "SELECT employee_id FROM employees WHERE employee_id LIKE ? FOR UPDATE",
        )
        .bind(format!("{prefix}%"))
        .fetch_all(&mut *tx)
        .await
        .map_err(code_allocation_error)?;

        let code = next_employee_id(prefix, existing.iter().map(String::as_str));

        let result = sqlx::query(
            r#"
            INSERT INTO employees
                (user_id, employee_id, department, designation, contact_number, basic_salary, photo)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&code)
        .bind(&fields.department)
        .bind(&fields.designation)
        .bind(&fields.contact_number)
        .bind(fields.basic_salary)
        .bind(&fields.photo)
        .execute(&mut *tx)
        .await
        .map_err(code_allocation_error)?;

        tx.commit().await.map_err(code_allocation_error)?;

        inserted(self.get_employee(result.last_insert_id()).await?, "employee")
    }

    async fn get_employee(&self, id: u64) -> StoreResult<Option<Employee>> {
        Ok(sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn employee_for_user(&self, user_id: u64) -> StoreResult<Option<Employee>> {
        Ok(sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE user_id = ?"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_employees(&self) -> StoreResult<Vec<Employee>> {
        Ok(sqlx::query_as::<_, Employee>(&format!(
            "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> StoreResult<Option<Employee>> {
        if !changes.is_empty() {
            let mut qb = QueryBuilder::<MySql>::new("UPDATE employees SET ");
            {
                let mut set = qb.separated(", ");
                if let Some(v) = changes.department {
                    set.push("department = ").push_bind_unseparated(v);
                }
                if let Some(v) = changes.designation {
                    set.push("designation = ").push_bind_unseparated(v);
                }
                if let Some(v) = changes.contact_number {
                    set.push("contact_number = ").push_bind_unseparated(v);
                }
                if let Some(v) = changes.basic_salary {
                    set.push("basic_salary = ").push_bind_unseparated(v);
                }
                if let Some(v) = changes.photo {
                    set.push("photo = ").push_bind_unseparated(v);
                }
            }
            qb.push(" WHERE id = ").push_bind(id);
            qb.build().execute(&self.pool).await?;
        }
        self.get_employee(id).await
    }

    async fn count_employees(&self) -> StoreResult<u64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
            .fetch_one(&self.pool)
            .await?;
        Ok(total as u64)
    }
}

#[async_trait]
impl PayrollStore for MySqlStore {
    async fn insert_payroll(&self, entry: PayrollEntry) -> StoreResult<Payroll> {
        let b = entry.breakdown;
        let result = sqlx::query(
            r#"
            INSERT INTO payrolls
                (employee_id, month, year, basic_salary, hra, allowances, deductions, net_salary)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.employee_id)
        .bind(&entry.month)
        .bind(entry.year)
        .bind(b.basic)
        .bind(b.hra)
        .bind(b.allowances)
        .bind(b.deductions)
        .bind(b.net)
        .execute(&self.pool)
        .await?;

        inserted(self.get_payroll(result.last_insert_id()).await?, "payroll")
    }

    async fn get_payroll(&self, id: u64) -> StoreResult<Option<Payroll>> {
        Ok(sqlx::query_as::<_, Payroll>(&format!(
            "SELECT {PAYROLL_COLUMNS} FROM payrolls WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn list_payrolls(&self, employee_id: Option<u64>) -> StoreResult<Vec<Payroll>> {
        let rows = match employee_id {
            Some(employee_id) => {
                sqlx::query_as::<_, Payroll>(&format!(
                    "SELECT {PAYROLL_COLUMNS} FROM payrolls WHERE employee_id = ? ORDER BY id DESC"
                ))
                .bind(employee_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Payroll>(&format!(
                    "SELECT {PAYROLL_COLUMNS} FROM payrolls ORDER BY id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows)
    }

    async fn replace_payroll(&self, id: u64, entry: PayrollEntry) -> StoreResult<Option<Payroll>> {
        let b = entry.breakdown;
        sqlx::query(
            r#"
            UPDATE payrolls
            SET employee_id = ?, month = ?, year = ?, basic_salary = ?,
                hra = ?, allowances = ?, deductions = ?, net_salary = ?
            WHERE id = ?
            "#,
        )
        .bind(entry.employee_id)
        .bind(&entry.month)
        .bind(entry.year)
        .bind(b.basic)
        .bind(b.hra)
        .bind(b.allowances)
        .bind(b.deductions)
        .bind(b.net)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get_payroll(id).await
    }

    async fn delete_payroll(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM payrolls WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn payroll_totals(&self) -> StoreResult<(u64, Decimal)> {
        let (count, total): (i64, Option<Decimal>) =
            sqlx::query_as("SELECT COUNT(*), SUM(net_salary) FROM payrolls")
                .fetch_one(&self.pool)
                .await?;
        Ok((count as u64, total.unwrap_or_default()))
    }
}

#[async_trait]
impl TeamStore for MySqlStore {
    async fn create_team(&self, new: NewTeam) -> StoreResult<Team> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("INSERT INTO teams (name, head_manager_id) VALUES (?, ?)")
            .bind(&new.name)
            .bind(new.head_manager_id)
            .execute(&mut *tx)
            .await?;
        let team_id = result.last_insert_id();

        replace_links(&mut tx, "team_managers", team_id, &new.manager_ids).await?;
        replace_links(&mut tx, "team_members", team_id, &new.member_ids).await?;
        tx.commit().await?;

        inserted(self.get_team(team_id).await?, "team")
    }

    async fn get_team(&self, id: u64) -> StoreResult<Option<Team>> {
        let row = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, head_manager_id FROM teams WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate_teams(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn teams_headed_by(&self, user_id: u64) -> StoreResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(
            "SELECT id, name, head_manager_id FROM teams WHERE head_manager_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_teams(rows).await
    }

    async fn teams_managed_by(&self, user_id: u64) -> StoreResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(
            r#"
            SELECT t.id, t.name, t.head_manager_id
            FROM teams t
            JOIN team_managers m ON m.team_id = t.id
            WHERE m.user_id = ?
            ORDER BY t.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate_teams(rows).await
    }

    async fn update_team(&self, id: u64, changes: TeamChanges) -> StoreResult<Option<Team>> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<u64> = sqlx::query_scalar("SELECT id FROM teams WHERE id = ? FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }

        if let Some(name) = &changes.name {
            sqlx::query("UPDATE teams SET name = ? WHERE id = ?")
                .bind(name)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }
        if let Some(ids) = &changes.manager_ids {
            replace_links(&mut tx, "team_managers", id, ids).await?;
        }
        if let Some(ids) = &changes.member_ids {
            replace_links(&mut tx, "team_members", id, ids).await?;
        }
        tx.commit().await?;

        self.get_team(id).await
    }

    async fn delete_team(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM teams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_team_report(
        &self,
        team_id: u64,
        report: NewTeamReport,
    ) -> StoreResult<TeamReport> {
        let result =
            sqlx::query("INSERT INTO team_reports (team_id, title, description) VALUES (?, ?, ?)")
                .bind(team_id)
                .bind(&report.title)
                .bind(&report.description)
                .execute(&self.pool)
                .await?;

        let row = sqlx::query_as::<_, TeamReport>(
            "SELECT id, team_id, title, description, created_at FROM team_reports WHERE id = ?",
        )
        .bind(result.last_insert_id())
        .fetch_optional(&self.pool)
        .await?;
        inserted(row, "team report")
    }

    async fn reports_for_teams(&self, team_ids: &[u64]) -> StoreResult<Vec<TeamReport>> {
        if team_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<MySql>::new(
            "SELECT id, team_id, title, description, created_at FROM team_reports WHERE team_id IN (",
        );
        let mut ids = qb.separated(", ");
        for id in team_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY created_at DESC, id DESC");

        Ok(qb.build_query_as::<TeamReport>().fetch_all(&self.pool).await?)
    }
}

#[async_trait]
impl LeadStore for MySqlStore {
    async fn create_lead(&self, new: NewLead) -> StoreResult<Lead> {
        let result = sqlx::query(
            r#"
            INSERT INTO leads
                (name, email, phone, company, status, priority, assigned_to, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&new.company)
        .bind(new.status.as_ref())
        .bind(new.priority.as_ref())
        .bind(new.assigned_to)
        .bind(&new.notes)
        .execute(&self.pool)
        .await?;

        inserted(self.get_lead(result.last_insert_id()).await?, "lead")
    }

    async fn get_lead(&self, id: u64) -> StoreResult<Option<Lead>> {
        let row = sqlx::query_as::<_, LeadRow>(&format!(
            "SELECT {LEAD_COLUMNS} FROM leads WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Lead::try_from).transpose()
    }

    async fn list_leads(&self, assigned_to: Option<u64>) -> StoreResult<Vec<Lead>> {
        let rows = match assigned_to {
            Some(user_id) => {
                sqlx::query_as::<_, LeadRow>(&format!(
                    "SELECT {LEAD_COLUMNS} FROM leads WHERE assigned_to = ? \
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, LeadRow>(&format!(
                    "SELECT {LEAD_COLUMNS} FROM leads ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        leads_from_rows(rows)
    }

    async fn update_lead(&self, id: u64, changes: LeadChanges) -> StoreResult<Option<Lead>> {
        let mut qb = QueryBuilder::<MySql>::new("UPDATE leads SET updated_at = CURRENT_TIMESTAMP");
        if let Some(v) = changes.status {
            qb.push(", status = ").push_bind(v.as_ref().to_string());
        }
        if let Some(v) = changes.priority {
            qb.push(", priority = ").push_bind(v.as_ref().to_string());
        }
        if let Some(v) = changes.notes {
            qb.push(", notes = ").push_bind(v);
        }
        if let Some(v) = changes.assigned_to {
            qb.push(", assigned_to = ").push_bind(v);
        }
        qb.push(" WHERE id = ").push_bind(id);
        qb.build().execute(&self.pool).await?;

        self.get_lead(id).await
    }

    async fn delete_lead(&self, id: u64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM leads WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
