use crate::api::{
    employee::{CreateEmployee, EmployeeResponse, UpdateEmployee},
    lead::{AssignLead, CreateLead, UpdateLead},
    payroll::{CreatePayroll, PayrollQuery, UpdatePayroll},
    profile::{ProfileResponse, UpdateProfile},
    reports::{AdminReport, HrReport},
    team::{AssignManagers, CreateTask, CreateTeam, UpdateTeam},
    users::{AttachEmployee, CreateUser, UpdateUser, UserQuery},
};
use crate::model::{
    employee::Employee,
    lead::{Lead, LeadPriority, LeadStatus},
    payroll::Payroll,
    role::Role,
    team::{Team, TeamReport},
    user::User,
};
use crate::models::{LoginReqDto, LoginResponse, RegisterReq};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ERP/CRM API",
        version = "1.0.0",
        description = r#"
## Role-based ERP/CRM

Every identity carries exactly one of sixteen roles and each operation admits a
fixed set of them.

### Key Features
- **Identities**: admin managed users, self-registration as customer
- **Employees**: `YYYYMM####` employee codes generated on first save
- **Payroll**: HRA 20%, allowances 10%, deductions 5%, always derived from the current basic salary
- **Teams**: head managers own teams, managers file tasks against them
- **Leads**: sales work their own pipeline, head sales assign and prune

### Security
Protected endpoints need a **JWT Bearer** token from `/auth/login`.
A missing identity redirects to `/auth/login`, a role mismatch to `/unauthorized`.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::register,
        crate::auth::handlers::logout,

        crate::api::dashboard::dashboard,
        crate::api::dashboard::home,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile,

        crate::api::users::list_users,
        crate::api::users::create_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::users::attach_employee,

        crate::api::reports::admin_reports,
        crate::api::reports::hr_reports,

        crate::api::employee::list_employees,
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::payroll::list_payrolls,
        crate::api::payroll::create_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::delete_payroll,

        crate::api::team::list_teams,
        crate::api::team::create_team,
        crate::api::team::update_team,
        crate::api::team::delete_team,
        crate::api::team::assign_managers,
        crate::api::team::assign_task,
        crate::api::team::list_tasks,

        crate::api::lead::my_leads,
        crate::api::lead::create_lead,
        crate::api::lead::update_lead,
        crate::api::lead::all_leads,
        crate::api::lead::assign_lead,
        crate::api::lead::delete_lead
    ),
    components(
        schemas(
            Role,
            User,
            Employee,
            Payroll,
            Team,
            TeamReport,
            Lead,
            LeadStatus,
            LeadPriority,
            LoginReqDto,
            LoginResponse,
            RegisterReq,
            UserQuery,
            CreateUser,
            UpdateUser,
            AttachEmployee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeResponse,
            CreatePayroll,
            UpdatePayroll,
            PayrollQuery,
            CreateTeam,
            UpdateTeam,
            AssignManagers,
            CreateTask,
            CreateLead,
            UpdateLead,
            AssignLead,
            ProfileResponse,
            UpdateProfile,
            AdminReport,
            HrReport
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Auth", description = "Login, registration and logout"),
        (name = "Dashboard", description = "Role landing pages"),
        (name = "Profile", description = "Self-service profile"),
        (name = "Admin", description = "Identity management"),
        (name = "Reports", description = "Admin and HR summaries"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Payroll", description = "Payroll management APIs"),
        (name = "Team", description = "Teams and team tasks"),
        (name = "Lead", description = "Sales leads"),
    )
)]
pub struct ApiDoc;

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_guarded_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/erp/hr/payrolls/{payroll_id}"));
        assert!(doc.paths.paths.contains_key("/erp/{role}/dashboard"));
        let schemes = doc.components.unwrap().security_schemes;
        assert!(schemes.contains_key("bearer_auth"));
    }
}
