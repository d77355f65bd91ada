//! Orchestration between handlers and the store: validation, the employee
//! code retry loop, payroll pricing and the role rules of teams and leads.

pub mod employees;
pub mod leads;
pub mod payrolls;
pub mod teams;
pub mod users;
pub mod validate;
