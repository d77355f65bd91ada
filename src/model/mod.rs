pub mod employee;
pub mod lead;
pub mod payroll;
pub mod role;
pub mod team;
pub mod user;
