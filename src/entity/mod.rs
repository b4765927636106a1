pub mod prelude;

pub mod attendance;
pub mod employee;
pub mod payslip;
pub mod salary_component;
pub mod sea_orm_active_enums;
pub mod user;
