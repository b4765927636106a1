pub use super::attendance::Entity as Attendance;
pub use super::employee::Entity as Employee;
pub use super::payslip::Entity as Payslip;
pub use super::salary_component::Entity as SalaryComponent;
pub use super::user::Entity as User;
