//! Attendance-proportioned payroll.
//!
//! Data flows from the component registry and the attendance lookup into
//! the calculator, whose payslips are either persisted through a
//! [`store::PayslipStore`] or handed to the renderer.

pub mod attendance;
pub mod calculator;
pub mod component;
pub mod directory;
pub mod generate;
pub mod lifecycle;
pub mod period;
pub mod store;

pub use attendance::{Attendance, AttendanceBook};
pub use calculator::{calculate, CalculatedPayslip, DataQualityWarning, PayrollInput};
pub use component::{Calculation, ComponentRegistry, SalaryComponent};
pub use period::Period;
