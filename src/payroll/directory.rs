//! Reads the records payroll consumes from the database.

use sea_orm::{sea_query::Expr, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    entity::{attendance, employee, prelude::*, salary_component, sea_orm_active_enums::EmployeeStatus},
    error::PayrollError,
};

use super::{AttendanceBook, ComponentRegistry, Period};

pub async fn active_employees(db: &impl ConnectionTrait) -> Result<Vec<employee::Model>, PayrollError> {
    let employees = Employee::find()
        .filter(employee::Column::Status.eq(EmployeeStatus::Active))
        .order_by_asc(employee::Column::EmployeeId)
        .all(db).await?;

    Ok(employees)
}

pub async fn find_employee(db: &impl ConnectionTrait, employee_id: &str) -> Result<Option<employee::Model>, PayrollError> {
    let employee = Employee::find()
        .filter(employee::Column::EmployeeId.eq(employee_id))
        .one(db).await?;

    Ok(employee)
}

/// Attendance recorded for `period`, matched on the canonical label so rows
/// stored with stray whitespace are still found
pub async fn attendance_for_period(db: &impl ConnectionTrait, period: &Period) -> Result<AttendanceBook, PayrollError> {
    let rows = Attendance::find()
        .filter(Expr::cust_with_values(
            r#"btrim(regexp_replace("attendance"."period", '\s+', ' ', 'g')) = $1"#,
            [period.as_str()],
        ))
        .all(db).await?;

    Ok(AttendanceBook::from_rows(&rows))
}

/// Active components in the order they were configured
pub async fn active_components(db: &impl ConnectionTrait) -> Result<ComponentRegistry, PayrollError> {
    let rows = SalaryComponent::find()
        .filter(salary_component::Column::IsActive.eq(true))
        .order_by_asc(salary_component::Column::CreatedAt)
        .order_by_asc(salary_component::Column::Id)
        .all(db).await?;

    Ok(ComponentRegistry::from_rows(&rows))
}
