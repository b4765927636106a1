use sea_orm::{entity::prelude::*, FromJsonQueryResult};
use serde::{Deserialize, Serialize};

use crate::error::PayrollError;

use super::sea_orm_active_enums::PayslipStatus;

/// A generated payslip, unique on `(employee_id, period)`.
///
/// Monetary columns are whole currency units. Only `status` and the
/// status timestamps change after generation, unless the payslip is
/// regenerated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payslip")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub employee_id: String,
    #[sea_orm(column_type = "Text")]
    pub period: String,
    pub basic_salary: i64,
    pub attendance_days: i32,
    pub working_days: i32,
    pub earned_basic: i64,
    #[sea_orm(column_type = "JsonBinary")]
    pub components: PayslipComponents,
    pub total_allowances: i64,
    pub gross_salary: i64,
    pub total_deductions: i64,
    pub net_salary: i64,
    pub status: PayslipStatus,
    pub generated_at: DateTimeWithTimeZone,
    pub sent_at: Option<DateTimeWithTimeZone>,
    pub paid_at: Option<DateTimeWithTimeZone>,
    /// Set when a sent/paid payslip was explicitly regenerated
    pub overridden_status: Option<PayslipStatus>,
}

/// One itemized allowance or deduction, already rounded
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipLine {
    pub name: String,
    pub amount: i64,
}

impl PayslipLine {
    pub fn new(name: impl Into<String>, amount: i64) -> Self {
        Self { name: name.into(), amount }
    }
}

/// Itemized lines in the order their components were configured
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PayslipComponents {
    pub allowances: Vec<PayslipLine>,
    pub deductions: Vec<PayslipLine>,
}

impl PayslipComponents {
    /// `None` when the lines overflow
    pub fn allowance_total(&self) -> Option<i64> {
        checked_total(&self.allowances)
    }

    pub fn deduction_total(&self) -> Option<i64> {
        checked_total(&self.deductions)
    }
}

fn checked_total(lines: &[PayslipLine]) -> Option<i64> {
    lines.iter().try_fold(0i64, |total, line| total.checked_add(line.amount))
}

impl Model {
    /// Checks that every stored total agrees with its lines.
    ///
    /// Rows are written by the calculator so this only trips on rows
    /// that were edited behind our back.
    pub fn reconcile(&self) -> Result<(), PayrollError> {
        let corrupt = |reason: &str| PayrollError::CorruptPayslip {
            employee_id: self.employee_id.clone(),
            period: self.period.clone(),
            reason: reason.to_string(),
        };

        if self.components.allowance_total() != Some(self.total_allowances) {
            return Err(corrupt("total allowances differ from allowance lines"));
        }
        if self.components.deduction_total() != Some(self.total_deductions) {
            return Err(corrupt("total deductions differ from deduction lines"));
        }
        if self.earned_basic.checked_add(self.total_allowances) != Some(self.gross_salary) {
            return Err(corrupt("gross salary differs from earned basic plus allowances"));
        }
        if self.gross_salary.checked_sub(self.total_deductions) != Some(self.net_salary) {
            return Err(corrupt("net salary differs from gross salary minus deductions"));
        }

        Ok(())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::EmployeeId",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Employee,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
