use rust_decimal::Decimal;
use serde::Serialize;

use crate::{entity::payslip::{PayslipComponents, PayslipLine}, error::PayrollError};

use super::{component::round_to_unit, Attendance, ComponentRegistry, Period, SalaryComponent};

/// Everything the calculator needs for one employee and period
#[derive(Debug, Clone, Copy)]
pub struct PayrollInput<'a> {
    pub employee_id: &'a str,
    pub period: &'a Period,
    pub basic_salary: i64,
    pub attendance: Attendance,
    pub components: &'a ComponentRegistry,
}

/// Suspicious input that was still calculated as given
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// Negative attendance, or more days attended than there were to work
    AttendanceOutOfRange { attendance_days: i32, working_days: i32 },
    NegativeNetSalary { net_salary: i64 },
}

/// A fully itemized payslip that hasn't been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalculatedPayslip {
    pub employee_id: String,
    pub period: Period,
    pub basic_salary: i64,
    pub attendance: Attendance,
    pub earned_basic: i64,
    pub allowances: Vec<PayslipLine>,
    pub total_allowances: i64,
    pub gross_salary: i64,
    pub deductions: Vec<PayslipLine>,
    pub total_deductions: i64,
    pub net_salary: i64,
    pub warnings: Vec<DataQualityWarning>,
}

impl CalculatedPayslip {
    pub fn components(&self) -> PayslipComponents {
        PayslipComponents {
            allowances: self.allowances.clone(),
            deductions: self.deductions.clone(),
        }
    }
}

/// Calculates a payslip.
///
/// Every amount is rounded when it is computed, so each total is exactly
/// the sum of the lines shown for it. Percentage allowances apply to the
/// earned basic and percentage deductions to the gross salary, which means
/// all allowances are summed before the first deduction is evaluated.
///
/// Fails when the period has no working days. Out of range attendance and
/// negative net salaries are reported as warnings, the numbers are never
/// clamped.
pub fn calculate(input: PayrollInput<'_>) -> Result<CalculatedPayslip, PayrollError> {
    let PayrollInput { employee_id, period, basic_salary, attendance, components } = input;

    if attendance.working_days <= 0 {
        return Err(PayrollError::InvalidWorkingDays {
            employee_id: employee_id.to_string(),
            period: period.to_string(),
            working_days: attendance.working_days,
        });
    }

    let overflow = || PayrollError::AmountOverflow {
        employee_id: employee_id.to_string(),
        period: period.to_string(),
    };

    // Multiply before dividing so full attendance gives back the basic salary exactly
    let earned_basic = Decimal::from(basic_salary)
        .checked_mul(Decimal::from(attendance.attendance_days))
        .and_then(|v| v.checked_div(Decimal::from(attendance.working_days)))
        .and_then(round_to_unit)
        .ok_or_else(overflow)?;

    let (allowances, total_allowances) = itemize(components.allowances(), earned_basic).ok_or_else(overflow)?;
    let gross_salary = earned_basic.checked_add(total_allowances).ok_or_else(overflow)?;

    let (deductions, total_deductions) = itemize(components.deductions(), gross_salary).ok_or_else(overflow)?;
    let net_salary = gross_salary.checked_sub(total_deductions).ok_or_else(overflow)?;

    let mut warnings = Vec::new();
    if attendance.attendance_days < 0 || attendance.attendance_days > attendance.working_days {
        warnings.push(DataQualityWarning::AttendanceOutOfRange {
            attendance_days: attendance.attendance_days,
            working_days: attendance.working_days,
        });
    }
    if net_salary < 0 {
        warnings.push(DataQualityWarning::NegativeNetSalary { net_salary });
    }

    Ok(CalculatedPayslip {
        employee_id: employee_id.to_string(),
        period: period.clone(),
        basic_salary,
        attendance,
        earned_basic,
        allowances,
        total_allowances,
        gross_salary,
        deductions,
        total_deductions,
        net_salary,
        warnings,
    })
}

fn itemize<'a>(components: impl Iterator<Item = &'a SalaryComponent>, base: i64) -> Option<(Vec<PayslipLine>, i64)> {
    let mut lines = Vec::new();
    let mut total = 0i64;

    for component in components {
        let amount = component.calculation.amount(base)?;
        total = total.checked_add(amount)?;
        lines.push(PayslipLine::new(component.name.clone(), amount));
    }

    Some((lines, total))
}
