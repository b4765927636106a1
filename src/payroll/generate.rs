use serde::Serialize;
use tracing::{info, warn};

use crate::{entity::{employee, payslip, sea_orm_active_enums::PayslipStatus}, error::PayrollError};

use super::{
    calculate, store::{PayslipStore, Upsert, WriteContext}, AttendanceBook, CalculatedPayslip, ComponentRegistry,
    DataQualityWarning, PayrollInput, Period,
};

/// Calculates one payslip per employee without storing anything.
///
/// The first employee whose attendance can't be prorated fails the whole
/// period.
pub fn calculate_period(
    period: &Period,
    employees: &[employee::Model],
    attendance: &AttendanceBook,
    components: &ComponentRegistry,
) -> Result<Vec<CalculatedPayslip>, PayrollError> {
    employees.iter()
        .map(|employee| calculate(PayrollInput {
            employee_id: &employee.employee_id,
            period,
            basic_salary: employee.basic_salary,
            attendance: attendance.resolve(&employee.employee_id, period),
            components,
        }))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeWarning {
    pub employee_id: String,
    pub warning: DataQualityWarning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalizedPayslip {
    pub employee_id: String,
    pub status: PayslipStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationReport {
    pub generated: Vec<String>,
    pub replaced: Vec<String>,
    pub overridden: Vec<FinalizedPayslip>,
    pub skipped: Vec<FinalizedPayslip>,
    pub warnings: Vec<EmployeeWarning>,
    pub payslip_count: usize,
    pub total_net_salary: i64,
}

/// Net payroll of `payslips`, saturating instead of overflowing
pub fn total_net_salary<'a>(payslips: impl IntoIterator<Item = &'a payslip::Model>) -> i64 {
    payslips.into_iter().fold(0i64, |total, p| total.saturating_add(p.net_salary))
}

/// Generates and stores the payslips of `period` for every employee given.
///
/// Nothing is written unless every payslip calculates. Payslips already
/// sent or paid are kept unless `ctx.override_finalized` is set, in which
/// case the override is logged against the acting user.
pub async fn generate_payslips(
    store: &impl PayslipStore,
    period: &Period,
    employees: &[employee::Model],
    attendance: &AttendanceBook,
    components: &ComponentRegistry,
    ctx: WriteContext,
) -> Result<GenerationReport, PayrollError> {
    let calculated = calculate_period(period, employees, attendance, components)?;

    let mut report = GenerationReport::default();

    for payslip in &calculated {
        for warning in &payslip.warnings {
            warn!(employee_id = %payslip.employee_id, %period, ?warning, "Payslip needs review");

            report.warnings.push(EmployeeWarning {
                employee_id: payslip.employee_id.clone(),
                warning: *warning,
            });
        }
    }

    let outcome = store.upsert_period(period, &calculated, ctx).await?;

    for key in outcome.outcomes {
        match key.upsert {
            Upsert::Insert => report.generated.push(key.employee_id),
            Upsert::Replace => report.replaced.push(key.employee_id),
            Upsert::Override(status) => {
                warn!(employee_id = %key.employee_id, %period, %status, actor = ?ctx.actor, "Regenerated a finalized payslip");
                report.overridden.push(FinalizedPayslip { employee_id: key.employee_id, status });
            },
            Upsert::Skip(status) => report.skipped.push(FinalizedPayslip { employee_id: key.employee_id, status }),
        }
    }

    report.payslip_count = outcome.payslips.len();
    report.total_net_salary = total_net_salary(&outcome.payslips);

    info!(
        %period,
        generated = report.generated.len(),
        replaced = report.replaced.len(),
        overridden = report.overridden.len(),
        skipped = report.skipped.len(),
        "Generated payslips"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use crate::{
        entity::sea_orm_active_enums::EmployeeStatus,
        payroll::{lifecycle, store::memory::MemoryStore, Attendance, Calculation, SalaryComponent},
    };

    use super::*;

    fn employee(employee_id: &str, basic_salary: i64) -> employee::Model {
        employee::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id: employee_id.to_string(),
            name: format!("Staff {employee_id}"),
            department: "Science".to_string(),
            position: "Teacher".to_string(),
            basic_salary,
            email: None,
            phone: None,
            joining_date: None,
            status: EmployeeStatus::Active,
        }
    }

    fn components() -> ComponentRegistry {
        ComponentRegistry::new(vec![
            SalaryComponent::allowance("Allowance", Calculation::Percentage(dec!(10))),
            SalaryComponent::deduction("Tax", Calculation::Percentage(dec!(10))),
            SalaryComponent::deduction("Insurance", Calculation::Fixed(dec!(200))),
        ])
    }

    fn ctx(override_finalized: bool) -> WriteContext {
        WriteContext { actor: Some(Uuid::new_v4()), now: Local::now().into(), override_finalized }
    }

    fn january() -> Period {
        Period::new("January 2025").unwrap()
    }

    #[test]
    fn test_calculate_period() {
        let period = january();
        let employees = [employee("EMP-2024-001", 5000), employee("EMP-2024-002", 4500)];

        let mut attendance = AttendanceBook::default();
        attendance.insert("EMP-2024-001", period.clone(), Attendance::new(20, 22));

        let payslips = calculate_period(&period, &employees, &attendance, &components()).unwrap();

        assert_eq!(payslips.len(), 2);
        assert_eq!(payslips[0].net_salary, 4300);
        assert_eq!(payslips[1].attendance, Attendance::new(22, 22));
        assert_eq!(payslips[1].earned_basic, 4500);
    }

    #[actix_web::test]
    async fn test_configuration_error_writes_nothing() {
        let store = MemoryStore::default();
        let period = january();
        let employees = [employee("EMP-2024-001", 5000), employee("EMP-2024-002", 4500)];

        let mut attendance = AttendanceBook::default();
        attendance.insert("EMP-2024-002", period.clone(), Attendance::new(0, 0));

        let err = generate_payslips(&store, &period, &employees, &attendance, &components(), ctx(false)).await.unwrap_err();

        assert!(matches!(err, PayrollError::InvalidWorkingDays { ref employee_id, .. } if employee_id == "EMP-2024-002"));
        assert_eq!(store.len(), 0);
    }

    #[actix_web::test]
    async fn test_regenerating_keeps_one_payslip_per_key() {
        let store = MemoryStore::default();
        let period = january();
        let mut employees = vec![employee("EMP-2024-001", 5000), employee("EMP-2024-002", 4500)];

        let report = generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(false)).await.unwrap();
        assert_eq!(report.generated, ["EMP-2024-001", "EMP-2024-002"]);
        assert_eq!(report.payslip_count, 2);

        // A raise lands between the two runs
        employees[0].basic_salary = 6000;

        let report = generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(false)).await.unwrap();
        assert!(report.generated.is_empty());
        assert_eq!(report.replaced, ["EMP-2024-001", "EMP-2024-002"]);
        assert_eq!(store.len(), 2);

        let payslip = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        assert_eq!(payslip.basic_salary, 6000);
        assert_eq!(payslip.earned_basic, 6000);
        // 6000 + 600 - 660 - 200
        assert_eq!(payslip.net_salary, 5740);
        assert_eq!(report.total_net_salary, 5740 + 4255);
    }

    #[actix_web::test]
    async fn test_finalized_payslips_need_an_override() {
        let store = MemoryStore::default();
        let period = january();
        let mut employees = vec![employee("EMP-2024-001", 5000), employee("EMP-2024-002", 4500)];

        generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(false)).await.unwrap();

        let first = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        let sent = lifecycle::advance(&store, &first, PayslipStatus::Sent, None, Local::now().into()).await.unwrap();

        employees[0].basic_salary = 9000;
        employees[1].basic_salary = 9000;

        let report = generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(false)).await.unwrap();
        assert_eq!(report.skipped, [FinalizedPayslip { employee_id: "EMP-2024-001".to_string(), status: PayslipStatus::Sent }]);
        assert_eq!(report.replaced, ["EMP-2024-002"]);

        let untouched = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        assert_eq!(untouched, sent);

        let overriding = ctx(true);
        let report = generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), overriding).await.unwrap();
        assert_eq!(report.overridden, [FinalizedPayslip { employee_id: "EMP-2024-001".to_string(), status: PayslipStatus::Sent }]);
        assert!(report.skipped.is_empty());

        let replaced = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        assert_eq!(replaced.id, sent.id);
        assert_eq!(replaced.basic_salary, 9000);
        assert_eq!(replaced.status, PayslipStatus::Generated);
        assert_eq!(replaced.sent_at, None);
        assert_eq!(replaced.overridden_status, Some(PayslipStatus::Sent));
        assert_eq!(replaced.updated_by, overriding.actor);
        assert_eq!(store.len(), 2);
    }

    #[actix_web::test]
    async fn test_override_stays_on_record() {
        let store = MemoryStore::default();
        let period = january();
        let employees = [employee("EMP-2024-001", 5000)];

        generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(false)).await.unwrap();

        let generated = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        let sent = lifecycle::advance(&store, &generated, PayslipStatus::Sent, None, Local::now().into()).await.unwrap();
        lifecycle::advance(&store, &sent, PayslipStatus::Paid, None, Local::now().into()).await.unwrap();

        generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(true)).await.unwrap();
        let overridden = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        assert_eq!(overridden.overridden_status, Some(PayslipStatus::Paid));

        let report = generate_payslips(&store, &period, &employees, &AttendanceBook::default(), &components(), ctx(false)).await.unwrap();
        assert_eq!(report.replaced, ["EMP-2024-001"]);

        let regenerated = store.find_one("EMP-2024-001", &period).await.unwrap().unwrap();
        assert_eq!(regenerated.status, PayslipStatus::Generated);
        assert_eq!(regenerated.overridden_status, Some(PayslipStatus::Paid));
    }

    #[actix_web::test]
    async fn test_warnings_are_reported() {
        let store = MemoryStore::default();
        let period = january();
        let employees = [employee("EMP-2024-001", 1000)];

        let mut attendance = AttendanceBook::default();
        attendance.insert("EMP-2024-001", period.clone(), Attendance::new(23, 22));

        let deductions = ComponentRegistry::new(vec![
            SalaryComponent::deduction("Loan", Calculation::Fixed(dec!(2000))),
        ]);

        let report = generate_payslips(&store, &period, &employees, &attendance, &deductions, ctx(false)).await.unwrap();

        assert_eq!(
            report.warnings,
            [
                EmployeeWarning {
                    employee_id: "EMP-2024-001".to_string(),
                    warning: DataQualityWarning::AttendanceOutOfRange { attendance_days: 23, working_days: 22 },
                },
                EmployeeWarning {
                    employee_id: "EMP-2024-001".to_string(),
                    warning: DataQualityWarning::NegativeNetSalary { net_salary: -955 },
                },
            ]
        );
        assert_eq!(report.total_net_salary, -955);
    }
}
