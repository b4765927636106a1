pub mod layout;
pub mod money;
pub mod pdf;

use tracing::debug;

use crate::{entity::{employee, payslip}, error::PayrollError, payroll::Period};

use self::money::CurrencyFormat;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub institution_name: String,
    pub currency: CurrencyFormat,
}

#[derive(Debug, Clone)]
pub struct RenderedPayslip {
    pub filename: String,
    pub pages: usize,
    pub bytes: Vec<u8>,
}

pub fn payslip_filename(employee_id: &str, period: &Period) -> String {
    format!("Payslip_{employee_id}_{}.pdf", period.file_slug())
}

/// Renders a stored payslip into a PDF.
///
/// The payslip has to reconcile and belong to `employee`, a missing or
/// different employee is reported as not found.
pub fn render_payslip(
    payslip: &payslip::Model,
    employee: Option<&employee::Model>,
    settings: &RenderSettings,
) -> Result<RenderedPayslip, PayrollError> {
    let employee = employee
        .filter(|employee| employee.employee_id == payslip.employee_id)
        .ok_or_else(|| PayrollError::EmployeeNotFound(payslip.employee_id.clone()))?;

    payslip.reconcile()?;

    let period = Period::new(&payslip.period)?;
    let pages = layout::layout(payslip, employee, settings);
    let bytes = pdf::write_pdf(&pages)?;

    debug!(employee_id = %payslip.employee_id, %period, pages = pages.len(), size = bytes.len(), "Rendered payslip");

    Ok(RenderedPayslip {
        filename: payslip_filename(&payslip.employee_id, &period),
        pages: pages.len(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use crate::entity::payslip::PayslipLine;

    use super::{layout::tests::{settings, standard_employee, standard_payslip}, *};

    #[test]
    fn test_payslip_filename() {
        let period = Period::new("January 2025").unwrap();
        assert_eq!(payslip_filename("EMP-2024-001", &period), "Payslip_EMP-2024-001_January_2025.pdf");
    }

    #[test]
    fn test_render_payslip() {
        let rendered = render_payslip(&standard_payslip(), Some(&standard_employee()), &settings()).unwrap();

        assert_eq!(rendered.filename, "Payslip_EMP-2024-001_January_2025.pdf");
        assert_eq!(rendered.pages, 1);
        assert!(rendered.bytes.starts_with(b"%PDF"));

        let again = render_payslip(&standard_payslip(), Some(&standard_employee()), &settings()).unwrap();
        assert_eq!(rendered.bytes, again.bytes);
    }

    #[test]
    fn test_missing_employee() {
        let err = render_payslip(&standard_payslip(), None, &settings()).unwrap_err();
        assert!(matches!(err, PayrollError::EmployeeNotFound(ref id) if id == "EMP-2024-001"));

        let mut other = standard_employee();
        other.employee_id = "EMP-2024-002".to_string();
        let err = render_payslip(&standard_payslip(), Some(&other), &settings()).unwrap_err();
        assert!(matches!(err, PayrollError::EmployeeNotFound(_)));
    }

    #[test]
    fn test_corrupt_payslip_is_not_rendered() {
        let mut payslip = standard_payslip();
        payslip.components.allowances.push(PayslipLine::new("Bonus", 100));

        let err = render_payslip(&payslip, Some(&standard_employee()), &settings()).unwrap_err();
        assert!(matches!(err, PayrollError::CorruptPayslip { .. }));
    }
}
