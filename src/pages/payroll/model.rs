use super::*;

#[derive(Debug, Default, Serialize, Deserialize)]
pub(super) struct GeneratePayroll {
    /// Also replace payslips that were already sent or paid
    #[serde(default)]
    pub(super) override_finalized: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct PayrollPreview {
    pub(super) period: Period,
    pub(super) payslip_count: usize,
    pub(super) total_net_salary: i64,
    pub(super) payslips: Vec<CalculatedPayslip>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct PeriodPayslips {
    pub(super) period: Period,
    pub(super) count: usize,
    pub(super) total_net_salary: i64,
    pub(super) payslips: Vec<payslip::Model>,
}
