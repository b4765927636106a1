use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::info;
use uuid::Uuid;

use crate::{entity::{payslip, sea_orm_active_enums::PayslipStatus}, error::PayrollError};

use super::store::PayslipStore;

/// Payslips only move one step forward, generated → sent → paid
pub fn check_transition(from: PayslipStatus, to: PayslipStatus) -> Result<(), PayrollError> {
    match (from, to) {
        (PayslipStatus::Generated, PayslipStatus::Sent) | (PayslipStatus::Sent, PayslipStatus::Paid) => Ok(()),
        _ => Err(PayrollError::InvalidTransition { from, to }),
    }
}

pub async fn advance(
    store: &impl PayslipStore,
    payslip: &payslip::Model,
    to: PayslipStatus,
    actor: Option<Uuid>,
    now: DateTimeWithTimeZone,
) -> Result<payslip::Model, PayrollError> {
    check_transition(payslip.status, to)?;

    let updated = store.update_status(payslip, to, actor, now).await?;

    info!(employee_id = %updated.employee_id, period = %updated.period, status = %updated.status, "Payslip status changed");

    Ok(updated)
}
