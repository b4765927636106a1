use std::collections::HashMap;

use sea_orm::{
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
    ActiveEnum as _, ActiveValue::{NotSet, Set, Unchanged}, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel as _, ActiveModelTrait as _, QueryFilter, QueryOrder, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{entity::{payslip, prelude::*, sea_orm_active_enums::PayslipStatus}, error::PayrollError};

use super::{CalculatedPayslip, Period};

/// Columns rewritten when a payslip is generated again.
///
/// Identity and creation columns stay, everything else is replaced as a
/// whole so concurrent generations never leave a half-merged row.
const REGENERATED_COLUMNS: [payslip::Column; 16] = [
    payslip::Column::UpdatedAt,
    payslip::Column::UpdatedBy,
    payslip::Column::BasicSalary,
    payslip::Column::AttendanceDays,
    payslip::Column::WorkingDays,
    payslip::Column::EarnedBasic,
    payslip::Column::Components,
    payslip::Column::TotalAllowances,
    payslip::Column::GrossSalary,
    payslip::Column::TotalDeductions,
    payslip::Column::NetSalary,
    payslip::Column::Status,
    payslip::Column::GeneratedAt,
    payslip::Column::SentAt,
    payslip::Column::PaidAt,
    payslip::Column::OverriddenStatus,
];

/// Who writes and whether finalized payslips may be replaced
#[derive(Debug, Clone, Copy)]
pub struct WriteContext {
    pub actor: Option<Uuid>,
    pub now: DateTimeWithTimeZone,
    pub override_finalized: bool,
}

/// What generation does with the payslip already stored under a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "previous_status", rename_all = "snake_case")]
pub enum Upsert {
    Insert,
    /// Previous payslip was still `generated`
    Replace,
    /// A sent or paid payslip replaced on explicit request
    Override(PayslipStatus),
    /// A sent or paid payslip left alone
    Skip(PayslipStatus),
}

impl Upsert {
    pub fn plan(existing: Option<&payslip::Model>, override_finalized: bool) -> Self {
        match existing.map(|payslip| payslip.status) {
            None => Upsert::Insert,
            Some(PayslipStatus::Generated) => Upsert::Replace,
            Some(status) if override_finalized => Upsert::Override(status),
            Some(status) => Upsert::Skip(status),
        }
    }

    pub fn writes(&self) -> bool {
        !matches!(self, Upsert::Skip(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    pub employee_id: String,
    #[serde(flatten)]
    pub upsert: Upsert,
}

#[derive(Debug, Clone, Default)]
pub struct UpsertOutcome {
    pub outcomes: Vec<KeyOutcome>,
    /// Every payslip of the period after the write
    pub payslips: Vec<payslip::Model>,
}

/// Persistence of generated payslips.
///
/// Implementations must apply [`PayslipStore::upsert_period`] atomically,
/// either every planned row is written or none is.
pub trait PayslipStore {
    async fn find_for_period(&self, period: &Period) -> Result<Vec<payslip::Model>, PayrollError>;

    /// Newest first
    async fn find_for_employee(&self, employee_id: &str) -> Result<Vec<payslip::Model>, PayrollError>;

    async fn find_one(&self, employee_id: &str, period: &Period) -> Result<Option<payslip::Model>, PayrollError>;

    async fn upsert_period(
        &self,
        period: &Period,
        payslips: &[CalculatedPayslip],
        ctx: WriteContext,
    ) -> Result<UpsertOutcome, PayrollError>;

    /// Moves `payslip` to `status` and stamps the matching timestamp.
    ///
    /// Fails with [`PayrollError::InvalidTransition`] if the stored status
    /// is no longer the one `payslip` was read with.
    async fn update_status(
        &self,
        payslip: &payslip::Model,
        status: PayslipStatus,
        actor: Option<Uuid>,
        now: DateTimeWithTimeZone,
    ) -> Result<payslip::Model, PayrollError>;
}

/// Row written for `calculated` given the stored payslip, if any
pub fn build_row(calculated: &CalculatedPayslip, existing: Option<&payslip::Model>, upsert: Upsert, ctx: &WriteContext) -> payslip::Model {
    payslip::Model {
        id: existing.map(|p| p.id).unwrap_or_else(Uuid::new_v4),
        created_at: existing.map(|p| p.created_at).unwrap_or(ctx.now),
        updated_at: ctx.now,
        created_by: existing.map(|p| p.created_by).unwrap_or(ctx.actor),
        updated_by: ctx.actor,
        employee_id: calculated.employee_id.clone(),
        period: calculated.period.to_string(),
        basic_salary: calculated.basic_salary,
        attendance_days: calculated.attendance.attendance_days,
        working_days: calculated.attendance.working_days,
        earned_basic: calculated.earned_basic,
        components: calculated.components(),
        total_allowances: calculated.total_allowances,
        gross_salary: calculated.gross_salary,
        total_deductions: calculated.total_deductions,
        net_salary: calculated.net_salary,
        status: PayslipStatus::Generated,
        generated_at: ctx.now,
        sent_at: None,
        paid_at: None,
        // An override stays on record through later plain regenerations
        overridden_status: match upsert {
            Upsert::Override(status) => Some(status),
            _ => existing.and_then(|p| p.overridden_status),
        },
    }
}

/// Plans every key and builds the rows that will be written
fn prepare(
    payslips: &[CalculatedPayslip],
    existing: &HashMap<String, payslip::Model>,
    ctx: &WriteContext,
) -> (Vec<payslip::Model>, Vec<KeyOutcome>) {
    let mut rows = Vec::new();
    let mut outcomes = Vec::new();

    for calculated in payslips {
        let stored = existing.get(&calculated.employee_id);
        let upsert = Upsert::plan(stored, ctx.override_finalized);

        if upsert.writes() {
            rows.push(build_row(calculated, stored, upsert, ctx));
        }

        outcomes.push(KeyOutcome { employee_id: calculated.employee_id.clone(), upsert });
    }

    (rows, outcomes)
}

/// Reports what actually happened to every key once the write is done.
///
/// Every written row is `generated`, so a planned insert or replace that
/// reads back as sent or paid lost to a concurrent status change and was
/// left alone by the conflict guard.
fn settle(planned: Vec<KeyOutcome>, written: &[payslip::Model]) -> Vec<KeyOutcome> {
    let stored = written.iter()
        .map(|row| (row.employee_id.as_str(), row.status))
        .collect::<HashMap<_, _>>();

    planned.into_iter()
        .map(|outcome| match (outcome.upsert, stored.get(outcome.employee_id.as_str())) {
            (Upsert::Insert | Upsert::Replace, Some(&status)) if status != PayslipStatus::Generated => KeyOutcome {
                upsert: Upsert::Skip(status),
                ..outcome
            },
            _ => outcome,
        })
        .collect()
}

fn reconciled(payslips: Vec<payslip::Model>) -> Result<Vec<payslip::Model>, PayrollError> {
    for payslip in &payslips {
        payslip.reconcile()?;
    }

    Ok(payslips)
}

impl PayslipStore for DatabaseConnection {
    async fn find_for_period(&self, period: &Period) -> Result<Vec<payslip::Model>, PayrollError> {
        let payslips = Payslip::find()
            .filter(payslip::Column::Period.eq(period.as_str()))
            .order_by_asc(payslip::Column::EmployeeId)
            .all(self).await?;

        reconciled(payslips)
    }

    async fn find_for_employee(&self, employee_id: &str) -> Result<Vec<payslip::Model>, PayrollError> {
        let payslips = Payslip::find()
            .filter(payslip::Column::EmployeeId.eq(employee_id))
            .order_by_desc(payslip::Column::GeneratedAt)
            .all(self).await?;

        reconciled(payslips)
    }

    async fn find_one(&self, employee_id: &str, period: &Period) -> Result<Option<payslip::Model>, PayrollError> {
        let payslip = Payslip::find()
            .filter(payslip::Column::EmployeeId.eq(employee_id))
            .filter(payslip::Column::Period.eq(period.as_str()))
            .one(self).await?;

        if let Some(payslip) = &payslip {
            payslip.reconcile()?;
        }

        Ok(payslip)
    }

    async fn upsert_period(
        &self,
        period: &Period,
        payslips: &[CalculatedPayslip],
        ctx: WriteContext,
    ) -> Result<UpsertOutcome, PayrollError> {
        let txn = self.begin().await?;

        let existing = Payslip::find()
            .filter(payslip::Column::Period.eq(period.as_str()))
            .filter(payslip::Column::EmployeeId.is_in(payslips.iter().map(|p| p.employee_id.as_str())))
            .all(&txn).await?
            .into_iter()
            .map(|payslip| (payslip.employee_id.clone(), payslip))
            .collect::<HashMap<_, _>>();

        let (rows, outcomes) = prepare(payslips, &existing, &ctx);

        if !rows.is_empty() {
            let mut on_conflict = OnConflict::columns([payslip::Column::EmployeeId, payslip::Column::Period]);
            on_conflict.update_columns(REGENERATED_COLUMNS);

            // A payslip sent between our read and this write must survive
            if !ctx.override_finalized {
                on_conflict.action_and_where(
                    Expr::col((payslip::Entity, payslip::Column::Status)).eq(PayslipStatus::Generated.as_enum())
                );
            }

            Payslip::insert_many(rows.into_iter().map(|row| row.into_active_model().reset_all()))
                .on_conflict(on_conflict)
                .exec_without_returning(&txn).await?;
        }

        let payslips = Payslip::find()
            .filter(payslip::Column::Period.eq(period.as_str()))
            .order_by_asc(payslip::Column::EmployeeId)
            .all(&txn).await?;

        txn.commit().await?;

        let outcomes = settle(outcomes, &payslips);

        Ok(UpsertOutcome { outcomes, payslips })
    }

    async fn update_status(
        &self,
        payslip: &payslip::Model,
        status: PayslipStatus,
        actor: Option<Uuid>,
        now: DateTimeWithTimeZone,
    ) -> Result<payslip::Model, PayrollError> {
        let (sent_at, paid_at) = match status {
            PayslipStatus::Generated => (NotSet, NotSet),
            PayslipStatus::Sent => (Set(Some(now)), NotSet),
            PayslipStatus::Paid => (NotSet, Set(Some(now))),
        };

        let updated = Payslip::update(payslip::ActiveModel {
            id: Unchanged(payslip.id),
            status: Set(status),
            sent_at,
            paid_at,
            updated_at: Set(now),
            updated_by: Set(actor),
            ..Default::default()
        })
            .filter(payslip::Column::Status.eq(payslip.status))
            .exec(self).await;

        match updated {
            Ok(updated) => Ok(updated),
            Err(DbErr::RecordNotUpdated) => Err(PayrollError::InvalidTransition { from: payslip.status, to: status }),
            Err(err) => Err(err.into()),
        }
    }
}
