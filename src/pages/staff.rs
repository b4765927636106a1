use actix_web::{get, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;

use crate::{auth::StaffSession, error::PayrollError, payroll::{store::PayslipStore as _, Period}, render::RenderSettings};

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(get_own_payslips)
        .service(get_own_payslip_document);
}

#[get("/payslips")]
async fn get_own_payslips(db: web::Data<DatabaseConnection>, staff: StaffSession) -> Result<impl Responder, PayrollError> {
    let payslips = db.find_for_employee(&staff.employee_id).await?;

    Ok(web::Json(payslips))
}

#[get("/payslips/{period}/document")]
async fn get_own_payslip_document(
    db: web::Data<DatabaseConnection>,
    settings: web::Data<RenderSettings>,
    staff: StaffSession,
    period: Period,
) -> Result<HttpResponse, PayrollError> {
    let Some(payslip) = db.find_one(&staff.employee_id, &period).await? else {
        return Err(PayrollError::PayslipNotFound { employee_id: staff.employee_id, period: period.to_string() })
    };

    super::payslip_document(&db, &settings, &payslip).await
}
