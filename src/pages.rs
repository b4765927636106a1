use actix_web::{http::header::ContentDisposition, web, HttpResponse};
use sea_orm::DatabaseConnection;

use crate::{
    entity::payslip,
    error::PayrollError,
    payroll::directory,
    render::{self, RenderSettings},
};

mod auth;
mod payroll;
mod staff;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(web::scope("/auth")
            .configure(auth::config))
        .service(web::scope("/payroll")
            .configure(payroll::config))
        .service(web::scope("/me")
            .configure(staff::config));
}

/// Renders `payslip` as a PDF download
async fn payslip_document(
    db: &DatabaseConnection,
    settings: &RenderSettings,
    payslip: &payslip::Model,
) -> Result<HttpResponse, PayrollError> {
    let employee = directory::find_employee(db, &payslip.employee_id).await?;
    let rendered = render::render_payslip(payslip, employee.as_ref(), settings)?;

    Ok(
        HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header(ContentDisposition::attachment(rendered.filename))
            .body(rendered.bytes)
    )
}
