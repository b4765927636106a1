use actix_web::{dev, get, post, web, FromRequest, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use futures_util::future::LocalBoxFuture;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};

use crate::{
    auth::HrSession,
    entity::{employee, payslip, sea_orm_active_enums::PayslipStatus},
    error::PayrollError,
    payroll::{
        directory, generate, lifecycle,
        store::{PayslipStore as _, WriteContext},
        AttendanceBook, CalculatedPayslip, ComponentRegistry, Period,
    },
    render::RenderSettings,
};

use model::*;

mod extractor;
mod model;

pub(super) fn config(cfg: &mut web::ServiceConfig) {
    cfg
        .service(preview_payroll)
        .service(generate_payroll)
        .service(get_period_payslips)
        .service(send_payslip)
        .service(pay_payslip)
        .service(get_payslip_document);
}

async fn load_inputs(
    db: &DatabaseConnection,
    period: &Period,
) -> Result<(Vec<employee::Model>, AttendanceBook, ComponentRegistry), PayrollError> {
    let employees = directory::active_employees(db).await?;
    let attendance = directory::attendance_for_period(db, period).await?;
    let components = directory::active_components(db).await?;

    Ok((employees, attendance, components))
}

#[get("/{period}/preview")]
async fn preview_payroll(db: web::Data<DatabaseConnection>, _hr: HrSession, period: Period) -> Result<impl Responder, PayrollError> {
    let (employees, attendance, components) = load_inputs(&db, &period).await?;

    let payslips = generate::calculate_period(&period, &employees, &attendance, &components)?;

    Ok(
        web::Json(PayrollPreview {
            period,
            payslip_count: payslips.len(),
            total_net_salary: payslips.iter().fold(0i64, |total, p| total.saturating_add(p.net_salary)),
            payslips,
        })
    )
}

#[post("/{period}/generate")]
async fn generate_payroll(
    db: web::Data<DatabaseConnection>,
    hr: HrSession,
    period: Period,
    payload: Option<web::Json<GeneratePayroll>>,
) -> Result<impl Responder, PayrollError> {
    let payload = payload.map(web::Json::into_inner).unwrap_or_default();

    let (employees, attendance, components) = load_inputs(&db, &period).await?;

    let ctx = WriteContext {
        actor: Some(hr.user_id),
        now: Local::now().fixed_offset(),
        override_finalized: payload.override_finalized,
    };

    let report = generate::generate_payslips(db.get_ref(), &period, &employees, &attendance, &components, ctx).await?;

    Ok(
        HttpResponse::Created()
            .json(web::Json(report))
    )
}

#[get("/{period}/payslips")]
async fn get_period_payslips(db: web::Data<DatabaseConnection>, _hr: HrSession, period: Period) -> Result<impl Responder, PayrollError> {
    let payslips = db.find_for_period(&period).await?;

    Ok(
        web::Json(PeriodPayslips {
            period,
            count: payslips.len(),
            total_net_salary: generate::total_net_salary(&payslips),
            payslips,
        })
    )
}

#[post("/{period}/payslips/{employee_id}/send")]
async fn send_payslip(db: web::Data<DatabaseConnection>, hr: HrSession, payslip: payslip::Model) -> Result<impl Responder, PayrollError> {
    let payslip = lifecycle::advance(db.get_ref(), &payslip, PayslipStatus::Sent, Some(hr.user_id), Local::now().fixed_offset()).await?;

    Ok(web::Json(payslip))
}

#[post("/{period}/payslips/{employee_id}/paid")]
async fn pay_payslip(db: web::Data<DatabaseConnection>, hr: HrSession, payslip: payslip::Model) -> Result<impl Responder, PayrollError> {
    let payslip = lifecycle::advance(db.get_ref(), &payslip, PayslipStatus::Paid, Some(hr.user_id), Local::now().fixed_offset()).await?;

    Ok(web::Json(payslip))
}

#[get("/{period}/payslips/{employee_id}/document")]
async fn get_payslip_document(
    db: web::Data<DatabaseConnection>,
    settings: web::Data<RenderSettings>,
    _hr: HrSession,
    payslip: payslip::Model,
) -> Result<HttpResponse, PayrollError> {
    super::payslip_document(&db, &settings, &payslip).await
}

#[cfg(test)]
mod tests {
    use actix_web::{http::{header, StatusCode}, test, App};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use crate::{
        auth::{tests::{bearer, user}, Authority},
        entity::{attendance, sea_orm_active_enums::RoleType},
        pages::fixtures::{self, SECRET},
        payroll::store::{build_row, Upsert},
    };

    use super::*;

    fn staff() -> Vec<employee::Model> {
        vec![
            fixtures::employee("EMP-2024-001", "Dr. Sarah Johnson", 5000),
            fixtures::employee("EMP-2024-002", "Mr. Michael Chen", 4500),
            fixtures::employee("EMP-2024-003", "Ms. Emily Brown", 4200),
            fixtures::employee("EMP-2024-004", "Mr. David Wilson", 3800),
        ]
    }

    fn hr_header() -> (&'static str, String) {
        bearer(SECRET, &user(RoleType::Hr, None))
    }

    macro_rules! app {
        ($db:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(Authority::new(SECRET)))
                    .app_data(web::Data::new($db.into_connection()))
                    .app_data(web::Data::new(fixtures::settings()))
                    .service(web::scope("/payroll").configure(config))
            ).await
        };
    }

    #[actix_web::test]
    async fn test_preview_payroll() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([staff()])
            .append_query_results([vec![
                fixtures::attendance("EMP-2024-001", "January 2025", 20, 22),
                fixtures::attendance("EMP-2024-003", "January 2025", 21, 22),
            ]])
            .append_query_results([fixtures::components()]);

        let app = app!(db);

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/preview")
            .insert_header(hr_header())
            .to_request();

        let preview: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(preview["period"], "January 2025");
        assert_eq!(preview["payslip_count"], 4);

        let nets = preview["payslips"].as_array().unwrap().iter()
            .map(|p| p["net_salary"].as_i64().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(nets, [4300, 4255, 3769, 3562]);
        assert_eq!(preview["total_net_salary"], 4300 + 4255 + 3769 + 3562);

        let first = &preview["payslips"][0];
        assert_eq!(first["earned_basic"], 4545);
        assert_eq!(first["allowances"][0]["amount"], 455);
        assert_eq!(first["deductions"][0]["name"], "Tax");
        assert_eq!(first["deductions"][0]["amount"], 500);
        assert_eq!(first["deductions"][1]["amount"], 200);
    }

    #[actix_web::test]
    async fn test_preview_rejects_zero_working_days() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([staff()])
            .append_query_results([vec![fixtures::attendance("EMP-2024-002", "January 2025", 0, 0)]])
            .append_query_results([fixtures::components()]);

        let app = app!(db);

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/preview")
            .insert_header(hr_header())
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[actix_web::test]
    async fn test_staff_cannot_run_payroll() {
        let app = app!(MockDatabase::new(DatabaseBackend::Postgres));

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/preview")
            .insert_header(bearer(SECRET, &user(RoleType::Staff, Some("EMP-2024-001"))))
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/preview")
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_generate_payroll() {
        let employees = staff();
        let ctx = WriteContext { actor: None, now: fixtures::time(), override_finalized: false };
        let written = employees.iter()
            .map(|e| build_row(&fixtures::calculated(e, "January 2025", 22, 22), None, Upsert::Insert, &ctx))
            .collect::<Vec<_>>();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([employees])
            .append_query_results([Vec::<attendance::Model>::new()])
            .append_query_results([fixtures::components()])
            .append_query_results([Vec::<payslip::Model>::new()])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 4 }])
            .append_query_results([written]);

        let app = app!(db);

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/generate")
            .method(actix_web::http::Method::POST)
            .insert_header(hr_header())
            .set_json(GeneratePayroll::default())
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let report: serde_json::Value = test::read_body_json(response).await;
        assert_eq!(report["generated"], serde_json::json!(["EMP-2024-001", "EMP-2024-002", "EMP-2024-003", "EMP-2024-004"]));
        assert_eq!(report["skipped"], serde_json::json!([]));
        assert_eq!(report["payslip_count"], 4);
        // Nobody has attendance recorded, so everyone gets the full 22/22
        assert_eq!(report["total_net_salary"], 4750 + 4255 + 3958 + 3562);
    }

    #[actix_web::test]
    async fn test_get_period_payslips() {
        let employees = staff();
        let payslips = vec![
            fixtures::stored(&employees[0], "January 2025", 20, 22),
            fixtures::stored(&employees[1], "January 2025", 22, 22),
        ];

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([payslips.clone()]);

        let app = app!(db);

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/payslips")
            .insert_header(hr_header())
            .to_request();

        let listing: PeriodPayslips = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listing.count, 2);
        assert_eq!(listing.total_net_salary, 4300 + 4255);
        assert_eq!(listing.payslips, payslips);
    }

    #[actix_web::test]
    async fn test_corrupt_payslips_are_reported() {
        let mut payslip = fixtures::stored(&staff()[0], "January 2025", 20, 22);
        payslip.net_salary += 1;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![payslip]]);

        let app = app!(db);

        let req = test::TestRequest::default()
            .uri("/payroll/January%202025/payslips")
            .insert_header(hr_header())
            .to_request();

        let response = test::call_service(&app, req).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn test_payslip_transitions() {
        let generated = fixtures::stored(&staff()[0], "January 2025", 20, 22);
        let sent = payslip::Model {
            status: PayslipStatus::Sent,
            sent_at: Some(fixtures::time()),
            ..generated.clone()
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![ generated.clone() ],
                vec![ sent.clone() ],
                vec![ generated.clone() ],
            ]);

        let app = app!(db);

        {
            let req = test::TestRequest::default()
                .uri("/payroll/January%202025/payslips/EMP-2024-001/send")
                .method(actix_web::http::Method::POST)
                .insert_header(hr_header())
                .to_request();

            let returned: payslip::Model = test::call_and_read_body_json(&app, req).await;
            assert_eq!(returned, sent);
        }

        {
            // Paying skips sending
            let req = test::TestRequest::default()
                .uri("/payroll/January%202025/payslips/EMP-2024-001/paid")
                .method(actix_web::http::Method::POST)
                .insert_header(hr_header())
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }

    #[actix_web::test]
    async fn test_get_payslip_document() {
        let employee = staff().remove(0);
        let payslip = fixtures::stored(&employee, "January 2025", 20, 22);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![ payslip.clone() ]])
            .append_query_results([vec![ employee ]])
            .append_query_results([vec![ payslip ]])
            .append_query_results([Vec::<employee::Model>::new()]);

        let app = app!(db);

        {
            let req = test::TestRequest::default()
                .uri("/payroll/January%202025/payslips/EMP-2024-001/document")
                .insert_header(hr_header())
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/pdf");

            let disposition = response.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap().to_string();
            assert!(disposition.starts_with("attachment"));
            assert!(disposition.contains("Payslip_EMP-2024-001_January_2025.pdf"));

            let body = test::read_body(response).await;
            assert!(body.starts_with(b"%PDF"));
        }

        {
            // Payslip exists but its employee record is gone
            let req = test::TestRequest::default()
                .uri("/payroll/January%202025/payslips/EMP-2024-001/document")
                .insert_header(hr_header())
                .to_request();

            let response = test::call_service(&app, req).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }
}
