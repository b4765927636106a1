use futures_util::future::{ready, Ready};

use crate::payroll::store::PayslipStore as _;

use super::*;

impl FromRequest for Period {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let period = req.match_info().get("period").expect("This extractor must be used under `period` path");

        ready(Period::new(period).map_err(Into::into))
    }
}

/// Payslip addressed by the `period` and `employee_id` path segments
impl FromRequest for payslip::Model {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let period = Period::from_request(&req, &mut dev::Payload::None).await?;
            let employee_id = req.match_info().get("employee_id").expect("This extractor must be used under `employee_id` path");

            let db = req.app_data::<web::Data<DatabaseConnection>>().expect("DatabaseConnection must be attached");

            let Some(payslip) = db.find_one(employee_id, &period).await? else {
                return Err(PayrollError::PayslipNotFound {
                    employee_id: employee_id.to_string(),
                    period: period.to_string(),
                }.into())
            };

            Ok(payslip)
        })
    }
}
