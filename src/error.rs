use actix_web::{body, http::{header::ContentType, StatusCode}, HttpResponse};
use sea_orm::DbErr;
use thiserror::Error;

use crate::entity::sea_orm_active_enums::PayslipStatus;

#[derive(Debug, Error)]
pub enum PayrollError {
    #[error("period must not be empty")]
    InvalidPeriod,

    /// Configuration error, a payslip can't be prorated over zero days
    #[error("attendance of `{employee_id}` for `{period}` has {working_days} working days, expected at least 1")]
    InvalidWorkingDays {
        employee_id: String,
        period: String,
        working_days: i32,
    },

    #[error("payslip of `{employee_id}` for `{period}` overflows the currency range")]
    AmountOverflow {
        employee_id: String,
        period: String,
    },

    #[error("employee `{0}` not found")]
    EmployeeNotFound(String),

    #[error("payslip of `{employee_id}` for `{period}` not found")]
    PayslipNotFound {
        employee_id: String,
        period: String,
    },

    #[error("payslip cannot go from {from} to {to}")]
    InvalidTransition {
        from: PayslipStatus,
        to: PayslipStatus,
    },

    #[error("payslip of `{employee_id}` for `{period}` does not reconcile: {reason}")]
    CorruptPayslip {
        employee_id: String,
        period: String,
        reason: String,
    },

    #[error("database error")]
    Database(#[from] DbErr),

    #[error("unable to render document")]
    Render(#[from] lopdf::Error),
}

impl actix_web::error::ResponseError for PayrollError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::plaintext())
            .body(self.to_string())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::InvalidPeriod => StatusCode::BAD_REQUEST,
            PayrollError::InvalidWorkingDays { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PayrollError::AmountOverflow { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PayrollError::EmployeeNotFound(_) => StatusCode::NOT_FOUND,
            PayrollError::PayslipNotFound { .. } => StatusCode::NOT_FOUND,
            PayrollError::InvalidTransition { .. } => StatusCode::CONFLICT,
            PayrollError::CorruptPayslip { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            PayrollError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PayrollError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError as _;

    use super::*;

    #[test]
    fn test_status_codes() {
        let err = PayrollError::InvalidWorkingDays {
            employee_id: "EMP-1".to_string(),
            period: "January 2025".to_string(),
            working_days: 0,
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "attendance of `EMP-1` for `January 2025` has 0 working days, expected at least 1");

        let err = PayrollError::InvalidTransition { from: PayslipStatus::Paid, to: PayslipStatus::Sent };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "payslip cannot go from paid to sent");

        assert_eq!(PayrollError::EmployeeNotFound("EMP-9".to_string()).status_code(), StatusCode::NOT_FOUND);
    }
}
