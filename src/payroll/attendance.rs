use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{consts::DEFAULT_ATTENDANCE, entity::attendance};

use super::Period;

/// Raw attendance figures, passed through to the payslip untouched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendance {
    pub attendance_days: i32,
    pub working_days: i32,
}

impl Attendance {
    pub fn new(attendance_days: i32, working_days: i32) -> Self {
        Self { attendance_days, working_days }
    }

    pub fn is_full(&self) -> bool {
        self.attendance_days == self.working_days
    }
}

impl Default for Attendance {
    fn default() -> Self {
        Self::new(DEFAULT_ATTENDANCE.0, DEFAULT_ATTENDANCE.1)
    }
}

impl From<&attendance::Model> for Attendance {
    fn from(row: &attendance::Model) -> Self {
        Self::new(row.attendance_days, row.working_days)
    }
}

/// Attendance records keyed by `(employee_id, period)`
#[derive(Debug, Clone, Default)]
pub struct AttendanceBook {
    records: HashMap<(String, Period), Attendance>,
}

impl AttendanceBook {
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a attendance::Model>) -> Self {
        let mut book = Self::default();

        for row in rows {
            match Period::new(&row.period) {
                Ok(period) => book.insert(&row.employee_id, period, Attendance::from(row)),
                Err(_) => warn!(employee_id = %row.employee_id, "Ignoring attendance record without a period"),
            }
        }

        book
    }

    pub fn insert(&mut self, employee_id: &str, period: Period, attendance: Attendance) {
        self.records.insert((employee_id.to_string(), period), attendance);
    }

    /// Recorded attendance, or full attendance on a 22 day month when the
    /// pair was never tracked
    pub fn resolve(&self, employee_id: &str, period: &Period) -> Attendance {
        self.records
            .get(&(employee_id.to_string(), period.clone()))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use uuid::Uuid;

    use super::*;

    fn row(employee_id: &str, period: &str, attendance_days: i32, working_days: i32) -> attendance::Model {
        attendance::Model {
            id: Uuid::new_v4(),
            created_at: Local::now().into(),
            updated_at: Local::now().into(),
            employee_id: employee_id.to_string(),
            period: period.to_string(),
            attendance_days,
            working_days,
        }
    }

    #[test]
    fn test_resolve_recorded() {
        let book = AttendanceBook::from_rows(&[
            row("EMP-2024-001", "January 2025", 20, 22),
            row("EMP-2024-001", "December 2024", 21, 21),
            row("EMP-2024-002", "January  2025", 18, 23),
        ]);

        let january = Period::new("January 2025").unwrap();

        assert_eq!(book.resolve("EMP-2024-001", &january), Attendance::new(20, 22));
        assert_eq!(book.resolve("EMP-2024-002", &january), Attendance::new(18, 23));
        assert_eq!(book.resolve("EMP-2024-001", &Period::new("December 2024").unwrap()), Attendance::new(21, 21));
    }

    #[test]
    fn test_resolve_missing_defaults_to_full_month() {
        let book = AttendanceBook::from_rows(&[row("EMP-2024-001", "January 2025", 20, 22)]);

        let attendance = book.resolve("EMP-2024-003", &Period::new("January 2025").unwrap());
        assert_eq!(attendance, Attendance::new(22, 22));
        assert!(attendance.is_full());

        let attendance = book.resolve("EMP-2024-001", &Period::new("February 2025").unwrap());
        assert_eq!(attendance, Attendance::default());
    }

    #[test]
    fn test_invalid_values_pass_through() {
        let book = AttendanceBook::from_rows(&[
            row("EMP-1", "March 2025", 25, 22),
            row("EMP-2", "March 2025", 3, 0),
            row("EMP-3", "  ", 1, 1),
        ]);

        let march = Period::new("March 2025").unwrap();
        assert_eq!(book.resolve("EMP-1", &march), Attendance::new(25, 22));
        assert_eq!(book.resolve("EMP-2", &march), Attendance::new(3, 0));
    }
}
