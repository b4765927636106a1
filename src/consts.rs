/// Assumed `(attendance_days, working_days)` for a period nobody tracked yet.
///
/// A policy default rather than the school calendar, record attendance
/// explicitly when the month has a different number of working days.
pub const DEFAULT_ATTENDANCE: (i32, i32) = (22, 22);

pub const DEFAULT_INSTITUTION_NAME: &str = "SCHOOL MANAGEMENT SYSTEM";

pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
