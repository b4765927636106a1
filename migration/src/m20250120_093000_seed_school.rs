use sea_orm_migration::prelude::*;
use sha2::Digest as _;

use crate::m20250120_090000_init::{Attendance, Employee, SalaryComponent, User};

#[derive(DeriveMigrationName)]
pub struct Migration;

struct Staff {
    employee_id: &'static str,
    name: &'static str,
    department: &'static str,
    position: &'static str,
    basic_salary: i64,
    email: Option<&'static str>,
    phone: Option<&'static str>,
    joining_date: Option<&'static str>,
    /// Attended days out of working days in January 2025
    attendance: (i32, i32),
}

const STAFF: [Staff; 4] = [
    Staff {
        employee_id: "EMP-2024-001",
        name: "Dr. Sarah Johnson",
        department: "Science",
        position: "Senior Teacher",
        basic_salary: 5000,
        email: Some("sarah.johnson@school.edu"),
        phone: Some("+1 234-567-8900"),
        joining_date: Some("2020-03-15"),
        attendance: (20, 22),
    },
    Staff {
        employee_id: "EMP-2024-002",
        name: "Mr. Michael Chen",
        department: "Mathematics",
        position: "Teacher",
        basic_salary: 4500,
        email: None,
        phone: None,
        joining_date: None,
        attendance: (22, 22),
    },
    Staff {
        employee_id: "EMP-2024-003",
        name: "Ms. Emily Brown",
        department: "English",
        position: "Teacher",
        basic_salary: 4200,
        email: None,
        phone: None,
        joining_date: None,
        attendance: (21, 22),
    },
    Staff {
        employee_id: "EMP-2024-004",
        name: "Mr. David Wilson",
        department: "Administration",
        position: "Admin Staff",
        basic_salary: 3800,
        email: None,
        phone: None,
        joining_date: None,
        attendance: (22, 22),
    },
];

/// `(name, component_type, calculation_type, value)`
const COMPONENTS: [(&str, &str, &str, &str); 3] = [
    ("Allowance", "allowance", "percentage", "10"),
    ("Tax", "deduction", "percentage", "10"),
    ("Insurance", "deduction", "fixed", "200"),
];

const PERIOD: &str = "January 2025";

fn uuid(kind: u128, i: usize) -> SimpleExpr {
    Expr::val(format!("{:032x}", (kind << 16) + i as u128)).cast_as("uuid")
}

fn hashed_password(username: &str, password: &str) -> Vec<u8> {
    sha2::Sha256::digest(format!("{password}:{username}")).to_vec()
}

const EMPLOYEE_IDS: u128 = 1;
const ATTENDANCE_IDS: u128 = 2;
const COMPONENT_IDS: u128 = 3;
const USER_IDS: u128 = 4;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let time = Expr::val("2025-01-01T03:30:00.000Z").cast_as("timestamptz");

        for (i, staff) in STAFF.iter().enumerate() {
            let joining_date = match staff.joining_date {
                Some(date) => Expr::val(date).cast_as("date"),
                None => Option::<&str>::None.into(),
            };

            manager
                .exec_stmt(Query::insert()
                    .into_table(Employee::Table)
                    .columns(["id", "created_at", "updated_at", "employee_id", "name", "department", "position", "basic_salary", "email", "phone", "joining_date", "status"])
                    .values_panic([
                        uuid(EMPLOYEE_IDS, i), time.clone(), time.clone(),
                        staff.employee_id.into(), staff.name.into(), staff.department.into(), staff.position.into(),
                        staff.basic_salary.into(), staff.email.into(), staff.phone.into(), joining_date,
                        Expr::val("active").cast_as("employee_status"),
                    ])
                    .to_owned()
            ).await?;

            let (attendance_days, working_days) = staff.attendance;

            manager
                .exec_stmt(Query::insert()
                    .into_table(Attendance::Table)
                    .columns(["id", "created_at", "updated_at", "employee_id", "period", "attendance_days", "working_days"])
                    .values_panic([
                        uuid(ATTENDANCE_IDS, i), time.clone(), time.clone(),
                        staff.employee_id.into(), PERIOD.into(), attendance_days.into(), working_days.into(),
                    ])
                    .to_owned()
            ).await?;

            // Staff sign in with their lowercased employee id as both username and password
            let username = staff.employee_id.to_lowercase();

            manager
                .exec_stmt(Query::insert()
                    .into_table(User::Table)
                    .columns(["id", "created_at", "updated_at", "username", "password", "role", "employee_id"])
                    .values_panic([
                        uuid(USER_IDS, i + 1), time.clone(), time.clone(),
                        username.as_str().into(), hashed_password(&username, &username).into(),
                        Expr::val("staff").cast_as("role_type"), staff.employee_id.into(),
                    ])
                    .to_owned()
            ).await?;
        }

        for (i, (name, component_type, calculation_type, value)) in COMPONENTS.into_iter().enumerate() {
            manager
                .exec_stmt(Query::insert()
                    .into_table(SalaryComponent::Table)
                    .columns(["id", "created_at", "updated_at", "component_name", "component_type", "calculation_type", "value", "is_active"])
                    .values_panic([
                        uuid(COMPONENT_IDS, i), time.clone(), time.clone(), name.into(),
                        Expr::val(component_type).cast_as("component_type"),
                        Expr::val(calculation_type).cast_as("calculation_type"),
                        Expr::val(value).cast_as("numeric"),
                        true.into(),
                    ])
                    .to_owned()
            ).await?;
        }

        // Create an HR account

        manager
            .exec_stmt(Query::insert()
                .into_table(User::Table)
                .columns(["id", "created_at", "updated_at", "username", "password", "role"])
                .values_panic([uuid(USER_IDS, 0), time.clone(), time.clone(), "hr".into(), hashed_password("hr", "hr").into(), Expr::val("hr").cast_as("role_type")])
                .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let seeded = [
            (User::Table.into_iden(), USER_IDS, STAFF.len() + 1),
            (SalaryComponent::Table.into_iden(), COMPONENT_IDS, COMPONENTS.len()),
            (Attendance::Table.into_iden(), ATTENDANCE_IDS, STAFF.len()),
            (Employee::Table.into_iden(), EMPLOYEE_IDS, STAFF.len()),
        ];

        for (table, kind, count) in seeded {
            for i in 0..count {
                manager
                    .exec_stmt(Query::delete()
                        .from_table(table.clone())
                        .and_where(Expr::col("id").eq(uuid(kind, i)))
                        .to_owned()
                ).await?;
            }
        }

        Ok(())
    }
}
