use sea_orm_migration::{prelude::{extension::postgres::TypeDropStatement, *}, sea_orm::{ActiveEnum, DbBackend, DeriveActiveEnum, EnumIter, Schema}};

use crate::{setup_user_table_fk, util::{default_table_statement, default_user_table_statement}};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(DbBackend::Postgres);

        manager.create_type(schema.create_enum_from_active_enum::<RoleType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<EmployeeStatus>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<ComponentType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<CalculationType>()).await?;
        manager.create_type(schema.create_enum_from_active_enum::<PayslipStatus>()).await?;

        manager
            .create_table(default_table_statement()
                .table(Employee::Table)
                .col(ColumnDef::new(Employee::EmployeeId)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(Employee::Name)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::Department)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::Position)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Employee::BasicSalary)
                    .big_integer()
                    .not_null()) // Whole currency units
                .col(ColumnDef::new(Employee::Email)
                    .text())
                .col(ColumnDef::new(Employee::Phone)
                    .text())
                .col(ColumnDef::new(Employee::JoiningDate)
                    .date())
                .col(ColumnDef::new(Employee::Status)
                    .custom(EmployeeStatus::name())
                    .not_null())
                .take()
            ).await?;

        manager
            .create_table(default_table_statement()
                .table(User::Table)
                .col(ColumnDef::new(User::Username)
                    .text()
                    .unique_key()
                    .not_null())
                .col(ColumnDef::new(User::Password)
                    .binary()
                    .not_null()) // SHA-256 of `password:username`
                .col(ColumnDef::new(User::Role)
                    .custom(RoleType::name())
                    .not_null())
                .col(ColumnDef::new(User::EmployeeId)
                    .text())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(User::Table, User::EmployeeId)
            .to(Employee::Table, Employee::EmployeeId)
            .on_delete(ForeignKeyAction::SetNull)
            .on_update(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(Attendance::Table)
                .col(ColumnDef::new(Attendance::EmployeeId)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Attendance::Period)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Attendance::AttendanceDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Attendance::WorkingDays)
                    .integer()
                    .not_null())
                .take()
            ).await?;

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Attendance::Table, Attendance::EmployeeId)
            .to(Employee::Table, Employee::EmployeeId)
            .on_delete(ForeignKeyAction::Cascade)
            .on_update(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        manager.create_index(Index::create()
            .name("idx_attendance_employee_period")
            .table(Attendance::Table)
            .col(Attendance::EmployeeId)
            .col(Attendance::Period)
            .unique()
            .to_owned()
        ).await?;

        manager
            .create_table(default_table_statement()
                .table(SalaryComponent::Table)
                .col(ColumnDef::new(SalaryComponent::ComponentName)
                    .text()
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::ComponentType)
                    .custom(ComponentType::name())
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::CalculationType)
                    .custom(CalculationType::name())
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::Value)
                    .decimal_len(12, 4)
                    .not_null())
                .col(ColumnDef::new(SalaryComponent::IsActive)
                    .boolean()
                    .not_null()
                    .default(true))
                .take()
            ).await?;

        manager
            .create_table(default_user_table_statement()
                .table(Payslip::Table)
                .col(ColumnDef::new(Payslip::EmployeeId)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payslip::Period)
                    .text()
                    .not_null())
                .col(ColumnDef::new(Payslip::BasicSalary)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::AttendanceDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::WorkingDays)
                    .integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::EarnedBasic)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::Components)
                    .json_binary()
                    .not_null())
                .col(ColumnDef::new(Payslip::TotalAllowances)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::GrossSalary)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::TotalDeductions)
                    .big_integer()
                    .not_null())
                .col(ColumnDef::new(Payslip::NetSalary)
                    .big_integer()
                    .not_null()) // May go negative, the calculator never clamps
                .col(ColumnDef::new(Payslip::Status)
                    .custom(PayslipStatus::name())
                    .not_null())
                .col(ColumnDef::new(Payslip::GeneratedAt)
                    .timestamp_with_time_zone()
                    .not_null())
                .col(ColumnDef::new(Payslip::SentAt)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(Payslip::PaidAt)
                    .timestamp_with_time_zone())
                .col(ColumnDef::new(Payslip::OverriddenStatus)
                    .custom(PayslipStatus::name()))
                .take()
            ).await?;
        setup_user_table_fk!(manager, Payslip::Table);

        manager.create_foreign_key(ForeignKeyCreateStatement::new()
            .from(Payslip::Table, Payslip::EmployeeId)
            .to(Employee::Table, Employee::EmployeeId)
            .on_delete(ForeignKeyAction::Restrict)
            .on_update(ForeignKeyAction::Cascade)
            .take()
        ).await?;

        // Generation upserts on this pair
        manager.create_index(Index::create()
            .name("idx_payslip_employee_period")
            .table(Payslip::Table)
            .col(Payslip::EmployeeId)
            .col(Payslip::Period)
            .unique()
            .to_owned()
        ).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(
            TableDropStatement::new()
                .table(Payslip::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(SalaryComponent::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(Attendance::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(User::Table)
                .take()
        ).await?;

        manager.drop_table(
            TableDropStatement::new()
                .table(Employee::Table)
                .take()
        ).await?;

        for name in [PayslipStatus::name(), CalculationType::name(), ComponentType::name(), EmployeeStatus::name(), RoleType::name()] {
            manager.drop_type(
                TypeDropStatement::new()
                    .name(name)
                    .to_owned()
            ).await?;
        }

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum User {
    Table,
    Username,
    Password,
    Role,
    EmployeeId,
}

#[derive(DeriveIden)]
pub(crate) enum Employee {
    Table,
    EmployeeId,
    Name,
    Department,
    Position,
    BasicSalary,
    Email,
    Phone,
    JoiningDate,
    Status,
}

#[derive(DeriveIden)]
pub(crate) enum Attendance {
    Table,
    EmployeeId,
    Period,
    AttendanceDays,
    WorkingDays,
}

#[derive(DeriveIden)]
pub(crate) enum SalaryComponent {
    Table,
    ComponentName,
    ComponentType,
    CalculationType,
    Value,
    IsActive,
}

#[derive(DeriveIden)]
enum Payslip {
    Table,
    EmployeeId,
    Period,
    BasicSalary,
    AttendanceDays,
    WorkingDays,
    EarnedBasic,
    Components,
    TotalAllowances,
    GrossSalary,
    TotalDeductions,
    NetSalary,
    Status,
    GeneratedAt,
    SentAt,
    PaidAt,
    OverriddenStatus,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role_type")]
enum RoleType {
    #[sea_orm(string_value = "hr")]
    Hr,
    #[sea_orm(string_value = "staff")]
    Staff,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "employee_status")]
enum EmployeeStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "component_type")]
enum ComponentType {
    #[sea_orm(string_value = "allowance")]
    Allowance,
    #[sea_orm(string_value = "deduction")]
    Deduction,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "calculation_type")]
enum CalculationType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed")]
    Fixed,
}

#[derive(EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payslip_status")]
enum PayslipStatus {
    #[sea_orm(string_value = "generated")]
    Generated,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "paid")]
    Paid,
}
