//! Migration: Create students table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::Name).string().not_null())
                    .col(
                        ColumnDef::new(Students::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::Password).string().not_null())
                    .col(ColumnDef::new(Students::StudentType).string().not_null())
                    .col(ColumnDef::new(Students::EnrollmentDate).date().not_null())
                    .to_owned(),
            )
            .await?;

        // Years-of-studying filter scans by enrollment date
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_students_enrollment_date")
                    .table(Students::Table)
                    .col(Students::EnrollmentDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Students {
    Table,
    Id,
    Name,
    Email,
    Password,
    StudentType,
    EnrollmentDate,
}
