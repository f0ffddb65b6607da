use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250901_000005_create_placements"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("internship_placements"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("supervisor_id")).big_integer())
                    .col(ColumnDef::new(Alias::new("company_name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("company_address"))
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("company_industry"))
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("position")).string().not_null())
                    .col(ColumnDef::new(Alias::new("start_date")).date().not_null())
                    .col(ColumnDef::new(Alias::new("end_date")).date().not_null())
                    .col(
                        ColumnDef::new(Alias::new("supervisor_name"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("supervisor_email"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("supervisor_whatsapp"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("supervisor_position"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("acceptance_letter_path"))
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string()
                            .not_null()
                            .default("pending_confirmation"),
                    )
                    .col(ColumnDef::new(Alias::new("confirmed_by")).big_integer())
                    .col(ColumnDef::new(Alias::new("confirmed_at")).timestamp())
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("updated_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_placements_student")
                            .from(
                                Alias::new("internship_placements"),
                                Alias::new("student_id"),
                            )
                            .to(Alias::new("student_profiles"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_placements_supervisor")
                            .from(
                                Alias::new("internship_placements"),
                                Alias::new("supervisor_id"),
                            )
                            .to(Alias::new("supervisor_profiles"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_placements_confirmed_by")
                            .from(
                                Alias::new("internship_placements"),
                                Alias::new("confirmed_by"),
                            )
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one ACTIVE placement per student. sea-query's index builder
        // has no WHERE clause, so the partial unique index is raw SQL.
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS ux_placements_one_active_per_student \
                 ON internship_placements (student_id) WHERE status = 'active'",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("internship_placements"))
                    .to_owned(),
            )
            .await
    }
}
