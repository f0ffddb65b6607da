use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250901_000006_create_reports"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("monthly_reports"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("placement_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("month")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("year")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("company_profile")).text())
                    .col(
                        ColumnDef::new(Alias::new("job_description"))
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("work_environment"))
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("useful_skills")).text().not_null())
                    .col(ColumnDef::new(Alias::new("needed_skills")).text().not_null())
                    .col(ColumnDef::new(Alias::new("achievements")).text().not_null())
                    .col(ColumnDef::new(Alias::new("challenges")).text().not_null())
                    .col(
                        ColumnDef::new(Alias::new("next_month_plan"))
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Alias::new("submitted_at")).timestamp())
                    .col(
                        ColumnDef::new(Alias::new("is_late"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Alias::new("reviewed_by")).big_integer())
                    .col(ColumnDef::new(Alias::new("reviewed_at")).timestamp())
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
                            .name("fk_monthly_reports_placement")
                            .from(Alias::new("monthly_reports"), Alias::new("placement_id"))
                            .to(Alias::new("internship_placements"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_monthly_reports_reviewed_by")
                            .from(Alias::new("monthly_reports"), Alias::new("reviewed_by"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // One report per placement per calendar month.
        manager
            .create_index(
                Index::create()
                    .name("ux_monthly_reports_period")
                    .table(Alias::new("monthly_reports"))
                    .col(Alias::new("placement_id"))
                    .col(Alias::new("month"))
                    .col(Alias::new("year"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("report_feedbacks"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("report_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("reviewer_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("content")).text().not_null())
                    .col(
                        ColumnDef::new(Alias::new("requires_revision"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("created_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_feedbacks_report")
                            .from(Alias::new("report_feedbacks"), Alias::new("report_id"))
                            .to(Alias::new("monthly_reports"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_report_feedbacks_reviewer")
                            .from(Alias::new("report_feedbacks"), Alias::new("reviewer_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("report_feedbacks")).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("monthly_reports")).to_owned())
            .await
    }
}
