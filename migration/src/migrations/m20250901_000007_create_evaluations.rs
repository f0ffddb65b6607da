use sea_orm_migration::prelude::*;

const RATING_COLUMNS: [&str; 23] = [
    "accuracy",
    "neatness",
    "task_completion",
    "creativity",
    "work_quantity",
    "work_speed",
    "consistency",
    "task_understanding",
    "technical_skills",
    "theory_application",
    "learning_willingness",
    "punctuality",
    "rule_compliance",
    "responsibility",
    "teamwork",
    "discussion_contribution",
    "respect_opinions",
    "verbal_communication",
    "written_communication",
    "presentation_skills",
    "appearance",
    "ethics",
    "accept_criticism",
];

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250901_000007_create_evaluations"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut table = Table::create()
            .table(Alias::new("evaluations"))
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
            .col(
                ColumnDef::new(Alias::new("supervisor_id"))
                    .big_integer()
                    .not_null(),
            )
            .col(
                ColumnDef::new(Alias::new("evaluation_type"))
                    .string_len(3)
                    .not_null(),
            )
            .col(ColumnDef::new(Alias::new("period_month")).integer().not_null())
            .to_owned();

        // All 23 rubric items share the same shape: nullable 1-5 integer.
        for column in RATING_COLUMNS {
            table.col(ColumnDef::new(Alias::new(column)).integer());
        }

        table
            .col(ColumnDef::new(Alias::new("achievements_description")).text())
            .col(ColumnDef::new(Alias::new("strengths")).text())
            .col(ColumnDef::new(Alias::new("improvements_needed")).text())
            .col(ColumnDef::new(Alias::new("career_recommendation")).text())
            .col(ColumnDef::new(Alias::new("overall_rating")).double())
            .col(
                ColumnDef::new(Alias::new("pass_recommendation"))
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(Alias::new("rehire_willingness"))
                    .boolean()
                    .not_null()
                    .default(false),
            )
            .col(
                ColumnDef::new(Alias::new("status"))
                    .string()
                    .not_null()
                    .default("pending"),
            )
            .col(ColumnDef::new(Alias::new("deadline")).date().not_null())
            .col(ColumnDef::new(Alias::new("submitted_at")).timestamp())
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
                    .name("fk_evaluations_placement")
                    .from(Alias::new("evaluations"), Alias::new("placement_id"))
                    .to(Alias::new("internship_placements"), Alias::new("id"))
                    .on_delete(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_evaluations_supervisor")
                    .from(Alias::new("evaluations"), Alias::new("supervisor_id"))
                    .to(Alias::new("supervisor_profiles"), Alias::new("id"))
                    .on_delete(ForeignKeyAction::Cascade),
            );

        manager.create_table(table).await?;

        // One UTS and one UAS per placement.
        manager
            .create_index(
                Index::create()
                    .name("ux_evaluations_placement_type")
                    .table(Alias::new("evaluations"))
                    .col(Alias::new("placement_id"))
                    .col(Alias::new("evaluation_type"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Alias::new("evaluation_reminders"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("evaluation_id"))
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("sent_at"))
                            .timestamp()
                            .not_null()
                            .default(Expr::cust("CURRENT_TIMESTAMP")),
                    )
                    .col(
                        ColumnDef::new(Alias::new("days_before_deadline"))
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evaluation_reminders_evaluation")
                            .from(
                                Alias::new("evaluation_reminders"),
                                Alias::new("evaluation_id"),
                            )
                            .to(Alias::new("evaluations"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("evaluation_reminders"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Alias::new("evaluations")).to_owned())
            .await
    }
}
