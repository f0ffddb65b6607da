use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m20250901_000002_create_profiles"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // student_profiles
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("student_profiles"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("user_id"))
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("full_name")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("nim"))
                            .string_len(8)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("program")).string().not_null())
                    .col(ColumnDef::new(Alias::new("cohort_year")).string_len(4).not_null())
                    .col(ColumnDef::new(Alias::new("gender")).string_len(1).not_null())
                    .col(ColumnDef::new(Alias::new("whatsapp")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("consultation_doc_path"))
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("sptjm_doc_path")).string().not_null())
                    .col(ColumnDef::new(Alias::new("cv_path")).string())
                    .col(ColumnDef::new(Alias::new("gpa")).double())
                    .col(ColumnDef::new(Alias::new("skills")).text())
                    .col(ColumnDef::new(Alias::new("linkedin_url")).string())
                    .col(ColumnDef::new(Alias::new("github_url")).string())
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .string()
                            .not_null()
                            .default("approved"),
                    )
                    .col(ColumnDef::new(Alias::new("approved_at")).timestamp())
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
                            .name("fk_student_profiles_user")
                            .from(Alias::new("student_profiles"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // supervisor_profiles
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("supervisor_profiles"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("user_id"))
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("full_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("company_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("position")).string().not_null())
                    .col(ColumnDef::new(Alias::new("whatsapp")).string().not_null())
                    .col(
                        ColumnDef::new(Alias::new("is_first_login"))
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Alias::new("credentials_sent_at")).timestamp())
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
                            .name("fk_supervisor_profiles_user")
                            .from(Alias::new("supervisor_profiles"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // admin_profiles
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("admin_profiles"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("user_id"))
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Alias::new("full_name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("phone_number")).string())
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
                            .name("fk_admin_profiles_user")
                            .from(Alias::new("admin_profiles"), Alias::new("user_id"))
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Alias::new("admin_profiles")).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("supervisor_profiles"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("student_profiles"))
                    .to_owned(),
            )
            .await
    }
}
