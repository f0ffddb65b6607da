use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Reviewer feedback left on a monthly report.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "report_feedbacks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub report_id: i64,
    pub reviewer_id: i64,
    pub content: String,
    pub requires_revision: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::monthly_report::Entity",
        from = "Column::ReportId",
        to = "super::monthly_report::Column::Id"
    )]
    Report,

    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReviewerId",
        to = "super::user::Column::Id"
    )]
    Reviewer,
}

impl Related<super::monthly_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviewer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        report_id: i64,
        reviewer_id: i64,
        content: &str,
        requires_revision: bool,
    ) -> Result<Model, DbErr> {
        let active_model = ActiveModel {
            report_id: Set(report_id),
            reviewer_id: Set(reviewer_id),
            content: Set(content.to_owned()),
            requires_revision: Set(requires_revision),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_for_report(db: &DbConn, report_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::ReportId.eq(report_id))
            .all(db)
            .await
    }
}
