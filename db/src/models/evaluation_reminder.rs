use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Log of reminders sent to a supervisor about an unsubmitted evaluation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "evaluation_reminders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub evaluation_id: i64,
    pub sent_at: DateTime<Utc>,
    pub days_before_deadline: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::evaluation::Entity",
        from = "Column::EvaluationId",
        to = "super::evaluation::Column::Id"
    )]
    Evaluation,
}

impl Related<super::evaluation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluation.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        evaluation_id: i64,
        days_before_deadline: i32,
    ) -> Result<Model, DbErr> {
        let active_model = ActiveModel {
            evaluation_id: Set(evaluation_id),
            sent_at: Set(Utc::now()),
            days_before_deadline: Set(days_before_deadline),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_for_evaluation(
        db: &DbConn,
        evaluation_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::EvaluationId.eq(evaluation_id))
            .all(db)
            .await
    }
}
