use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Confirmed internship record. Company and supervisor contact fields are
/// snapshots taken when the student reports the offer; they stay fixed even
/// if the catalog or supervisor account changes later.
///
/// Rows are never deleted; lifecycle ends in `Completed` or `Terminated`.
/// A partial unique index keeps one `Active` placement per student.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "internship_placements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    /// Linked once the supervisor account exists; SET NULL on deletion.
    pub supervisor_id: Option<i64>,
    pub company_name: String,
    pub company_address: String,
    pub company_industry: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub supervisor_whatsapp: String,
    pub supervisor_position: String,
    pub acceptance_letter_path: String,
    pub status: PlacementStatus,
    pub confirmed_by: Option<i64>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "placement_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PlacementStatus {
    #[sea_orm(string_value = "pending_confirmation")]
    PendingConfirmation,

    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "completed")]
    Completed,

    #[sea_orm(string_value = "terminated")]
    Terminated,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student_profile::Entity",
        from = "Column::StudentId",
        to = "super::student_profile::Column::Id"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::supervisor_profile::Entity",
        from = "Column::SupervisorId",
        to = "super::supervisor_profile::Column::Id"
    )]
    Supervisor,

    #[sea_orm(has_many = "super::monthly_report::Entity")]
    MonthlyReports,

    #[sea_orm(has_many = "super::evaluation::Entity")]
    Evaluations,
}

impl Related<super::student_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::supervisor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl Related<super::monthly_report::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyReports.def()
    }
}

impl Related<super::evaluation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_active_for_student(
        db: &DbConn,
        student_id: i64,
    ) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(PlacementStatus::Active))
            .one(db)
            .await
    }

    pub async fn find_for_student(db: &DbConn, student_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .all(db)
            .await
    }

    pub async fn find_for_supervisor(
        db: &DbConn,
        supervisor_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::SupervisorId.eq(supervisor_id))
            .all(db)
            .await
    }

    /// Whole months between start and end dates.
    pub fn duration_months(&self) -> i64 {
        (self.end_date - self.start_date).num_days() / 30
    }
}
