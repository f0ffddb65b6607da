use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A student's application to a job posting. At most one row per
/// (student, job_posting) pair; the unique index backs the service check.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub student_id: i64,
    pub job_posting_id: i64,
    pub cover_letter: String,
    pub cv_path: String,
    pub status: ApplicationStatus,
    /// Internal notes from company/admin.
    pub notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// No transition graph is enforced between these states; any status may
/// follow any other (matching the original system's permissive behavior).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "application_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "sent")]
    Sent,

    #[sea_orm(string_value = "under_review")]
    UnderReview,

    #[sea_orm(string_value = "accepted")]
    Accepted,

    #[sea_orm(string_value = "rejected")]
    Rejected,

    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
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
        belongs_to = "super::job_posting::Entity",
        from = "Column::JobPostingId",
        to = "super::job_posting::Column::Id"
    )]
    JobPosting,
}

impl Related<super::student_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::job_posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobPosting.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        student_id: i64,
        job_posting_id: i64,
        cover_letter: &str,
        cv_path: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            student_id: Set(student_id),
            job_posting_id: Set(job_posting_id),
            cover_letter: Set(cover_letter.to_owned()),
            cv_path: Set(cv_path.to_owned()),
            status: Set(ApplicationStatus::Sent),
            notes: Set(None),
            applied_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn exists_for_pair(
        db: &DbConn,
        student_id: i64,
        job_posting_id: i64,
    ) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::JobPostingId.eq(job_posting_id))
            .one(db)
            .await?
            .is_some())
    }

    pub async fn find_for_student(db: &DbConn, student_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .all(db)
            .await
    }

    pub async fn set_status(
        db: &DbConn,
        id: i64,
        status: ApplicationStatus,
        notes: Option<&str>,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Application not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(status);
        if let Some(notes) = notes {
            active_model.notes = Set(Some(notes.to_owned()));
        }
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}
