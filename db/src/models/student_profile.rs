use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Student-side profile, one-to-one with `users`.
///
/// `status` tracks the internship journey: `Approved` on registration,
/// `Active` once a placement is confirmed, `AtRisk` after 60 days without a
/// placement, `Completed` when the placement finishes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "student_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    /// Student identification number, exactly 8 digits, unique.
    pub nim: String,
    pub program: Program,
    /// Intake year, e.g. "2022".
    pub cohort_year: String,
    pub gender: Gender,
    pub whatsapp: String,
    /// Proof of mentor consultation (PDF).
    pub consultation_doc_path: String,
    /// Signed liability declaration (PDF).
    pub sptjm_doc_path: String,
    pub cv_path: Option<String>,
    pub gpa: Option<f64>,
    /// Comma-separated skill list.
    pub skills: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub status: StudentStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "student_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StudentStatus {
    #[sea_orm(string_value = "approved")]
    Approved,

    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "at_risk")]
    AtRisk,

    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "gender")]
pub enum Gender {
    #[sea_orm(string_value = "L")]
    Male,

    #[sea_orm(string_value = "P")]
    Female,
}

/// Degree program codes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "program")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Program {
    #[sea_orm(string_value = "MN")]
    Mn,
    #[sea_orm(string_value = "BP")]
    Bp,
    #[sea_orm(string_value = "AK")]
    Ak,
    #[sea_orm(string_value = "EB")]
    Eb,
    #[sea_orm(string_value = "CSE")]
    Cse,
    #[sea_orm(string_value = "FBT")]
    Fbt,
    #[sea_orm(string_value = "PDI")]
    Pdi,
    #[sea_orm(string_value = "DBT")]
    Dbt,
    #[sea_orm(string_value = "BM")]
    Bm,
    #[sea_orm(string_value = "EBT")]
    Ebt,
    #[sea_orm(string_value = "HBI")]
    Hbi,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,

    #[sea_orm(has_many = "super::internship_placement::Entity")]
    Placements,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::internship_placement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Placements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_by_user_id(db: &DbConn, user_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn find_by_nim(db: &DbConn, nim: &str) -> Result<Option<Model>, DbErr> {
        Entity::find().filter(Column::Nim.eq(nim)).one(db).await
    }

    pub async fn nim_taken(db: &DbConn, nim: &str) -> Result<bool, DbErr> {
        Ok(Self::find_by_nim(db, nim).await?.is_some())
    }

    pub async fn set_status(
        db: &DbConn,
        id: i64,
        status: StudentStatus,
    ) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Student profile not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(status);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    /// Days elapsed since approval, or `None` when `approved_at` is unset.
    pub fn days_since_approval(&self, now: DateTime<Utc>) -> Option<i64> {
        self.approved_at.map(|at| (now - at).num_days())
    }

    pub fn skills_list(&self) -> Vec<String> {
        self.skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}
