use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Internship vacancy published by a company. Students may only apply while
/// the posting is `Open` and before the deadline.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "job_postings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub company_id: i64,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub work_type: WorkType,
    pub location: String,
    pub duration_months: i32,
    pub slots_available: i32,
    pub application_deadline: NaiveDate,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "work_type")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum WorkType {
    #[sea_orm(string_value = "onsite")]
    Onsite,

    #[sea_orm(string_value = "remote")]
    Remote,

    #[sea_orm(string_value = "hybrid")]
    Hybrid,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum JobStatus {
    #[sea_orm(string_value = "open")]
    Open,

    #[sea_orm(string_value = "closed")]
    Closed,

    #[sea_orm(string_value = "draft")]
    Draft,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::company::Entity",
        from = "Column::CompanyId",
        to = "super::company::Column::Id"
    )]
    Company,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
}

impl Related<super::company::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn find_open(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Status.eq(JobStatus::Open))
            .all(db)
            .await
    }

    pub fn accepts_applications(&self, today: NaiveDate) -> bool {
        self.status == JobStatus::Open && today <= self.application_deadline
    }
}
