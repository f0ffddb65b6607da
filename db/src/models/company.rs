use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Company offering internships. Reference data managed by admins.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "companies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub industry: Industry,
    pub description: Option<String>,
    pub address: String,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "industry")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Industry {
    #[sea_orm(string_value = "tech")]
    Tech,

    #[sea_orm(string_value = "finance")]
    Finance,

    #[sea_orm(string_value = "retail")]
    Retail,

    #[sea_orm(string_value = "fmcg")]
    Fmcg,

    #[sea_orm(string_value = "automotive")]
    Automotive,

    #[sea_orm(string_value = "consulting")]
    Consulting,

    #[sea_orm(string_value = "manufacturing")]
    Manufacturing,

    #[sea_orm(string_value = "other")]
    Other,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_posting::Entity")]
    JobPostings,
}

impl Related<super::job_posting::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobPostings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        name: &str,
        industry: Industry,
        description: Option<&str>,
        address: &str,
        website: Option<&str>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            name: Set(name.to_owned()),
            industry: Set(industry),
            description: Set(description.map(str::to_owned)),
            address: Set(address.to_owned()),
            website: Set(website.map(str::to_owned)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }
}
