use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Account record shared by every actor; role-specific data lives in the
/// profile tables.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login email.
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Immutable after creation in practice; there is no endpoint to change it.
    pub role: Role,
    pub phone_number: Option<String>,
    pub is_email_verified: bool,
    pub force_password_change: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,

    #[sea_orm(string_value = "supervisor")]
    Supervisor,

    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::student_profile::Entity")]
    StudentProfile,

    #[sea_orm(has_one = "super::supervisor_profile::Entity")]
    SupervisorProfile,

    #[sea_orm(has_one = "super::admin_profile::Entity")]
    AdminProfile,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::student_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentProfile.def()
    }
}

impl Related<super::supervisor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SupervisorProfile.def()
    }
}

impl Related<super::admin_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminProfile.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        email: &str,
        password_hash: &str,
        role: Role,
        phone_number: Option<&str>,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            email: Set(email.to_lowercase()),
            password_hash: Set(password_hash.to_owned()),
            role: Set(role),
            phone_number: Set(phone_number.map(str::to_owned)),
            is_email_verified: Set(false),
            force_password_change: Set(role == Role::Supervisor),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_email(db: &DbConn, email: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email.to_lowercase()))
            .one(db)
            .await
    }

    pub async fn email_taken(db: &DbConn, email: &str) -> Result<bool, DbErr> {
        Ok(Self::find_by_email(db, email).await?.is_some())
    }

    pub async fn find_admins(db: &DbConn) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::Role.eq(Role::Admin))
            .all(db)
            .await
    }
}
