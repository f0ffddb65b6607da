use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::Serialize;

/// Company supervisor profile, one-to-one with `users`. Accounts are created
/// by the system at placement confirmation, so `is_first_login` starts true
/// until the generated password is changed.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "supervisor_profiles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub full_name: String,
    pub company_name: String,
    pub position: String,
    pub whatsapp: String,
    pub is_first_login: bool,
    pub credentials_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,

    #[sea_orm(has_many = "super::internship_placement::Entity")]
    Placements,

    #[sea_orm(has_many = "super::evaluation::Entity")]
    Evaluations,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::internship_placement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Placements.def()
    }
}

impl Related<super::evaluation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DbConn,
        user_id: i64,
        full_name: &str,
        company_name: &str,
        position: &str,
        whatsapp: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            user_id: Set(user_id),
            full_name: Set(full_name.to_owned()),
            company_name: Set(company_name.to_owned()),
            position: Set(position.to_owned()),
            whatsapp: Set(whatsapp.to_owned()),
            is_first_login: Set(true),
            credentials_sent_at: Set(Some(now)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn find_by_user_id(db: &DbConn, user_id: i64) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .one(db)
            .await
    }

    pub async fn clear_first_login(db: &DbConn, id: i64) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Supervisor profile not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.is_first_login = Set(false);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}
