use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{QueryFilter, QueryOrder};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// In-app inbox message. Immutable once created except for the read state.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub recipient_id: i64,
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub title: String,
    pub message: String,
    /// Optional in-app link target.
    pub link: Option<String>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_kind")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NotificationKind {
    #[sea_orm(string_value = "info")]
    Info,

    #[sea_orm(string_value = "warning")]
    Warning,

    #[sea_orm(string_value = "success")]
    Success,

    #[sea_orm(string_value = "danger")]
    Danger,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "notification_category")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NotificationCategory {
    #[sea_orm(string_value = "registration")]
    Registration,

    #[sea_orm(string_value = "application")]
    Application,

    #[sea_orm(string_value = "report")]
    Report,

    #[sea_orm(string_value = "evaluation")]
    Evaluation,

    #[sea_orm(string_value = "placement")]
    Placement,

    #[sea_orm(string_value = "at_risk")]
    AtRisk,

    #[sea_orm(string_value = "system")]
    System,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id"
    )]
    Recipient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn send_to_user(
        db: &DbConn,
        recipient_id: i64,
        kind: NotificationKind,
        category: NotificationCategory,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> Result<Model, DbErr> {
        let active_model = ActiveModel {
            recipient_id: Set(recipient_id),
            kind: Set(kind),
            category: Set(category),
            title: Set(title.to_owned()),
            message: Set(message.to_owned()),
            link: Set(link.map(str::to_owned)),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    pub async fn send_to_many(
        db: &DbConn,
        recipient_ids: &[i64],
        kind: NotificationKind,
        category: NotificationCategory,
        title: &str,
        message: &str,
        link: Option<&str>,
    ) -> Result<(), DbErr> {
        for recipient_id in recipient_ids {
            Self::send_to_user(db, *recipient_id, kind, category, title, message, link).await?;
        }
        Ok(())
    }

    /// Newest-first inbox for a user.
    pub async fn inbox(db: &DbConn, recipient_id: i64) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::RecipientId.eq(recipient_id))
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn unread_count(db: &DbConn, recipient_id: i64) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::RecipientId.eq(recipient_id))
            .filter(Column::IsRead.eq(false))
            .count(db)
            .await
    }

    /// Flips every unread row for a recipient in one UPDATE. Returns the
    /// number of rows affected; already-read rows keep their `read_at`.
    pub async fn mark_all_read_for(db: &DbConn, recipient_id: i64) -> Result<u64, DbErr> {
        let result = Entity::update_many()
            .col_expr(Column::IsRead, Expr::value(true))
            .col_expr(Column::ReadAt, Expr::value(Utc::now()))
            .filter(Column::RecipientId.eq(recipient_id))
            .filter(Column::IsRead.eq(false))
            .exec(db)
            .await?;
        Ok(result.rows_affected)
    }

    /// Idempotent; a second call leaves the original `read_at`.
    pub async fn mark_as_read(db: &DbConn, id: i64) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Notification not found".to_string()))?;

        if model.is_read {
            return Ok(model);
        }

        let mut active_model: ActiveModel = model.into();
        active_model.is_read = Set(true);
        active_model.read_at = Set(Some(Utc::now()));
        active_model.update(db).await
    }
}
