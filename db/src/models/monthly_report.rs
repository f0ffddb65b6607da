use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::QueryFilter;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Monthly progress report for an active placement. One row per
/// (placement, month, year); submission requires 500 words across the seven
/// content sections.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "monthly_reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub placement_id: i64,
    /// 1-12.
    pub month: i32,
    pub year: i32,
    /// Company overview, expected in the first month's report only.
    pub company_profile: Option<String>,
    pub job_description: String,
    pub work_environment: String,
    pub useful_skills: String,
    pub needed_skills: String,
    pub achievements: String,
    pub challenges: String,
    pub next_month_plan: String,
    pub status: ReportStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    /// Sticky: once set it survives later resubmissions.
    pub is_late: bool,
    pub reviewed_by: Option<i64>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "report_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ReportStatus {
    #[sea_orm(string_value = "draft")]
    Draft,

    #[sea_orm(string_value = "submitted")]
    Submitted,

    #[sea_orm(string_value = "reviewed")]
    Reviewed,

    #[sea_orm(string_value = "revision_requested")]
    RevisionRequested,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::internship_placement::Entity",
        from = "Column::PlacementId",
        to = "super::internship_placement::Column::Id"
    )]
    Placement,

    #[sea_orm(has_many = "super::report_feedback::Entity")]
    Feedbacks,
}

impl Related<super::internship_placement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Placement.def()
    }
}

impl Related<super::report_feedback::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Feedbacks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn exists_for_period(
        db: &DbConn,
        placement_id: i64,
        month: i32,
        year: i32,
    ) -> Result<bool, DbErr> {
        Ok(Entity::find()
            .filter(Column::PlacementId.eq(placement_id))
            .filter(Column::Month.eq(month))
            .filter(Column::Year.eq(year))
            .one(db)
            .await?
            .is_some())
    }

    pub async fn find_for_placement(
        db: &DbConn,
        placement_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::PlacementId.eq(placement_id))
            .all(db)
            .await
    }

    /// Submission deadline: day 30 of the report's month. For February the
    /// deadline clamps to the last day of the month.
    pub fn deadline(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month as u32, 30)
            .or_else(|| NaiveDate::from_ymd_opt(self.year, self.month as u32, 29))
            .or_else(|| NaiveDate::from_ymd_opt(self.year, self.month as u32, 28))
            .expect("month must be 1-12")
    }

    /// Whether a submission at `submitted` misses the deadline.
    pub fn is_past_deadline(&self, submitted: DateTime<Utc>) -> bool {
        submitted.date_naive() > self.deadline()
    }

    /// Whitespace-token count across the seven content sections.
    pub fn word_count(&self) -> usize {
        [
            &self.job_description,
            &self.work_environment,
            &self.useful_skills,
            &self.needed_skills,
            &self.achievements,
            &self.challenges,
            &self.next_month_plan,
        ]
        .iter()
        .map(|section| section.split_whitespace().count())
        .sum()
    }

    pub async fn set_status(db: &DbConn, id: i64, status: ReportStatus) -> Result<Model, DbErr> {
        let model = Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("Monthly report not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.status = Set(status);
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn report(month: i32, year: i32) -> Model {
        let section = |words: usize| {
            std::iter::repeat("kata")
                .take(words)
                .collect::<Vec<_>>()
                .join(" ")
        };
        Model {
            id: 1,
            placement_id: 1,
            month,
            year,
            company_profile: None,
            job_description: section(80),
            work_environment: section(80),
            useful_skills: section(80),
            needed_skills: section(80),
            achievements: section(80),
            challenges: section(80),
            next_month_plan: section(80),
            status: ReportStatus::Draft,
            submitted_at: None,
            is_late: false,
            reviewed_by: None,
            reviewed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn deadline_is_day_30() {
        assert_eq!(
            report(3, 2025).deadline(),
            NaiveDate::from_ymd_opt(2025, 3, 30).unwrap()
        );
    }

    #[test]
    fn deadline_clamps_in_february() {
        assert_eq!(
            report(2, 2025).deadline(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            report(2, 2024).deadline(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn late_when_submitted_after_the_30th() {
        let r = report(3, 2025);
        let on_31st = Utc.with_ymd_and_hms(2025, 3, 31, 10, 0, 0).unwrap();
        let on_29th = Utc.with_ymd_and_hms(2025, 3, 29, 10, 0, 0).unwrap();
        assert!(r.is_past_deadline(on_31st));
        assert!(!r.is_past_deadline(on_29th));
    }

    #[test]
    fn word_count_sums_all_seven_sections() {
        assert_eq!(report(1, 2025).word_count(), 560);
    }
}
