use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supervisor grading of an internship, twice per placement (mid-term and
/// final). The rubric has 23 items in seven categories, each 1-5 and
/// individually optional so drafts can be saved partially filled.
///
/// `overall_rating` is derived: mean of the filled items rounded to two
/// decimals, recomputed after every partial save.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub placement_id: i64,
    pub supervisor_id: i64,
    pub evaluation_type: EvaluationType,
    /// Which month of the placement this covers (2 for mid-term, the final
    /// month for the end-of-term evaluation).
    pub period_month: i32,

    // Work quality
    pub accuracy: Option<i32>,
    pub neatness: Option<i32>,
    pub task_completion: Option<i32>,
    pub creativity: Option<i32>,

    // Productivity
    pub work_quantity: Option<i32>,
    pub work_speed: Option<i32>,
    pub consistency: Option<i32>,

    // Knowledge
    pub task_understanding: Option<i32>,
    pub technical_skills: Option<i32>,
    pub theory_application: Option<i32>,
    pub learning_willingness: Option<i32>,

    // Discipline
    pub punctuality: Option<i32>,
    pub rule_compliance: Option<i32>,
    pub responsibility: Option<i32>,

    // Teamwork
    pub teamwork: Option<i32>,
    pub discussion_contribution: Option<i32>,
    pub respect_opinions: Option<i32>,

    // Communication
    pub verbal_communication: Option<i32>,
    pub written_communication: Option<i32>,
    pub presentation_skills: Option<i32>,

    // Professionalism
    pub appearance: Option<i32>,
    pub ethics: Option<i32>,
    pub accept_criticism: Option<i32>,

    pub achievements_description: Option<String>,
    pub strengths: Option<String>,
    pub improvements_needed: Option<String>,
    pub career_recommendation: Option<String>,

    pub overall_rating: Option<f64>,
    pub pass_recommendation: bool,
    pub rehire_willingness: bool,

    pub status: EvaluationStatus,
    pub deadline: NaiveDate,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "evaluation_type")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EvaluationType {
    /// Mid-term (UTS).
    #[sea_orm(string_value = "uts")]
    Uts,

    /// End-of-term (UAS).
    #[sea_orm(string_value = "uas")]
    Uas,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "evaluation_status")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum EvaluationStatus {
    #[sea_orm(string_value = "pending")]
    Pending,

    #[sea_orm(string_value = "draft")]
    Draft,

    /// Terminal; edits are rejected by the service once here.
    #[sea_orm(string_value = "submitted")]
    Submitted,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::internship_placement::Entity",
        from = "Column::PlacementId",
        to = "super::internship_placement::Column::Id"
    )]
    Placement,

    #[sea_orm(
        belongs_to = "super::supervisor_profile::Entity",
        from = "Column::SupervisorId",
        to = "super::supervisor_profile::Column::Id"
    )]
    Supervisor,

    #[sea_orm(has_many = "super::evaluation_reminder::Entity")]
    Reminders,
}

impl Related<super::internship_placement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Placement.def()
    }
}

impl Related<super::supervisor_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl Related<super::evaluation_reminder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reminders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Rubric category labels, in display order.
pub const CATEGORIES: [&str; 7] = [
    "Work Quality",
    "Productivity",
    "Knowledge",
    "Discipline",
    "Teamwork",
    "Communication",
    "Professionalism",
];

fn mean(scores: &[Option<i32>]) -> Option<f64> {
    let filled: Vec<i32> = scores.iter().flatten().copied().collect();
    if filled.is_empty() {
        return None;
    }
    let avg = filled.iter().sum::<i32>() as f64 / filled.len() as f64;
    Some((avg * 100.0).round() / 100.0)
}

impl Model {
    /// All 23 rubric items in rubric order.
    pub fn rating_items(&self) -> [Option<i32>; 23] {
        [
            self.accuracy,
            self.neatness,
            self.task_completion,
            self.creativity,
            self.work_quantity,
            self.work_speed,
            self.consistency,
            self.task_understanding,
            self.technical_skills,
            self.theory_application,
            self.learning_willingness,
            self.punctuality,
            self.rule_compliance,
            self.responsibility,
            self.teamwork,
            self.discussion_contribution,
            self.respect_opinions,
            self.verbal_communication,
            self.written_communication,
            self.presentation_skills,
            self.appearance,
            self.ethics,
            self.accept_criticism,
        ]
    }

    /// Mean of the filled rubric items rounded to two decimals, or `None`
    /// when nothing has been scored yet. Pure, so calling it twice (or after
    /// every partial save) always agrees with the stored `overall_rating`.
    pub fn compute_overall_rating(&self) -> Option<f64> {
        mean(&self.rating_items())
    }

    /// Passing means an overall rating of at least 3.00. Unrated
    /// evaluations do not pass.
    pub fn is_passing(&self) -> bool {
        matches!(self.overall_rating, Some(r) if r >= 3.0)
    }

    /// Per-category means over the filled items; `None` for categories with
    /// nothing scored.
    pub fn category_averages(&self) -> Vec<(&'static str, Option<f64>)> {
        let groups: [&[Option<i32>]; 7] = [
            &[
                self.accuracy,
                self.neatness,
                self.task_completion,
                self.creativity,
            ],
            &[self.work_quantity, self.work_speed, self.consistency],
            &[
                self.task_understanding,
                self.technical_skills,
                self.theory_application,
                self.learning_willingness,
            ],
            &[self.punctuality, self.rule_compliance, self.responsibility],
            &[
                self.teamwork,
                self.discussion_contribution,
                self.respect_opinions,
            ],
            &[
                self.verbal_communication,
                self.written_communication,
                self.presentation_skills,
            ],
            &[self.appearance, self.ethics, self.accept_criticism],
        ];

        CATEGORIES
            .iter()
            .zip(groups)
            .map(|(name, scores)| (*name, mean(scores)))
            .collect()
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

    pub async fn find_for_supervisor(
        db: &DbConn,
        supervisor_id: i64,
    ) -> Result<Vec<Model>, DbErr> {
        Entity::find()
            .filter(Column::SupervisorId.eq(supervisor_id))
            .all(db)
            .await
    }

    /// Creates the empty evaluation shell scheduled at placement
    /// confirmation. Generic over the connection so it can join the
    /// confirmation transaction.
    pub async fn create_shell<C: ConnectionTrait>(
        db: &C,
        placement_id: i64,
        supervisor_id: i64,
        evaluation_type: EvaluationType,
        period_month: i32,
        deadline: NaiveDate,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        let active_model = ActiveModel {
            placement_id: Set(placement_id),
            supervisor_id: Set(supervisor_id),
            evaluation_type: Set(evaluation_type),
            period_month: Set(period_month),
            pass_recommendation: Set(false),
            rehire_willingness: Set(false),
            status: Set(EvaluationStatus::Pending),
            deadline: Set(deadline),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank() -> Model {
        Model {
            id: 1,
            placement_id: 1,
            supervisor_id: 1,
            evaluation_type: EvaluationType::Uts,
            period_month: 2,
            accuracy: None,
            neatness: None,
            task_completion: None,
            creativity: None,
            work_quantity: None,
            work_speed: None,
            consistency: None,
            task_understanding: None,
            technical_skills: None,
            theory_application: None,
            learning_willingness: None,
            punctuality: None,
            rule_compliance: None,
            responsibility: None,
            teamwork: None,
            discussion_contribution: None,
            respect_opinions: None,
            verbal_communication: None,
            written_communication: None,
            presentation_skills: None,
            appearance: None,
            ethics: None,
            accept_criticism: None,
            achievements_description: None,
            strengths: None,
            improvements_needed: None,
            career_recommendation: None,
            overall_rating: None,
            pass_recommendation: false,
            rehire_willingness: false,
            status: EvaluationStatus::Pending,
            deadline: NaiveDate::from_ymd_opt(2025, 8, 30).unwrap(),
            submitted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn all_unset_has_no_overall_rating() {
        let e = blank();
        assert_eq!(e.compute_overall_rating(), None);
        assert!(!e.is_passing());
    }

    #[test]
    fn overall_rating_ignores_unset_items() {
        let mut e = blank();
        e.accuracy = Some(5);
        e.neatness = Some(5);
        e.task_completion = Some(5);
        e.creativity = Some(5);
        assert_eq!(e.compute_overall_rating(), Some(5.00));
    }

    #[test]
    fn overall_rating_rounds_to_two_decimals() {
        let mut e = blank();
        e.accuracy = Some(3);
        e.neatness = Some(4);
        e.task_completion = Some(3);
        // 10 / 3 = 3.333... -> 3.33
        assert_eq!(e.compute_overall_rating(), Some(3.33));
    }

    #[test]
    fn overall_rating_is_idempotent() {
        let mut e = blank();
        e.punctuality = Some(2);
        e.ethics = Some(4);
        let first = e.compute_overall_rating();
        e.overall_rating = first;
        assert_eq!(e.compute_overall_rating(), first);
    }

    #[test]
    fn passing_threshold_is_exactly_three() {
        let mut e = blank();
        e.overall_rating = Some(3.00);
        assert!(e.is_passing());
        e.overall_rating = Some(2.99);
        assert!(!e.is_passing());
    }

    #[test]
    fn category_averages_are_independent() {
        let mut e = blank();
        e.accuracy = Some(4);
        e.neatness = Some(2);
        e.teamwork = Some(5);

        let averages = e.category_averages();
        assert_eq!(averages.len(), 7);
        assert_eq!(averages[0], ("Work Quality", Some(3.0)));
        assert_eq!(averages[1], ("Productivity", None));
        assert_eq!(averages[4], ("Teamwork", Some(5.0)));
    }

    #[test]
    fn rubric_has_twenty_three_items() {
        assert_eq!(blank().rating_items().len(), 23);
    }
}
