//! Evaluation lifecycle: partial draft saves, terminal submission, deadline
//! reminders.
//!
//! Shells are created at placement confirmation in `Pending`; the supervisor
//! fills them in over one or more draft saves and submits once. `Submitted`
//! is terminal and the service rejects any further edit.

use chrono::{NaiveDate, Utc};
use db::events::DomainEvent;
use db::models::evaluation::{self, EvaluationStatus};
use db::models::evaluation_reminder;
use db::models::supervisor_profile;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter};
use serde::Deserialize;

use crate::{notification, Actor, ServiceError};

/// Partial rating payload; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RatingSheet {
    pub accuracy: Option<i32>,
    pub neatness: Option<i32>,
    pub task_completion: Option<i32>,
    pub creativity: Option<i32>,
    pub work_quantity: Option<i32>,
    pub work_speed: Option<i32>,
    pub consistency: Option<i32>,
    pub task_understanding: Option<i32>,
    pub technical_skills: Option<i32>,
    pub theory_application: Option<i32>,
    pub learning_willingness: Option<i32>,
    pub punctuality: Option<i32>,
    pub rule_compliance: Option<i32>,
    pub responsibility: Option<i32>,
    pub teamwork: Option<i32>,
    pub discussion_contribution: Option<i32>,
    pub respect_opinions: Option<i32>,
    pub verbal_communication: Option<i32>,
    pub written_communication: Option<i32>,
    pub presentation_skills: Option<i32>,
    pub appearance: Option<i32>,
    pub ethics: Option<i32>,
    pub accept_criticism: Option<i32>,
    pub achievements_description: Option<String>,
    pub strengths: Option<String>,
    pub improvements_needed: Option<String>,
    pub career_recommendation: Option<String>,
    pub pass_recommendation: Option<bool>,
    pub rehire_willingness: Option<bool>,
}

impl RatingSheet {
    fn rating_values(&self) -> [Option<i32>; 23] {
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

    fn validate(&self) -> Result<(), ServiceError> {
        for value in self.rating_values().into_iter().flatten() {
            if !(1..=5).contains(&value) {
                return Err(ServiceError::validation(
                    "ratings must be between 1 and 5",
                ));
            }
        }
        Ok(())
    }
}

/// Merges provided fields onto the stored row. Unset sheet fields leave the
/// previous values in place, so consecutive partial saves accumulate.
fn merged(model: &evaluation::Model, sheet: &RatingSheet) -> evaluation::Model {
    let mut out = model.clone();

    out.accuracy = sheet.accuracy.or(out.accuracy);
    out.neatness = sheet.neatness.or(out.neatness);
    out.task_completion = sheet.task_completion.or(out.task_completion);
    out.creativity = sheet.creativity.or(out.creativity);
    out.work_quantity = sheet.work_quantity.or(out.work_quantity);
    out.work_speed = sheet.work_speed.or(out.work_speed);
    out.consistency = sheet.consistency.or(out.consistency);
    out.task_understanding = sheet.task_understanding.or(out.task_understanding);
    out.technical_skills = sheet.technical_skills.or(out.technical_skills);
    out.theory_application = sheet.theory_application.or(out.theory_application);
    out.learning_willingness = sheet.learning_willingness.or(out.learning_willingness);
    out.punctuality = sheet.punctuality.or(out.punctuality);
    out.rule_compliance = sheet.rule_compliance.or(out.rule_compliance);
    out.responsibility = sheet.responsibility.or(out.responsibility);
    out.teamwork = sheet.teamwork.or(out.teamwork);
    out.discussion_contribution = sheet.discussion_contribution.or(out.discussion_contribution);
    out.respect_opinions = sheet.respect_opinions.or(out.respect_opinions);
    out.verbal_communication = sheet.verbal_communication.or(out.verbal_communication);
    out.written_communication = sheet.written_communication.or(out.written_communication);
    out.presentation_skills = sheet.presentation_skills.or(out.presentation_skills);
    out.appearance = sheet.appearance.or(out.appearance);
    out.ethics = sheet.ethics.or(out.ethics);
    out.accept_criticism = sheet.accept_criticism.or(out.accept_criticism);

    out.achievements_description = sheet
        .achievements_description
        .clone()
        .or(out.achievements_description);
    out.strengths = sheet.strengths.clone().or(out.strengths);
    out.improvements_needed = sheet.improvements_needed.clone().or(out.improvements_needed);
    out.career_recommendation = sheet
        .career_recommendation
        .clone()
        .or(out.career_recommendation);

    if let Some(pass) = sheet.pass_recommendation {
        out.pass_recommendation = pass;
    }
    if let Some(rehire) = sheet.rehire_willingness {
        out.rehire_willingness = rehire;
    }

    out.overall_rating = out.compute_overall_rating();
    out
}

fn write_back(merged: evaluation::Model) -> evaluation::ActiveModel {
    let mut am = evaluation::ActiveModel {
        id: Set(merged.id),
        ..Default::default()
    };

    am.accuracy = Set(merged.accuracy);
    am.neatness = Set(merged.neatness);
    am.task_completion = Set(merged.task_completion);
    am.creativity = Set(merged.creativity);
    am.work_quantity = Set(merged.work_quantity);
    am.work_speed = Set(merged.work_speed);
    am.consistency = Set(merged.consistency);
    am.task_understanding = Set(merged.task_understanding);
    am.technical_skills = Set(merged.technical_skills);
    am.theory_application = Set(merged.theory_application);
    am.learning_willingness = Set(merged.learning_willingness);
    am.punctuality = Set(merged.punctuality);
    am.rule_compliance = Set(merged.rule_compliance);
    am.responsibility = Set(merged.responsibility);
    am.teamwork = Set(merged.teamwork);
    am.discussion_contribution = Set(merged.discussion_contribution);
    am.respect_opinions = Set(merged.respect_opinions);
    am.verbal_communication = Set(merged.verbal_communication);
    am.written_communication = Set(merged.written_communication);
    am.presentation_skills = Set(merged.presentation_skills);
    am.appearance = Set(merged.appearance);
    am.ethics = Set(merged.ethics);
    am.accept_criticism = Set(merged.accept_criticism);

    am.achievements_description = Set(merged.achievements_description);
    am.strengths = Set(merged.strengths);
    am.improvements_needed = Set(merged.improvements_needed);
    am.career_recommendation = Set(merged.career_recommendation);

    am.pass_recommendation = Set(merged.pass_recommendation);
    am.rehire_willingness = Set(merged.rehire_willingness);
    am.overall_rating = Set(merged.overall_rating);
    am.updated_at = Set(Utc::now());

    am
}

/// Loads an evaluation the calling supervisor owns.
async fn owned_evaluation(
    db: &DbConn,
    actor: Actor,
    evaluation_id: i64,
) -> Result<evaluation::Model, ServiceError> {
    if !actor.is_supervisor() {
        return Err(ServiceError::Forbidden);
    }
    let profile = supervisor_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("supervisor profile"))?;

    let model = evaluation::Entity::find_by_id(evaluation_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("evaluation"))?;

    if model.supervisor_id != profile.id {
        return Err(ServiceError::NotFound("evaluation"));
    }
    Ok(model)
}

/// Partial save: `Pending`/`Draft` only; moves to `Draft` and recomputes the
/// stored overall rating.
pub async fn save_draft(
    db: &DbConn,
    actor: Actor,
    evaluation_id: i64,
    sheet: RatingSheet,
) -> Result<evaluation::Model, ServiceError> {
    sheet.validate()?;
    let model = owned_evaluation(db, actor, evaluation_id).await?;

    if model.status == EvaluationStatus::Submitted {
        return Err(ServiceError::invalid_transition(
            model.status,
            EvaluationStatus::Draft,
        ));
    }

    let mut am = write_back(merged(&model, &sheet));
    am.status = Set(EvaluationStatus::Draft);
    Ok(am.update(db).await?)
}

/// Final submission: terminal, no edits afterwards. Admins and the student
/// are notified.
pub async fn submit(
    db: &DbConn,
    actor: Actor,
    evaluation_id: i64,
    sheet: RatingSheet,
) -> Result<evaluation::Model, ServiceError> {
    sheet.validate()?;
    let model = owned_evaluation(db, actor, evaluation_id).await?;

    if model.status == EvaluationStatus::Submitted {
        return Err(ServiceError::invalid_transition(
            model.status,
            EvaluationStatus::Submitted,
        ));
    }

    let now = Utc::now();
    let mut am = write_back(merged(&model, &sheet));
    am.status = Set(EvaluationStatus::Submitted);
    am.submitted_at = Set(Some(now));
    let submitted = am.update(db).await?;

    tracing::info!(
        evaluation_id = submitted.id,
        evaluation_type = %submitted.evaluation_type,
        overall_rating = ?submitted.overall_rating,
        "evaluation submitted"
    );

    notification::dispatch(
        db,
        &DomainEvent::EvaluationSubmitted {
            evaluation_id: submitted.id,
            placement_id: submitted.placement_id,
            evaluation_type: submitted.evaluation_type.to_string(),
            overall_rating: submitted.overall_rating,
            submitted_at: now,
        },
    )
    .await?;

    Ok(submitted)
}

/// Evaluations assigned to the calling supervisor.
pub async fn assigned(db: &DbConn, actor: Actor) -> Result<Vec<evaluation::Model>, ServiceError> {
    if !actor.is_supervisor() {
        return Err(ServiceError::Forbidden);
    }
    let profile = supervisor_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("supervisor profile"))?;
    Ok(evaluation::Model::find_for_supervisor(db, profile.id).await?)
}

/// Unsubmitted evaluations whose deadline falls within `window_days` from
/// `today` (inclusive, not yet past).
pub async fn due_for_reminder(
    db: &DbConn,
    today: NaiveDate,
    window_days: i64,
) -> Result<Vec<evaluation::Model>, ServiceError> {
    let open = evaluation::Entity::find()
        .filter(evaluation::Column::Status.ne(EvaluationStatus::Submitted))
        .all(db)
        .await?;

    Ok(open
        .into_iter()
        .filter(|e| {
            let days_left = (e.deadline - today).num_days();
            (0..=window_days).contains(&days_left)
        })
        .collect())
}

/// Records a reminder row and notifies the supervisor.
pub async fn record_reminder(
    db: &DbConn,
    evaluation_id: i64,
    days_before_deadline: i32,
) -> Result<evaluation_reminder::Model, ServiceError> {
    let model = evaluation::Entity::find_by_id(evaluation_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("evaluation"))?;

    let supervisor = supervisor_profile::Entity::find_by_id(model.supervisor_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("supervisor profile"))?;

    let reminder =
        evaluation_reminder::Model::create(db, model.id, days_before_deadline).await?;

    notification::dispatch(
        db,
        &DomainEvent::EvaluationReminderDue {
            evaluation_id: model.id,
            supervisor_user_id: supervisor.user_id,
            days_before_deadline,
        },
    )
    .await?;

    Ok(reminder)
}

/// Lazy reminder sweep, invoked on demand (there is no scheduler). An
/// evaluation is reminded at most once per remaining-days value.
pub async fn send_due_reminders(
    db: &DbConn,
    today: NaiveDate,
    window_days: i64,
) -> Result<usize, ServiceError> {
    let mut sent = 0;
    for due in due_for_reminder(db, today, window_days).await? {
        let days_left = (due.deadline - today).num_days() as i32;
        let already_sent = evaluation_reminder::Model::find_for_evaluation(db, due.id)
            .await?
            .iter()
            .any(|r| r.days_before_deadline == days_left);
        if already_sent {
            continue;
        }
        record_reminder(db, due.id, days_left).await?;
        sent += 1;
    }
    Ok(sent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_placement, seed_student, seed_supervisor};
    use chrono::Duration;
    use db::models::evaluation::EvaluationType;
    use db::models::internship_placement::PlacementStatus;
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    async fn seed_shell(db: &DbConn, deadline: NaiveDate) -> (Actor, evaluation::Model) {
        let (_, student) =
            seed_student(db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let (sup_user, sup_profile) = seed_supervisor(db, "supervisor@majujaya.co.id").await;
        let placement =
            seed_placement(db, student.id, Some(sup_profile.id), PlacementStatus::Active).await;

        let shell = evaluation::Model::create_shell(
            db,
            placement.id,
            sup_profile.id,
            EvaluationType::Uts,
            2,
            deadline,
        )
        .await
        .unwrap();

        (Actor::new(sup_user.id, Role::Supervisor), shell)
    }

    fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
    }

    #[tokio::test]
    async fn partial_saves_accumulate_and_recompute_overall() {
        let db = setup_test_db().await;
        let (actor, shell) = seed_shell(&db, deadline()).await;

        let first = save_draft(
            &db,
            actor,
            shell.id,
            RatingSheet {
                accuracy: Some(5),
                neatness: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(first.status, EvaluationStatus::Draft);
        assert_eq!(first.overall_rating, Some(5.00));

        let second = save_draft(
            &db,
            actor,
            shell.id,
            RatingSheet {
                task_completion: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // Earlier scores survive: (5 + 5 + 2) / 3 = 4.00.
        assert_eq!(second.accuracy, Some(5));
        assert_eq!(second.overall_rating, Some(4.00));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let db = setup_test_db().await;
        let (actor, shell) = seed_shell(&db, deadline()).await;

        let err = save_draft(
            &db,
            actor,
            shell.id,
            RatingSheet {
                accuracy: Some(6),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn submitted_evaluation_is_locked() {
        let db = setup_test_db().await;
        let (actor, shell) = seed_shell(&db, deadline()).await;

        let submitted = submit(
            &db,
            actor,
            shell.id,
            RatingSheet {
                accuracy: Some(4),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(submitted.status, EvaluationStatus::Submitted);
        assert!(submitted.submitted_at.is_some());

        let err = save_draft(
            &db,
            actor,
            shell.id,
            RatingSheet {
                accuracy: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));

        let err = submit(&db, actor, shell.id, RatingSheet::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn foreign_supervisor_cannot_touch_the_evaluation() {
        let db = setup_test_db().await;
        let (_, shell) = seed_shell(&db, deadline()).await;
        let (other_user, _) = seed_supervisor(&db, "other@kompetitor.co.id").await;

        let err = save_draft(
            &db,
            Actor::new(other_user.id, Role::Supervisor),
            shell.id,
            RatingSheet::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("evaluation")));
    }

    #[tokio::test]
    async fn reminder_sweep_skips_submitted_and_repeats() {
        let db = setup_test_db().await;
        let today = NaiveDate::from_ymd_opt(2025, 3, 29).unwrap();
        let (actor, shell) = seed_shell(&db, today + Duration::days(3)).await;

        let sent = send_due_reminders(&db, today, 7).await.unwrap();
        assert_eq!(sent, 1);

        // Same day again: already reminded at this remaining-days value.
        let sent = send_due_reminders(&db, today, 7).await.unwrap();
        assert_eq!(sent, 0);

        submit(&db, actor, shell.id, RatingSheet::default())
            .await
            .unwrap();
        let sent = send_due_reminders(&db, today + Duration::days(1), 7)
            .await
            .unwrap();
        assert_eq!(sent, 0, "submitted evaluations are not reminded");
    }
}
