//! Monthly report lifecycle: draft, submit, review, revision.
//!
//! Submission enforces the 500-word floor server-side and stamps lateness
//! against the day-30 deadline; the late flag is sticky across
//! resubmissions.

use chrono::Utc;
use db::events::DomainEvent;
use db::models::internship_placement;
use db::models::monthly_report::{self, ReportStatus};
use db::models::report_feedback;
use db::models::student_profile;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DbConn, EntityTrait};

use crate::{notification, Actor, ServiceError};

const MIN_REPORT_WORDS: usize = 500;

#[derive(Debug, Clone)]
pub struct ReportForm {
    pub month: i32,
    pub year: i32,
    pub company_profile: Option<String>,
    pub job_description: String,
    pub work_environment: String,
    pub useful_skills: String,
    pub needed_skills: String,
    pub achievements: String,
    pub challenges: String,
    pub next_month_plan: String,
}

async fn active_placement_for(
    db: &DbConn,
    actor: Actor,
) -> Result<internship_placement::Model, ServiceError> {
    if !actor.is_student() {
        return Err(ServiceError::Forbidden);
    }
    let profile = student_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;
    internship_placement::Model::find_active_for_student(db, profile.id)
        .await?
        .ok_or(ServiceError::NotFound("active placement"))
}

/// Loads a report and checks the caller owns it through their placement.
async fn owned_report(
    db: &DbConn,
    actor: Actor,
    report_id: i64,
) -> Result<monthly_report::Model, ServiceError> {
    if !actor.is_student() {
        return Err(ServiceError::Forbidden);
    }
    let profile = student_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;

    let report = monthly_report::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("report"))?;

    let placement = internship_placement::Entity::find_by_id(report.placement_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("placement"))?;

    if placement.student_id != profile.id {
        return Err(ServiceError::NotFound("report"));
    }
    Ok(report)
}

/// Starts a draft for the caller's active placement. One report per
/// (placement, month, year).
pub async fn create_draft(
    db: &DbConn,
    actor: Actor,
    form: ReportForm,
) -> Result<monthly_report::Model, ServiceError> {
    let placement = active_placement_for(db, actor).await?;

    if !(1..=12).contains(&form.month) {
        return Err(ServiceError::validation("month must be between 1 and 12"));
    }
    if monthly_report::Model::exists_for_period(db, placement.id, form.month, form.year).await? {
        return Err(ServiceError::Duplicate("report for this period"));
    }

    let now = Utc::now();
    let report = monthly_report::ActiveModel {
        placement_id: Set(placement.id),
        month: Set(form.month),
        year: Set(form.year),
        company_profile: Set(form.company_profile),
        job_description: Set(form.job_description),
        work_environment: Set(form.work_environment),
        useful_skills: Set(form.useful_skills),
        needed_skills: Set(form.needed_skills),
        achievements: Set(form.achievements),
        challenges: Set(form.challenges),
        next_month_plan: Set(form.next_month_plan),
        status: Set(ReportStatus::Draft),
        submitted_at: Set(None),
        is_late: Set(false),
        reviewed_by: Set(None),
        reviewed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(report)
}

/// Edits the content sections of a `Draft` or `RevisionRequested` report.
/// Month and year are fixed at creation.
pub async fn update_draft(
    db: &DbConn,
    actor: Actor,
    report_id: i64,
    form: ReportForm,
) -> Result<monthly_report::Model, ServiceError> {
    let report = owned_report(db, actor, report_id).await?;

    if !matches!(
        report.status,
        ReportStatus::Draft | ReportStatus::RevisionRequested
    ) {
        return Err(ServiceError::invalid_transition(report.status, "draft"));
    }

    let mut active_model: monthly_report::ActiveModel = report.into();
    active_model.company_profile = Set(form.company_profile);
    active_model.job_description = Set(form.job_description);
    active_model.work_environment = Set(form.work_environment);
    active_model.useful_skills = Set(form.useful_skills);
    active_model.needed_skills = Set(form.needed_skills);
    active_model.achievements = Set(form.achievements);
    active_model.challenges = Set(form.challenges);
    active_model.next_month_plan = Set(form.next_month_plan);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

/// Submits a report: word floor, lateness stamp, `Submitted` status.
pub async fn submit(
    db: &DbConn,
    actor: Actor,
    report_id: i64,
) -> Result<monthly_report::Model, ServiceError> {
    let report = owned_report(db, actor, report_id).await?;

    if !matches!(
        report.status,
        ReportStatus::Draft | ReportStatus::RevisionRequested
    ) {
        return Err(ServiceError::invalid_transition(
            report.status,
            ReportStatus::Submitted,
        ));
    }

    let words = report.word_count();
    if words < MIN_REPORT_WORDS {
        return Err(ServiceError::WordCountShortfall {
            got: words,
            need: MIN_REPORT_WORDS,
        });
    }

    let now = Utc::now();
    // Sticky: once late, a resubmission never clears the flag.
    let is_late = report.is_late || report.is_past_deadline(now);
    let placement_id = report.placement_id;
    let (month, year) = (report.month, report.year);

    let mut active_model: monthly_report::ActiveModel = report.into();
    active_model.status = Set(ReportStatus::Submitted);
    active_model.submitted_at = Set(Some(now));
    active_model.is_late = Set(is_late);
    active_model.updated_at = Set(now);
    let submitted = active_model.update(db).await?;

    notification::dispatch(
        db,
        &DomainEvent::ReportSubmitted {
            report_id: submitted.id,
            placement_id,
            month,
            year,
            is_late,
        },
    )
    .await?;

    Ok(submitted)
}

async fn student_user_for_report(
    db: &DbConn,
    report: &monthly_report::Model,
) -> Result<i64, ServiceError> {
    let placement = internship_placement::Entity::find_by_id(report.placement_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("placement"))?;
    let student = student_profile::Entity::find_by_id(placement.student_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;
    Ok(student.user_id)
}

/// Admin sign-off on a submitted report. Optional feedback is recorded.
pub async fn review(
    db: &DbConn,
    actor: Actor,
    report_id: i64,
    feedback: Option<&str>,
) -> Result<monthly_report::Model, ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::Forbidden);
    }

    let report = monthly_report::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("report"))?;

    if report.status != ReportStatus::Submitted {
        return Err(ServiceError::invalid_transition(
            report.status,
            ReportStatus::Reviewed,
        ));
    }

    let student_user_id = student_user_for_report(db, &report).await?;
    let now = Utc::now();

    if let Some(content) = feedback {
        report_feedback::Model::create(db, report.id, actor.user_id, content, false).await?;
    }

    let mut active_model: monthly_report::ActiveModel = report.into();
    active_model.status = Set(ReportStatus::Reviewed);
    active_model.reviewed_by = Set(Some(actor.user_id));
    active_model.reviewed_at = Set(Some(now));
    active_model.updated_at = Set(now);
    let reviewed = active_model.update(db).await?;

    notification::dispatch(
        db,
        &DomainEvent::ReportReviewed {
            report_id: reviewed.id,
            student_user_id,
            reviewed_by: actor.user_id,
        },
    )
    .await?;

    Ok(reviewed)
}

/// Sends a submitted report back for revision with mandatory feedback. The
/// student may edit and resubmit; lateness persists.
pub async fn request_revision(
    db: &DbConn,
    actor: Actor,
    report_id: i64,
    feedback: &str,
) -> Result<monthly_report::Model, ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::Forbidden);
    }
    if feedback.trim().is_empty() {
        return Err(ServiceError::validation("revision feedback is required"));
    }

    let report = monthly_report::Entity::find_by_id(report_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("report"))?;

    if report.status != ReportStatus::Submitted {
        return Err(ServiceError::invalid_transition(
            report.status,
            ReportStatus::RevisionRequested,
        ));
    }

    let student_user_id = student_user_for_report(db, &report).await?;
    let now = Utc::now();

    report_feedback::Model::create(db, report.id, actor.user_id, feedback, true).await?;

    let mut active_model: monthly_report::ActiveModel = report.into();
    active_model.status = Set(ReportStatus::RevisionRequested);
    active_model.reviewed_by = Set(Some(actor.user_id));
    active_model.reviewed_at = Set(Some(now));
    active_model.updated_at = Set(now);
    let returned = active_model.update(db).await?;

    notification::dispatch(
        db,
        &DomainEvent::RevisionRequested {
            report_id: returned.id,
            student_user_id,
            reviewed_by: actor.user_id,
        },
    )
    .await?;

    Ok(returned)
}

/// All reports across the caller's placements, any status.
pub async fn mine(db: &DbConn, actor: Actor) -> Result<Vec<monthly_report::Model>, ServiceError> {
    if !actor.is_student() {
        return Err(ServiceError::Forbidden);
    }
    let profile = student_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;

    let mut reports = Vec::new();
    for placement in internship_placement::Model::find_for_student(db, profile.id).await? {
        reports.extend(monthly_report::Model::find_for_placement(db, placement.id).await?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_admin, seed_placement, seed_student};
    use db::models::internship_placement::PlacementStatus;
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    fn section(words: usize) -> String {
        std::iter::repeat("kata")
            .take(words)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn form(month: i32, year: i32, words_per_section: usize) -> ReportForm {
        ReportForm {
            month,
            year,
            company_profile: None,
            job_description: section(words_per_section),
            work_environment: section(words_per_section),
            useful_skills: section(words_per_section),
            needed_skills: section(words_per_section),
            achievements: section(words_per_section),
            challenges: section(words_per_section),
            next_month_plan: section(words_per_section),
        }
    }

    async fn student_with_active_placement(db: &DbConn) -> Actor {
        let (user, profile) =
            seed_student(db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        seed_placement(db, profile.id, None, PlacementStatus::Active).await;
        Actor::new(user.id, Role::Student)
    }

    #[tokio::test]
    async fn submit_enforces_word_floor() {
        let db = setup_test_db().await;
        let actor = student_with_active_placement(&db).await;

        let report = create_draft(&db, actor, form(3, 2025, 10)).await.unwrap();
        let err = submit(&db, actor, report.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::WordCountShortfall { got: 70, need: 500 }
        ));

        let report = update_draft(&db, actor, report.id, form(3, 2025, 80))
            .await
            .unwrap();
        let submitted = submit(&db, actor, report.id).await.unwrap();
        assert_eq!(submitted.status, ReportStatus::Submitted);
        assert!(submitted.submitted_at.is_some());
    }

    #[tokio::test]
    async fn duplicate_period_is_rejected() {
        let db = setup_test_db().await;
        let actor = student_with_active_placement(&db).await;

        create_draft(&db, actor, form(3, 2025, 80)).await.unwrap();
        let err = create_draft(&db, actor, form(3, 2025, 80)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[tokio::test]
    async fn late_flag_sticks_across_resubmission() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let actor = student_with_active_placement(&db).await;

        // A report for a long-past month is necessarily late.
        let report = create_draft(&db, actor, form(1, 2020, 80)).await.unwrap();
        let submitted = submit(&db, actor, report.id).await.unwrap();
        assert!(submitted.is_late);

        let returned = request_revision(&db, admin, submitted.id, "Perlu detail.")
            .await
            .unwrap();
        assert_eq!(returned.status, ReportStatus::RevisionRequested);

        let resubmitted = submit(&db, actor, returned.id).await.unwrap();
        assert!(resubmitted.is_late, "late flag must survive resubmission");
    }

    #[tokio::test]
    async fn review_requires_submitted_state() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let actor = student_with_active_placement(&db).await;

        let draft = create_draft(&db, actor, form(3, 2025, 80)).await.unwrap();
        let err = review(&db, admin, draft.id, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));

        submit(&db, actor, draft.id).await.unwrap();
        let reviewed = review(&db, admin, draft.id, Some("Bagus.")).await.unwrap();
        assert_eq!(reviewed.status, ReportStatus::Reviewed);
        assert_eq!(reviewed.reviewed_by, Some(admin.user_id));

        let feedbacks = report_feedback::Model::find_for_report(&db, reviewed.id)
            .await
            .unwrap();
        assert_eq!(feedbacks.len(), 1);
        assert!(!feedbacks[0].requires_revision);
    }
}
