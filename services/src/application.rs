//! Application pipeline: submit, advance, withdraw.
//!
//! Status transitions are deliberately unconstrained (any status may follow
//! any other); the only hard rules are the one-application-per-posting pair
//! and the posting being open at submission time.

use chrono::Utc;
use db::events::DomainEvent;
use db::models::application::{self, ApplicationStatus};
use db::models::job_posting;
use db::models::student_profile;
use sea_orm::{DbConn, EntityTrait};

use crate::{notification, Actor, ServiceError};

async fn student_profile_for(
    db: &DbConn,
    actor: Actor,
) -> Result<student_profile::Model, ServiceError> {
    if !actor.is_student() {
        return Err(ServiceError::Forbidden);
    }
    student_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))
}

/// Submits an application to an open posting. One per (student, posting)
/// pair; the unique index backs this check up under concurrency.
pub async fn submit(
    db: &DbConn,
    actor: Actor,
    job_posting_id: i64,
    cover_letter: &str,
    cv_path: &str,
) -> Result<application::Model, ServiceError> {
    let profile = student_profile_for(db, actor).await?;

    let posting = job_posting::Entity::find_by_id(job_posting_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("job posting"))?;

    if !posting.accepts_applications(Utc::now().date_naive()) {
        return Err(ServiceError::validation(
            "this posting is closed or past its application deadline",
        ));
    }
    if cover_letter.trim().is_empty() {
        return Err(ServiceError::validation("cover letter is required"));
    }
    if application::Model::exists_for_pair(db, profile.id, posting.id).await? {
        return Err(ServiceError::Duplicate("application for this posting"));
    }

    let created = application::Model::create(db, profile.id, posting.id, cover_letter, cv_path)
        .await?;

    notification::dispatch(
        db,
        &DomainEvent::ApplicationSubmitted {
            application_id: created.id,
            student_id: profile.id,
            job_posting_id: posting.id,
        },
    )
    .await?;

    Ok(created)
}

/// Admin-driven status change. Any target status is accepted; the change is
/// logged and the student is notified.
pub async fn advance(
    db: &DbConn,
    actor: Actor,
    application_id: i64,
    new_status: ApplicationStatus,
    notes: Option<&str>,
) -> Result<application::Model, ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::Forbidden);
    }

    let current = application::Entity::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("application"))?;
    let old_status = current.status;

    let updated = application::Model::set_status(db, current.id, new_status, notes).await?;

    tracing::info!(
        application_id = updated.id,
        from = %old_status,
        to = %new_status,
        "application status changed"
    );

    if let Some(student) = student_profile::Entity::find_by_id(updated.student_id)
        .one(db)
        .await?
    {
        notification::dispatch(
            db,
            &DomainEvent::ApplicationStatusChanged {
                application_id: updated.id,
                student_user_id: student.user_id,
                old_status: old_status.to_string(),
                new_status: new_status.to_string(),
            },
        )
        .await?;
    }

    Ok(updated)
}

/// Owner-only shortcut setting `Withdrawn`.
pub async fn withdraw(
    db: &DbConn,
    actor: Actor,
    application_id: i64,
) -> Result<application::Model, ServiceError> {
    let profile = student_profile_for(db, actor).await?;

    let current = application::Entity::find_by_id(application_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("application"))?;

    if current.student_id != profile.id {
        return Err(ServiceError::NotFound("application"));
    }

    let updated =
        application::Model::set_status(db, current.id, ApplicationStatus::Withdrawn, None).await?;

    tracing::info!(application_id = updated.id, "application withdrawn");

    Ok(updated)
}

/// The caller's applications.
pub async fn mine(db: &DbConn, actor: Actor) -> Result<Vec<application::Model>, ServiceError> {
    let profile = student_profile_for(db, actor).await?;
    Ok(application::Model::find_for_student(db, profile.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::test_support::{seed_admin, seed_student};
    use chrono::{Duration, Utc};
    use db::models::company::Industry;
    use db::models::job_posting::{JobStatus, WorkType};
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    async fn seed_open_posting(db: &DbConn) -> job_posting::Model {
        let admin = seed_admin(db).await;
        let company = catalog::create_company(
            db,
            admin,
            catalog::CompanyInput {
                name: "PT Maju Jaya".to_owned(),
                industry: Industry::Tech,
                description: None,
                address: "Jl. Sudirman 1, Jakarta".to_owned(),
                website: None,
            },
        )
        .await
        .unwrap();

        catalog::create_job(
            db,
            admin,
            catalog::JobPostingInput {
                company_id: company.id,
                title: "Software Engineering Intern".to_owned(),
                description: "Build internal tools".to_owned(),
                requirements: "Rust or Python".to_owned(),
                benefits: None,
                work_type: WorkType::Hybrid,
                location: "Jakarta".to_owned(),
                duration_months: 6,
                slots_available: 2,
                application_deadline: Utc::now().date_naive() + Duration::days(14),
                status: JobStatus::Open,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn second_application_for_same_pair_is_rejected() {
        let db = setup_test_db().await;
        let posting = seed_open_posting(&db).await;
        let (user, _) = seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let actor = Actor::new(user.id, Role::Student);

        submit(&db, actor, posting.id, "Saya tertarik.", "uploads/cv/budi.pdf")
            .await
            .unwrap();

        let err = submit(&db, actor, posting.id, "Sekali lagi.", "uploads/cv/budi.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate(_)));
    }

    #[tokio::test]
    async fn closed_posting_rejects_applications() {
        let db = setup_test_db().await;
        let posting = seed_open_posting(&db).await;
        let admin = Actor::new(1, Role::Admin);
        catalog::set_job_status(&db, admin, posting.id, JobStatus::Closed)
            .await
            .unwrap();

        let (user, _) = seed_student(&db, "siti@student.prasetiyamulya.ac.id", "87654321", 0).await;
        let err = submit(
            &db,
            Actor::new(user.id, Role::Student),
            posting.id,
            "Saya tertarik.",
            "uploads/cv/siti.pdf",
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn any_status_may_follow_any_other() {
        let db = setup_test_db().await;
        let posting = seed_open_posting(&db).await;
        let (user, _) = seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let app = submit(
            &db,
            Actor::new(user.id, Role::Student),
            posting.id,
            "Saya tertarik.",
            "uploads/cv/budi.pdf",
        )
        .await
        .unwrap();

        let admin = Actor::new(1, Role::Admin);
        // Rejected and then accepted anyway; no transition graph applies.
        advance(&db, admin, app.id, ApplicationStatus::Rejected, None)
            .await
            .unwrap();
        let reopened = advance(&db, admin, app.id, ApplicationStatus::Accepted, None)
            .await
            .unwrap();
        assert_eq!(reopened.status, ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn withdraw_is_owner_only() {
        let db = setup_test_db().await;
        let posting = seed_open_posting(&db).await;
        let (owner, _) = seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let (other, _) = seed_student(&db, "siti@student.prasetiyamulya.ac.id", "87654321", 0).await;

        let app = submit(
            &db,
            Actor::new(owner.id, Role::Student),
            posting.id,
            "Saya tertarik.",
            "uploads/cv/budi.pdf",
        )
        .await
        .unwrap();

        let err = withdraw(&db, Actor::new(other.id, Role::Student), app.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let withdrawn = withdraw(&db, Actor::new(owner.id, Role::Student), app.id)
            .await
            .unwrap();
        assert_eq!(withdrawn.status, ApplicationStatus::Withdrawn);
    }
}
