//! Placement lifecycle: offer intake, confirmation, completion, termination.
//!
//! Confirmation is the heavy operation: it activates the placement and the
//! student, provisions the supervisor account when none is linked, and
//! schedules the two evaluation shells, all inside one transaction.

use chrono::{Months, NaiveDate, Utc};
use db::events::DomainEvent;
use db::models::evaluation::{self, EvaluationType};
use db::models::internship_placement::{self, PlacementStatus};
use db::models::student_profile::{self, StudentStatus};
use db::models::supervisor_profile;
use db::models::user::{self, Role};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, QueryFilter,
    TransactionTrait,
};

use crate::{account, notification, Actor, ServiceError};

/// Mid-term evaluation covers the second month of the placement.
const UTS_PERIOD_MONTH: i32 = 2;

#[derive(Debug, Clone)]
pub struct OfferDetails {
    pub company_name: String,
    pub company_address: String,
    pub company_industry: String,
    pub position: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub supervisor_name: String,
    pub supervisor_email: String,
    pub supervisor_whatsapp: String,
    pub supervisor_position: String,
    pub acceptance_letter_path: String,
}

/// Student self-reports an accepted offer; the record waits for admin
/// confirmation.
pub async fn create_from_offer(
    db: &DbConn,
    actor: Actor,
    details: OfferDetails,
) -> Result<internship_placement::Model, ServiceError> {
    if !actor.is_student() {
        return Err(ServiceError::Forbidden);
    }
    let profile = student_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;

    if details.start_date >= details.end_date {
        return Err(ServiceError::validation("end date must be after start date"));
    }
    if details.acceptance_letter_path.trim().is_empty() {
        return Err(ServiceError::validation("acceptance letter is required"));
    }

    let open_placement = internship_placement::Model::find_for_student(db, profile.id)
        .await?
        .into_iter()
        .any(|p| {
            matches!(
                p.status,
                PlacementStatus::PendingConfirmation | PlacementStatus::Active
            )
        });
    if open_placement {
        return Err(ServiceError::Duplicate("open placement"));
    }

    let now = Utc::now();
    let placement = internship_placement::ActiveModel {
        student_id: Set(profile.id),
        supervisor_id: Set(None),
        company_name: Set(details.company_name),
        company_address: Set(details.company_address),
        company_industry: Set(details.company_industry),
        position: Set(details.position),
        start_date: Set(details.start_date),
        end_date: Set(details.end_date),
        supervisor_name: Set(details.supervisor_name),
        supervisor_email: Set(details.supervisor_email),
        supervisor_whatsapp: Set(details.supervisor_whatsapp),
        supervisor_position: Set(details.supervisor_position),
        acceptance_letter_path: Set(details.acceptance_letter_path),
        status: Set(PlacementStatus::PendingConfirmation),
        confirmed_by: Set(None),
        confirmed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        placement_id = placement.id,
        student_id = profile.id,
        "placement reported, pending confirmation"
    );

    Ok(placement)
}

/// Finds or provisions the supervisor account matching the placement's
/// contact snapshot. Runs inside the confirmation transaction.
async fn link_supervisor<C: ConnectionTrait>(
    conn: &C,
    placement: &internship_placement::Model,
) -> Result<i64, ServiceError> {
    if let Some(id) = placement.supervisor_id {
        return Ok(id);
    }

    let email = placement.supervisor_email.trim().to_lowercase();
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(conn)
        .await?;

    if let Some(user) = existing {
        if user.role != Role::Supervisor {
            return Err(ServiceError::validation(
                "supervisor email belongs to a non-supervisor account",
            ));
        }
        let profile = supervisor_profile::Entity::find()
            .filter(supervisor_profile::Column::UserId.eq(user.id))
            .one(conn)
            .await?
            .ok_or(ServiceError::NotFound("supervisor profile"))?;
        return Ok(profile.id);
    }

    // Credential delivery is out of scope; the first-login flag forces a
    // password change once the supervisor signs in.
    let (_, profile, _password) = account::create_supervisor_account(
        conn,
        &email,
        &placement.supervisor_name,
        &placement.company_name,
        &placement.supervisor_position,
        &placement.supervisor_whatsapp,
    )
    .await?;

    Ok(profile.id)
}

fn uts_deadline(placement: &internship_placement::Model) -> NaiveDate {
    placement
        .start_date
        .checked_add_months(Months::new(UTS_PERIOD_MONTH as u32))
        .unwrap_or(placement.end_date)
        .min(placement.end_date)
}

/// Admin confirmation: PendingConfirmation → Active, student → Active,
/// supervisor linked, evaluation shells created.
pub async fn confirm(
    db: &DbConn,
    actor: Actor,
    placement_id: i64,
) -> Result<internship_placement::Model, ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::Forbidden);
    }

    let placement = internship_placement::Entity::find_by_id(placement_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("placement"))?;

    if placement.status != PlacementStatus::PendingConfirmation {
        return Err(ServiceError::invalid_transition(
            placement.status,
            PlacementStatus::Active,
        ));
    }

    let now = Utc::now();
    let txn = db.begin().await?;

    let supervisor_id = link_supervisor(&txn, &placement).await?;

    let mut active_model: internship_placement::ActiveModel = placement.clone().into();
    active_model.supervisor_id = Set(Some(supervisor_id));
    active_model.status = Set(PlacementStatus::Active);
    active_model.confirmed_by = Set(Some(actor.user_id));
    active_model.confirmed_at = Set(Some(now));
    active_model.updated_at = Set(now);
    let confirmed = active_model.update(&txn).await?;

    let student = student_profile::Entity::find_by_id(confirmed.student_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;
    let student_user_id = student.user_id;
    let mut student_model: student_profile::ActiveModel = student.into();
    student_model.status = Set(StudentStatus::Active);
    student_model.updated_at = Set(now);
    student_model.update(&txn).await?;

    let final_month = confirmed.duration_months().max(1) as i32;
    evaluation::Model::create_shell(
        &txn,
        confirmed.id,
        supervisor_id,
        EvaluationType::Uts,
        UTS_PERIOD_MONTH,
        uts_deadline(&confirmed),
    )
    .await?;
    evaluation::Model::create_shell(
        &txn,
        confirmed.id,
        supervisor_id,
        EvaluationType::Uas,
        final_month,
        confirmed.end_date,
    )
    .await?;

    txn.commit().await?;

    tracing::info!(
        placement_id = confirmed.id,
        confirmed_by = actor.user_id,
        "placement confirmed"
    );

    notification::dispatch(
        db,
        &DomainEvent::PlacementConfirmed {
            placement_id: confirmed.id,
            student_id: confirmed.student_id,
            student_user_id,
            confirmed_by: actor.user_id,
            confirmed_at: now,
        },
    )
    .await?;

    Ok(confirmed)
}

async fn close_placement(
    db: &DbConn,
    actor: Actor,
    placement_id: i64,
    target: PlacementStatus,
    student_target: StudentStatus,
) -> Result<(internship_placement::Model, i64), ServiceError> {
    if !actor.is_admin() {
        return Err(ServiceError::Forbidden);
    }

    let placement = internship_placement::Entity::find_by_id(placement_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("placement"))?;

    if placement.status != PlacementStatus::Active {
        return Err(ServiceError::invalid_transition(placement.status, target));
    }

    let now = Utc::now();
    let txn = db.begin().await?;

    let mut active_model: internship_placement::ActiveModel = placement.into();
    active_model.status = Set(target);
    active_model.updated_at = Set(now);
    let closed = active_model.update(&txn).await?;

    let student = student_profile::Entity::find_by_id(closed.student_id)
        .one(&txn)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;
    let student_user_id = student.user_id;
    let mut student_model: student_profile::ActiveModel = student.into();
    student_model.status = Set(student_target);
    student_model.updated_at = Set(now);
    student_model.update(&txn).await?;

    txn.commit().await?;

    Ok((closed, student_user_id))
}

/// Active → Completed; the student is marked `Completed` too.
pub async fn complete(
    db: &DbConn,
    actor: Actor,
    placement_id: i64,
) -> Result<internship_placement::Model, ServiceError> {
    let (closed, student_user_id) = close_placement(
        db,
        actor,
        placement_id,
        PlacementStatus::Completed,
        StudentStatus::Completed,
    )
    .await?;

    notification::dispatch(
        db,
        &DomainEvent::PlacementCompleted {
            placement_id: closed.id,
            student_id: closed.student_id,
            student_user_id,
        },
    )
    .await?;

    Ok(closed)
}

/// Active → Terminated; the student returns to `Approved` and may report a
/// new offer.
pub async fn terminate(
    db: &DbConn,
    actor: Actor,
    placement_id: i64,
) -> Result<internship_placement::Model, ServiceError> {
    let (closed, student_user_id) = close_placement(
        db,
        actor,
        placement_id,
        PlacementStatus::Terminated,
        StudentStatus::Approved,
    )
    .await?;

    notification::dispatch(
        db,
        &DomainEvent::PlacementTerminated {
            placement_id: closed.id,
            student_id: closed.student_id,
            student_user_id,
        },
    )
    .await?;

    Ok(closed)
}

/// The caller's placements (student view).
pub async fn mine(
    db: &DbConn,
    actor: Actor,
) -> Result<Vec<internship_placement::Model>, ServiceError> {
    if !actor.is_student() {
        return Err(ServiceError::Forbidden);
    }
    let profile = student_profile::Model::find_by_user_id(db, actor.user_id)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;
    Ok(internship_placement::Model::find_for_student(db, profile.id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_admin, seed_placement, seed_student};
    use db::models::evaluation::EvaluationStatus;
    use db::test_utils::setup_test_db;

    #[tokio::test]
    async fn confirm_activates_placement_and_student() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let placement =
            seed_placement(&db, profile.id, None, PlacementStatus::PendingConfirmation).await;

        let confirmed = confirm(&db, admin, placement.id).await.unwrap();

        assert_eq!(confirmed.status, PlacementStatus::Active);
        assert_eq!(confirmed.confirmed_by, Some(admin.user_id));
        assert!(confirmed.confirmed_at.is_some());
        assert!(confirmed.supervisor_id.is_some());

        let student = student_profile::Entity::find_by_id(profile.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.status, StudentStatus::Active);
    }

    #[tokio::test]
    async fn confirm_provisions_supervisor_and_evaluation_shells() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let placement =
            seed_placement(&db, profile.id, None, PlacementStatus::PendingConfirmation).await;

        let confirmed = confirm(&db, admin, placement.id).await.unwrap();

        let supervisor = user::Model::find_by_email(&db, "supervisor@majujaya.co.id")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(supervisor.role, Role::Supervisor);
        assert!(supervisor.force_password_change);

        let shells = evaluation::Model::find_for_placement(&db, confirmed.id)
            .await
            .unwrap();
        assert_eq!(shells.len(), 2);
        let uts = shells
            .iter()
            .find(|e| e.evaluation_type == EvaluationType::Uts)
            .unwrap();
        let uas = shells
            .iter()
            .find(|e| e.evaluation_type == EvaluationType::Uas)
            .unwrap();
        assert_eq!(uts.period_month, 2);
        assert_eq!(uts.status, EvaluationStatus::Pending);
        assert_eq!(uas.deadline, confirmed.end_date);
    }

    #[tokio::test]
    async fn confirm_rejects_non_pending_placements() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let placement = seed_placement(&db, profile.id, None, PlacementStatus::Active).await;

        let err = confirm(&db, admin, placement.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn complete_cascades_to_student() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        let placement =
            seed_placement(&db, profile.id, None, PlacementStatus::PendingConfirmation).await;
        confirm(&db, admin, placement.id).await.unwrap();

        let completed = complete(&db, admin, placement.id).await.unwrap();
        assert_eq!(completed.status, PlacementStatus::Completed);

        let student = student_profile::Entity::find_by_id(profile.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(student.status, StudentStatus::Completed);

        // Closing twice is rejected.
        let err = complete(&db, admin, placement.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn second_open_placement_is_rejected() {
        let db = setup_test_db().await;
        let (user, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;
        seed_placement(&db, profile.id, None, PlacementStatus::PendingConfirmation).await;

        let err = create_from_offer(
            &db,
            Actor::new(user.id, Role::Student),
            OfferDetails {
                company_name: "PT Lain".to_owned(),
                company_address: "Bandung".to_owned(),
                company_industry: "finance".to_owned(),
                position: "Intern".to_owned(),
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                supervisor_name: "Bu Ani".to_owned(),
                supervisor_email: "ani@lain.co.id".to_owned(),
                supervisor_whatsapp: "+6281400000000".to_owned(),
                supervisor_position: "Manager".to_owned(),
                acceptance_letter_path: "uploads/acceptance/budi2.pdf".to_owned(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate("open placement")));
    }
}
