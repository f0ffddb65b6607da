//! Notification fan-out: turns domain events into inbox rows.
//!
//! Every cross-entity transition goes through [`dispatch`], so the mapping
//! from lifecycle changes to who hears about them lives in one place.

use db::events::DomainEvent;
use db::models::internship_placement;
use db::models::notification::{self, NotificationCategory, NotificationKind};
use db::models::student_profile;
use db::models::user;
use sea_orm::{DbConn, EntityTrait};

use crate::{Actor, ServiceError};

async fn admin_ids(db: &DbConn) -> Result<Vec<i64>, ServiceError> {
    Ok(user::Model::find_admins(db)
        .await?
        .into_iter()
        .map(|admin| admin.id)
        .collect())
}

/// User id behind the student of a placement, when both rows still exist.
async fn student_user_for_placement(
    db: &DbConn,
    placement_id: i64,
) -> Result<Option<i64>, ServiceError> {
    let Some(placement) = internship_placement::Entity::find_by_id(placement_id)
        .one(db)
        .await?
    else {
        return Ok(None);
    };
    let student = student_profile::Entity::find_by_id(placement.student_id)
        .one(db)
        .await?;
    Ok(student.map(|s| s.user_id))
}

/// Creates the inbox rows a domain event calls for.
pub async fn dispatch(db: &DbConn, event: &DomainEvent) -> Result<(), ServiceError> {
    use DomainEvent::*;

    match event {
        StudentRegistered { nim, .. } => {
            let message = format!("Student {nim} registered and was auto-approved.");
            notification::Model::send_to_many(
                db,
                &admin_ids(db).await?,
                NotificationKind::Info,
                NotificationCategory::Registration,
                "New student registration",
                &message,
                None,
            )
            .await?;
        }

        ApplicationSubmitted {
            application_id,
            job_posting_id,
            ..
        } => {
            let message = format!("A new application was submitted for posting {job_posting_id}.");
            let link = format!("/applications/{application_id}");
            notification::Model::send_to_many(
                db,
                &admin_ids(db).await?,
                NotificationKind::Info,
                NotificationCategory::Application,
                "New application",
                &message,
                Some(&link),
            )
            .await?;
        }

        ApplicationStatusChanged {
            application_id,
            student_user_id,
            new_status,
            ..
        } => {
            let message = format!("Your application status changed to '{new_status}'.");
            let link = format!("/applications/{application_id}");
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Info,
                NotificationCategory::Application,
                "Application update",
                &message,
                Some(&link),
            )
            .await?;
        }

        PlacementConfirmed {
            placement_id,
            student_user_id,
            ..
        } => {
            let link = format!("/placements/{placement_id}");
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Success,
                NotificationCategory::Placement,
                "Placement confirmed",
                "Your internship placement was confirmed. Monthly reports are now due.",
                Some(&link),
            )
            .await?;
        }

        PlacementCompleted {
            student_user_id, ..
        } => {
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Success,
                NotificationCategory::Placement,
                "Internship completed",
                "Congratulations, your internship is marked as completed.",
                None,
            )
            .await?;
        }

        PlacementTerminated {
            student_user_id, ..
        } => {
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Danger,
                NotificationCategory::Placement,
                "Placement terminated",
                "Your internship placement was terminated. Contact the coop office.",
                None,
            )
            .await?;
        }

        ReportSubmitted {
            report_id,
            month,
            year,
            is_late,
            ..
        } => {
            let message = if *is_late {
                format!("Report for {month}/{year} was submitted late.")
            } else {
                format!("Report for {month}/{year} was submitted.")
            };
            let kind = if *is_late {
                NotificationKind::Warning
            } else {
                NotificationKind::Info
            };
            let link = format!("/reports/{report_id}");
            notification::Model::send_to_many(
                db,
                &admin_ids(db).await?,
                kind,
                NotificationCategory::Report,
                "Monthly report submitted",
                &message,
                Some(&link),
            )
            .await?;
        }

        ReportReviewed {
            report_id,
            student_user_id,
            ..
        } => {
            let link = format!("/reports/{report_id}");
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Success,
                NotificationCategory::Report,
                "Report reviewed",
                "Your monthly report has been reviewed.",
                Some(&link),
            )
            .await?;
        }

        RevisionRequested {
            report_id,
            student_user_id,
            ..
        } => {
            let link = format!("/reports/{report_id}");
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Warning,
                NotificationCategory::Report,
                "Revision requested",
                "Your monthly report needs revision. See the feedback and resubmit.",
                Some(&link),
            )
            .await?;
        }

        EvaluationSubmitted {
            evaluation_id,
            placement_id,
            evaluation_type,
            ..
        } => {
            let message = format!("The {evaluation_type} evaluation was submitted.");
            let link = format!("/evaluations/{evaluation_id}");
            notification::Model::send_to_many(
                db,
                &admin_ids(db).await?,
                NotificationKind::Info,
                NotificationCategory::Evaluation,
                "Evaluation submitted",
                &message,
                Some(&link),
            )
            .await?;
            if let Some(student_user_id) = student_user_for_placement(db, *placement_id).await? {
                notification::Model::send_to_user(
                    db,
                    student_user_id,
                    NotificationKind::Info,
                    NotificationCategory::Evaluation,
                    "Evaluation submitted",
                    "Your supervisor submitted an evaluation of your internship.",
                    Some(&link),
                )
                .await?;
            }
        }

        EvaluationReminderDue {
            evaluation_id,
            supervisor_user_id,
            days_before_deadline,
        } => {
            let message = format!(
                "An evaluation is due in {days_before_deadline} day(s). Please complete it."
            );
            let link = format!("/evaluations/{evaluation_id}");
            notification::Model::send_to_user(
                db,
                *supervisor_user_id,
                NotificationKind::Warning,
                NotificationCategory::Evaluation,
                "Evaluation deadline approaching",
                &message,
                Some(&link),
            )
            .await?;
        }

        StudentFlaggedAtRisk {
            student_user_id,
            days_since_approval,
            ..
        } => {
            notification::Model::send_to_user(
                db,
                *student_user_id,
                NotificationKind::Danger,
                NotificationCategory::AtRisk,
                "Placement overdue",
                "You have been approved for over 60 days without an active placement. \
                 Please contact the coop office.",
                None,
            )
            .await?;
            let message = format!(
                "A student has gone {days_since_approval} days since approval without a placement."
            );
            notification::Model::send_to_many(
                db,
                &admin_ids(db).await?,
                NotificationKind::Warning,
                NotificationCategory::AtRisk,
                "Student at risk",
                &message,
                None,
            )
            .await?;
        }
    }

    Ok(())
}

/// Newest-first inbox for the caller.
pub async fn inbox(db: &DbConn, actor: Actor) -> Result<Vec<notification::Model>, ServiceError> {
    Ok(notification::Model::inbox(db, actor.user_id).await?)
}

pub async fn unread_count(db: &DbConn, actor: Actor) -> Result<u64, ServiceError> {
    Ok(notification::Model::unread_count(db, actor.user_id).await?)
}

/// Marks one of the caller's notifications read. Foreign ids come back as
/// `NotFound` so existence is not leaked.
pub async fn mark_read(
    db: &DbConn,
    actor: Actor,
    notification_id: i64,
) -> Result<notification::Model, ServiceError> {
    let model = notification::Entity::find_by_id(notification_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("notification"))?;

    if model.recipient_id != actor.user_id {
        return Err(ServiceError::NotFound("notification"));
    }

    Ok(notification::Model::mark_as_read(db, model.id).await?)
}

/// One UPDATE across the caller's unread rows; returns how many flipped.
pub async fn mark_all_read(db: &DbConn, actor: Actor) -> Result<u64, ServiceError> {
    Ok(notification::Model::mark_all_read_for(db, actor.user_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_admin, seed_user};
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    #[tokio::test]
    async fn registration_event_reaches_every_admin() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let other_admin = seed_user(&db, "admin2@prasetiyamulya.ac.id", Role::Admin).await;

        dispatch(
            &db,
            &DomainEvent::StudentRegistered {
                user_id: 99,
                student_id: 1,
                nim: "12345678".to_owned(),
                registered_at: chrono::Utc::now(),
            },
        )
        .await
        .unwrap();

        assert_eq!(unread_count(&db, admin).await.unwrap(), 1);
        assert_eq!(
            unread_count(&db, Actor::new(other_admin.id, Role::Admin))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn mark_read_rejects_foreign_notifications() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let stranger = seed_user(&db, "someone@prasetiyamulya.ac.id", Role::Student).await;

        dispatch(
            &db,
            &DomainEvent::StudentRegistered {
                user_id: 99,
                student_id: 1,
                nim: "12345678".to_owned(),
                registered_at: chrono::Utc::now(),
            },
        )
        .await
        .unwrap();

        let inbox = inbox(&db, admin).await.unwrap();
        let err = mark_read(&db, Actor::new(stranger.id, Role::Student), inbox[0].id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound("notification")));

        let marked = mark_read(&db, admin, inbox[0].id).await.unwrap();
        assert!(marked.is_read);
        assert_eq!(unread_count(&db, admin).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn mark_all_read_flips_only_the_callers_rows() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let other_admin = seed_user(&db, "admin2@prasetiyamulya.ac.id", Role::Admin).await;
        let other = Actor::new(other_admin.id, Role::Admin);

        for nim in ["11111111", "22222222"] {
            dispatch(
                &db,
                &DomainEvent::StudentRegistered {
                    user_id: 99,
                    student_id: 1,
                    nim: nim.to_owned(),
                    registered_at: chrono::Utc::now(),
                },
            )
            .await
            .unwrap();
        }

        assert_eq!(mark_all_read(&db, admin).await.unwrap(), 2);
        assert_eq!(unread_count(&db, admin).await.unwrap(), 0);
        assert!(
            inbox(&db, admin)
                .await
                .unwrap()
                .iter()
                .all(|n| n.is_read && n.read_at.is_some())
        );

        // The other recipient's rows are untouched, and a second pass is a
        // no-op.
        assert_eq!(unread_count(&db, other).await.unwrap(), 2);
        assert_eq!(mark_all_read(&db, admin).await.unwrap(), 0);
    }
}
