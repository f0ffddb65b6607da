//! At-risk detection: approved students who go too long without a placement.
//!
//! Checked lazily on demand; there is no background worker. The transition
//! to `AtRisk` is one-way.

use chrono::{DateTime, Utc};
use db::events::DomainEvent;
use db::models::internship_placement;
use db::models::student_profile::{self, StudentStatus};
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter};

use crate::{notification, ServiceError};

const AT_RISK_AFTER_DAYS: i64 = 60;

/// Flags one student when applicable. Returns the updated profile when the
/// flag was set, `None` when the student is not at risk (wrong status, still
/// within the window, or already placed).
pub async fn check_at_risk(
    db: &DbConn,
    student_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<student_profile::Model>, ServiceError> {
    let profile = student_profile::Entity::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("student profile"))?;

    if profile.status != StudentStatus::Approved {
        return Ok(None);
    }
    let Some(days) = profile.days_since_approval(now) else {
        return Ok(None);
    };
    if days <= AT_RISK_AFTER_DAYS {
        return Ok(None);
    }
    if internship_placement::Model::find_active_for_student(db, profile.id)
        .await?
        .is_some()
    {
        return Ok(None);
    }

    let flagged =
        student_profile::Model::set_status(db, profile.id, StudentStatus::AtRisk).await?;

    tracing::warn!(
        student_id = flagged.id,
        days_since_approval = days,
        "student flagged at risk"
    );

    notification::dispatch(
        db,
        &DomainEvent::StudentFlaggedAtRisk {
            student_id: flagged.id,
            student_user_id: flagged.user_id,
            days_since_approval: days,
        },
    )
    .await?;

    Ok(Some(flagged))
}

/// Runs the check over every `Approved` student. Returns how many were
/// flagged.
pub async fn sweep_at_risk(db: &DbConn, now: DateTime<Utc>) -> Result<usize, ServiceError> {
    let approved = student_profile::Entity::find()
        .filter(student_profile::Column::Status.eq(StudentStatus::Approved))
        .all(db)
        .await?;

    let mut flagged = 0;
    for profile in approved {
        if check_at_risk(db, profile.id, now).await?.is_some() {
            flagged += 1;
        }
    }
    Ok(flagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_placement, seed_student};
    use db::models::internship_placement::PlacementStatus;
    use db::test_utils::setup_test_db;

    #[tokio::test]
    async fn sixty_one_days_without_placement_flags_at_risk() {
        let db = setup_test_db().await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 61).await;

        let flagged = check_at_risk(&db, profile.id, Utc::now())
            .await
            .unwrap()
            .expect("should be flagged");
        assert_eq!(flagged.status, StudentStatus::AtRisk);
    }

    #[tokio::test]
    async fn sixty_days_is_still_inside_the_window() {
        let db = setup_test_db().await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 60).await;

        let result = check_at_risk(&db, profile.id, Utc::now()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn active_placement_protects_the_student() {
        let db = setup_test_db().await;
        let (_, profile) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 90).await;
        seed_placement(&db, profile.id, None, PlacementStatus::Active).await;

        let result = check_at_risk(&db, profile.id, Utc::now()).await.unwrap();
        assert!(result.is_none());

        let unchanged = student_profile::Entity::find_by_id(profile.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, StudentStatus::Approved);
    }

    #[tokio::test]
    async fn sweep_flags_only_overdue_students() {
        let db = setup_test_db().await;
        seed_student(&db, "a@student.prasetiyamulya.ac.id", "11111111", 90).await;
        seed_student(&db, "b@student.prasetiyamulya.ac.id", "22222222", 10).await;
        let (_, placed) =
            seed_student(&db, "c@student.prasetiyamulya.ac.id", "33333333", 90).await;
        seed_placement(&db, placed.id, None, PlacementStatus::Active).await;

        let flagged = sweep_at_risk(&db, Utc::now()).await.unwrap();
        assert_eq!(flagged, 1);

        // One-way: a second sweep finds nothing left to flag.
        let flagged = sweep_at_risk(&db, Utc::now()).await.unwrap();
        assert_eq!(flagged, 0);
    }
}
