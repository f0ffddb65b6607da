//! Domain events emitted on cross-entity transitions.
//!
//! Services emit these instead of mutating unrelated rows ad hoc; the
//! notification fan-out consumes them to build the in-app inbox. Keeping the
//! cascade surface in one enum makes the lifecycle rules auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum DomainEvent {
    /// A student completed registration and was auto-approved.
    StudentRegistered {
        user_id: i64,
        student_id: i64,
        nim: String,
        registered_at: DateTime<Utc>,
    },

    /// A student applied to a job posting.
    ApplicationSubmitted {
        application_id: i64,
        student_id: i64,
        job_posting_id: i64,
    },

    /// An application moved to a new status (transitions are unconstrained).
    ApplicationStatusChanged {
        application_id: i64,
        student_user_id: i64,
        old_status: String,
        new_status: String,
    },

    /// An admin confirmed a pending placement; the student is now active.
    PlacementConfirmed {
        placement_id: i64,
        student_id: i64,
        student_user_id: i64,
        confirmed_by: i64,
        confirmed_at: DateTime<Utc>,
    },

    /// An active placement finished; the student is marked completed.
    PlacementCompleted {
        placement_id: i64,
        student_id: i64,
        student_user_id: i64,
    },

    /// An active placement was cut short.
    PlacementTerminated {
        placement_id: i64,
        student_id: i64,
        student_user_id: i64,
    },

    /// A monthly report was submitted (possibly late).
    ReportSubmitted {
        report_id: i64,
        placement_id: i64,
        month: i32,
        year: i32,
        is_late: bool,
    },

    /// An admin finished reviewing a report.
    ReportReviewed {
        report_id: i64,
        student_user_id: i64,
        reviewed_by: i64,
    },

    /// An admin sent a report back for revision.
    RevisionRequested {
        report_id: i64,
        student_user_id: i64,
        reviewed_by: i64,
    },

    /// A supervisor submitted a graded evaluation.
    EvaluationSubmitted {
        evaluation_id: i64,
        placement_id: i64,
        evaluation_type: String,
        overall_rating: Option<f64>,
        submitted_at: DateTime<Utc>,
    },

    /// An unsubmitted evaluation is approaching its deadline.
    EvaluationReminderDue {
        evaluation_id: i64,
        supervisor_user_id: i64,
        days_before_deadline: i32,
    },

    /// An approved student went more than 60 days without an active placement.
    StudentFlaggedAtRisk {
        student_id: i64,
        student_user_id: i64,
        days_since_approval: i64,
    },
}
