//! Shared fixtures for service tests. Rows are inserted directly so each
//! test exercises only the operation under test.

use chrono::{Duration, NaiveDate, Utc};
use common::config::Config;
use db::models::internship_placement::{self, PlacementStatus};
use db::models::student_profile::{self, Gender, Program, StudentStatus};
use db::models::supervisor_profile;
use db::models::user::{self, Role};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DbConn};

use crate::Actor;

pub fn init_test_config() {
    std::env::set_var("DATABASE_URL", "sqlite::memory:");
    std::env::set_var("JWT_SECRET", "test-secret");
    std::env::set_var("LOG_FILE", "/tmp/coop-portal-test/api.log");
    Config::init(".env.test");
}

pub async fn seed_user(db: &DbConn, email: &str, role: Role) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        email: Set(email.to_owned()),
        password_hash: Set("$argon2id$test".to_owned()),
        role: Set(role),
        phone_number: Set(None),
        is_email_verified: Set(false),
        force_password_change: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn seed_admin(db: &DbConn) -> Actor {
    let user = seed_user(db, "admin@prasetiyamulya.ac.id", Role::Admin).await;
    Actor::new(user.id, Role::Admin)
}

/// Student approved `days_ago` days in the past, with no placement.
pub async fn seed_student(
    db: &DbConn,
    email: &str,
    nim: &str,
    days_ago: i64,
) -> (user::Model, student_profile::Model) {
    let user = seed_user(db, email, Role::Student).await;
    let now = Utc::now();
    let profile = student_profile::ActiveModel {
        user_id: Set(user.id),
        full_name: Set("Test Student".to_owned()),
        nim: Set(nim.to_owned()),
        program: Set(Program::Cse),
        cohort_year: Set("2022".to_owned()),
        gender: Set(Gender::Female),
        whatsapp: Set("+6281200000000".to_owned()),
        consultation_doc_path: Set("uploads/consultation/test.pdf".to_owned()),
        sptjm_doc_path: Set("uploads/sptjm/test.pdf".to_owned()),
        cv_path: Set(None),
        gpa: Set(None),
        skills: Set(None),
        linkedin_url: Set(None),
        github_url: Set(None),
        status: Set(StudentStatus::Approved),
        approved_at: Set(Some(now - Duration::days(days_ago))),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    (user, profile)
}

pub async fn seed_supervisor(
    db: &DbConn,
    email: &str,
) -> (user::Model, supervisor_profile::Model) {
    let user = seed_user(db, email, Role::Supervisor).await;
    let now = Utc::now();
    let profile = supervisor_profile::ActiveModel {
        user_id: Set(user.id),
        full_name: Set("Pak Supervisor".to_owned()),
        company_name: Set("PT Maju Jaya".to_owned()),
        position: Set("Engineering Manager".to_owned()),
        whatsapp: Set("+6281300000000".to_owned()),
        is_first_login: Set(true),
        credentials_sent_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
    (user, profile)
}

pub async fn seed_placement(
    db: &DbConn,
    student_id: i64,
    supervisor_id: Option<i64>,
    status: PlacementStatus,
) -> internship_placement::Model {
    let now = Utc::now();
    internship_placement::ActiveModel {
        student_id: Set(student_id),
        supervisor_id: Set(supervisor_id),
        company_name: Set("PT Maju Jaya".to_owned()),
        company_address: Set("Jl. Sudirman 1, Jakarta".to_owned()),
        company_industry: Set("tech".to_owned()),
        position: Set("Software Engineering Intern".to_owned()),
        start_date: Set(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap()),
        end_date: Set(NaiveDate::from_ymd_opt(2025, 8, 1).unwrap()),
        supervisor_name: Set("Pak Supervisor".to_owned()),
        supervisor_email: Set("supervisor@majujaya.co.id".to_owned()),
        supervisor_whatsapp: Set("+6281300000000".to_owned()),
        supervisor_position: Set("Engineering Manager".to_owned()),
        acceptance_letter_path: Set("uploads/acceptance/test.pdf".to_owned()),
        status: Set(status),
        confirmed_by: Set(None),
        confirmed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
