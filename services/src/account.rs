//! Account creation and credential checks.
//!
//! Student registration is self-service and auto-approved; supervisor
//! accounts are provisioned by the system when an admin confirms a placement.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use common::config::Config;
use db::events::DomainEvent;
use db::models::student_profile::{self, Gender, Program, StudentStatus};
use db::models::supervisor_profile;
use db::models::user::{self, Role};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use regex::Regex;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DbConn, EntityTrait, QueryFilter, TransactionTrait};

use crate::{notification, ServiceError};

static NIM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{8}$").expect("valid regex"));

const MIN_PASSWORD_LEN: usize = 8;
const GENERATED_PASSWORD_LEN: usize = 12;

#[derive(Debug, Clone)]
pub struct RegisterStudent {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub full_name: String,
    pub nim: String,
    pub program: Program,
    pub cohort_year: String,
    pub gender: Gender,
    pub whatsapp: String,
    pub phone_number: Option<String>,
    pub consultation_doc_path: String,
    pub sptjm_doc_path: String,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::validation(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Registers a student account: user + profile in one transaction, status
/// `Approved` with `approved_at` stamped. Admins are notified.
pub async fn register_student(
    db: &DbConn,
    input: RegisterStudent,
) -> Result<(user::Model, student_profile::Model), ServiceError> {
    let domain = &Config::get().student_email_domain;
    let email = input.email.trim().to_lowercase();

    if !email.ends_with(domain.as_str()) {
        return Err(ServiceError::validation(format!(
            "email must end with {domain}"
        )));
    }
    if input.password.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if input.password != input.password_confirmation {
        return Err(ServiceError::validation("passwords do not match"));
    }
    if !NIM_RE.is_match(&input.nim) {
        return Err(ServiceError::validation("NIM must be exactly 8 digits"));
    }
    if input.consultation_doc_path.trim().is_empty() || input.sptjm_doc_path.trim().is_empty() {
        return Err(ServiceError::validation(
            "consultation and SPTJM documents are required",
        ));
    }
    if user::Model::email_taken(db, &email).await? {
        return Err(ServiceError::Duplicate("email"));
    }
    if student_profile::Model::nim_taken(db, &input.nim).await? {
        return Err(ServiceError::Duplicate("NIM"));
    }

    let password_hash = hash_password(&input.password)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(Role::Student),
        phone_number: Set(input.phone_number),
        is_email_verified: Set(false),
        force_password_change: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let profile = student_profile::ActiveModel {
        user_id: Set(user.id),
        full_name: Set(input.full_name),
        nim: Set(input.nim),
        program: Set(input.program),
        cohort_year: Set(input.cohort_year),
        gender: Set(input.gender),
        whatsapp: Set(input.whatsapp),
        consultation_doc_path: Set(input.consultation_doc_path),
        sptjm_doc_path: Set(input.sptjm_doc_path),
        cv_path: Set(None),
        gpa: Set(None),
        skills: Set(None),
        linkedin_url: Set(None),
        github_url: Set(None),
        status: Set(StudentStatus::Approved),
        approved_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(user_id = user.id, nim = %profile.nim, "student registered");

    notification::dispatch(
        db,
        &DomainEvent::StudentRegistered {
            user_id: user.id,
            student_id: profile.id,
            nim: profile.nim.clone(),
            registered_at: now,
        },
    )
    .await?;

    Ok((user, profile))
}

/// Provisions a supervisor account from placement snapshot data. Runs on the
/// caller's connection so placement confirmation can wrap it in its
/// transaction. Returns the generated password alongside the rows.
pub async fn create_supervisor_account<C: ConnectionTrait>(
    conn: &C,
    email: &str,
    full_name: &str,
    company_name: &str,
    position: &str,
    whatsapp: &str,
) -> Result<(user::Model, supervisor_profile::Model, String), ServiceError> {
    let email = email.trim().to_lowercase();

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.clone()))
        .one(conn)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::Duplicate("email"));
    }

    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect();
    let password_hash = hash_password(&password)?;
    let now = Utc::now();

    let user = user::ActiveModel {
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(Role::Supervisor),
        phone_number: Set(None),
        is_email_verified: Set(false),
        force_password_change: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    let profile = supervisor_profile::ActiveModel {
        user_id: Set(user.id),
        full_name: Set(full_name.to_owned()),
        company_name: Set(company_name.to_owned()),
        position: Set(position.to_owned()),
        whatsapp: Set(whatsapp.to_owned()),
        is_first_login: Set(true),
        credentials_sent_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok((user, profile, password))
}

/// Checks an email/password pair. Failures are indistinguishable to the
/// caller whether the account exists or not.
pub async fn verify_credentials(
    db: &DbConn,
    email: &str,
    password: &str,
) -> Result<user::Model, ServiceError> {
    let user = user::Model::find_by_email(db, email)
        .await?
        .ok_or_else(|| ServiceError::validation("invalid email or password"))?;

    if !verify_password(password, &user.password_hash) {
        return Err(ServiceError::validation("invalid email or password"));
    }

    Ok(user)
}

/// Rotates a password after checking the current one. Clears
/// `force_password_change` and, for supervisors, the first-login flag.
pub async fn change_password(
    db: &DbConn,
    user_id: i64,
    current_password: &str,
    new_password: &str,
) -> Result<user::Model, ServiceError> {
    if new_password.len() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let user = user::Entity::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("user"))?;

    if !verify_password(current_password, &user.password_hash) {
        return Err(ServiceError::validation("current password is incorrect"));
    }

    let role = user.role;
    let mut active_model: user::ActiveModel = user.into();
    active_model.password_hash = Set(hash_password(new_password)?);
    active_model.force_password_change = Set(false);
    active_model.updated_at = Set(Utc::now());
    let user = active_model.update(db).await?;

    if role == Role::Supervisor {
        if let Some(profile) = supervisor_profile::Model::find_by_user_id(db, user.id).await? {
            if profile.is_first_login {
                supervisor_profile::Model::clear_first_login(db, profile.id).await?;
            }
        }
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::init_test_config;
    use db::test_utils::setup_test_db;

    fn sample_input(email: &str, nim: &str) -> RegisterStudent {
        RegisterStudent {
            email: email.to_owned(),
            password: "rahasia-123".to_owned(),
            password_confirmation: "rahasia-123".to_owned(),
            full_name: "Budi Santoso".to_owned(),
            nim: nim.to_owned(),
            program: Program::Cse,
            cohort_year: "2022".to_owned(),
            gender: Gender::Male,
            whatsapp: "+6281234567890".to_owned(),
            phone_number: None,
            consultation_doc_path: "uploads/consultation/budi.pdf".to_owned(),
            sptjm_doc_path: "uploads/sptjm/budi.pdf".to_owned(),
        }
    }

    #[tokio::test]
    async fn register_creates_approved_student() {
        init_test_config();
        let db = setup_test_db().await;

        let (user, profile) = register_student(
            &db,
            sample_input("budi@student.prasetiyamulya.ac.id", "12345678"),
        )
        .await
        .unwrap();

        assert_eq!(user.role, Role::Student);
        assert_eq!(profile.status, StudentStatus::Approved);
        assert!(profile.approved_at.is_some());
    }

    #[tokio::test]
    async fn register_rejects_foreign_email_domain() {
        init_test_config();
        let db = setup_test_db().await;

        let err = register_student(&db, sample_input("budi@gmail.com", "12345678"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_nim() {
        init_test_config();
        let db = setup_test_db().await;

        register_student(
            &db,
            sample_input("budi@student.prasetiyamulya.ac.id", "12345678"),
        )
        .await
        .unwrap();

        let err = register_student(
            &db,
            sample_input("siti@student.prasetiyamulya.ac.id", "12345678"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Duplicate("NIM")));
    }

    #[tokio::test]
    async fn register_rejects_malformed_nim() {
        init_test_config();
        let db = setup_test_db().await;

        let err = register_student(
            &db,
            sample_input("budi@student.prasetiyamulya.ac.id", "123"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn credentials_round_trip() {
        init_test_config();
        let db = setup_test_db().await;

        register_student(
            &db,
            sample_input("budi@student.prasetiyamulya.ac.id", "12345678"),
        )
        .await
        .unwrap();

        let user =
            verify_credentials(&db, "budi@student.prasetiyamulya.ac.id", "rahasia-123")
                .await
                .unwrap();
        assert_eq!(user.email, "budi@student.prasetiyamulya.ac.id");

        let err = verify_credentials(&db, "budi@student.prasetiyamulya.ac.id", "salah")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
