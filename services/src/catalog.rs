//! Admin-managed company and job posting catalog.

use chrono::{NaiveDate, Utc};
use db::models::company::{self, Industry};
use db::models::job_posting::{self, JobStatus, WorkType};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, DbConn, EntityTrait, ModelTrait};

use crate::{Actor, ServiceError};

#[derive(Debug, Clone)]
pub struct CompanyInput {
    pub name: String,
    pub industry: Industry,
    pub description: Option<String>,
    pub address: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone)]
pub struct JobPostingInput {
    pub company_id: i64,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub benefits: Option<String>,
    pub work_type: WorkType,
    pub location: String,
    pub duration_months: i32,
    pub slots_available: i32,
    pub application_deadline: NaiveDate,
    pub status: JobStatus,
}

fn require_admin(actor: Actor) -> Result<(), ServiceError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub async fn create_company(
    db: &DbConn,
    actor: Actor,
    input: CompanyInput,
) -> Result<company::Model, ServiceError> {
    require_admin(actor)?;
    if input.name.trim().is_empty() {
        return Err(ServiceError::validation("company name is required"));
    }

    Ok(company::Model::create(
        db,
        &input.name,
        input.industry,
        input.description.as_deref(),
        &input.address,
        input.website.as_deref(),
    )
    .await?)
}

pub async fn update_company(
    db: &DbConn,
    actor: Actor,
    company_id: i64,
    input: CompanyInput,
) -> Result<company::Model, ServiceError> {
    require_admin(actor)?;

    let existing = company::Entity::find_by_id(company_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("company"))?;

    let mut active_model: company::ActiveModel = existing.into();
    active_model.name = Set(input.name);
    active_model.industry = Set(input.industry);
    active_model.description = Set(input.description);
    active_model.address = Set(input.address);
    active_model.website = Set(input.website);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

/// Removes a company and, through the FK cascade, its postings.
pub async fn delete_company(db: &DbConn, actor: Actor, company_id: i64) -> Result<(), ServiceError> {
    require_admin(actor)?;

    let existing = company::Entity::find_by_id(company_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("company"))?;

    existing.delete(db).await?;
    Ok(())
}

pub async fn create_job(
    db: &DbConn,
    actor: Actor,
    input: JobPostingInput,
) -> Result<job_posting::Model, ServiceError> {
    require_admin(actor)?;

    company::Entity::find_by_id(input.company_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("company"))?;

    if input.duration_months < 1 {
        return Err(ServiceError::validation("duration must be at least 1 month"));
    }
    if input.slots_available < 1 {
        return Err(ServiceError::validation("at least one slot is required"));
    }

    let now = Utc::now();
    let active_model = job_posting::ActiveModel {
        company_id: Set(input.company_id),
        title: Set(input.title),
        description: Set(input.description),
        requirements: Set(input.requirements),
        benefits: Set(input.benefits),
        work_type: Set(input.work_type),
        location: Set(input.location),
        duration_months: Set(input.duration_months),
        slots_available: Set(input.slots_available),
        application_deadline: Set(input.application_deadline),
        status: Set(input.status),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(active_model.insert(db).await?)
}

pub async fn update_job(
    db: &DbConn,
    actor: Actor,
    job_id: i64,
    input: JobPostingInput,
) -> Result<job_posting::Model, ServiceError> {
    require_admin(actor)?;

    let existing = job_posting::Entity::find_by_id(job_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("job posting"))?;

    let mut active_model: job_posting::ActiveModel = existing.into();
    active_model.title = Set(input.title);
    active_model.description = Set(input.description);
    active_model.requirements = Set(input.requirements);
    active_model.benefits = Set(input.benefits);
    active_model.work_type = Set(input.work_type);
    active_model.location = Set(input.location);
    active_model.duration_months = Set(input.duration_months);
    active_model.slots_available = Set(input.slots_available);
    active_model.application_deadline = Set(input.application_deadline);
    active_model.status = Set(input.status);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

pub async fn set_job_status(
    db: &DbConn,
    actor: Actor,
    job_id: i64,
    status: JobStatus,
) -> Result<job_posting::Model, ServiceError> {
    require_admin(actor)?;

    let existing = job_posting::Entity::find_by_id(job_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("job posting"))?;

    let mut active_model: job_posting::ActiveModel = existing.into();
    active_model.status = Set(status);
    active_model.updated_at = Set(Utc::now());
    Ok(active_model.update(db).await?)
}

pub async fn delete_job(db: &DbConn, actor: Actor, job_id: i64) -> Result<(), ServiceError> {
    require_admin(actor)?;

    let existing = job_posting::Entity::find_by_id(job_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("job posting"))?;

    existing.delete(db).await?;
    Ok(())
}

/// Postings students may browse.
pub async fn browse_open(db: &DbConn) -> Result<Vec<job_posting::Model>, ServiceError> {
    Ok(job_posting::Model::find_open(db).await?)
}

/// A single posting, visible only while `Open`.
pub async fn get_open(db: &DbConn, job_id: i64) -> Result<job_posting::Model, ServiceError> {
    let posting = job_posting::Entity::find_by_id(job_id)
        .one(db)
        .await?
        .ok_or(ServiceError::NotFound("job posting"))?;

    if posting.status != JobStatus::Open {
        return Err(ServiceError::NotFound("job posting"));
    }
    Ok(posting)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_admin, seed_student};
    use chrono::Duration;
    use db::models::user::Role;
    use db::test_utils::setup_test_db;

    fn posting_input(company_id: i64, status: JobStatus) -> JobPostingInput {
        JobPostingInput {
            company_id,
            title: "Data Analyst Intern".to_owned(),
            description: "Dashboards and reporting".to_owned(),
            requirements: "SQL".to_owned(),
            benefits: Some("Lunch allowance".to_owned()),
            work_type: WorkType::Onsite,
            location: "Jakarta".to_owned(),
            duration_months: 6,
            slots_available: 1,
            application_deadline: Utc::now().date_naive() + Duration::days(30),
            status,
        }
    }

    #[tokio::test]
    async fn catalog_writes_are_admin_only() {
        let db = setup_test_db().await;
        let (student, _) =
            seed_student(&db, "budi@student.prasetiyamulya.ac.id", "12345678", 0).await;

        let err = create_company(
            &db,
            Actor::new(student.id, Role::Student),
            CompanyInput {
                name: "PT Maju Jaya".to_owned(),
                industry: Industry::Tech,
                description: None,
                address: "Jakarta".to_owned(),
                website: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn browse_lists_only_open_postings() {
        let db = setup_test_db().await;
        let admin = seed_admin(&db).await;
        let company = create_company(
            &db,
            admin,
            CompanyInput {
                name: "PT Maju Jaya".to_owned(),
                industry: Industry::Finance,
                description: None,
                address: "Jakarta".to_owned(),
                website: None,
            },
        )
        .await
        .unwrap();

        let open = create_job(&db, admin, posting_input(company.id, JobStatus::Open))
            .await
            .unwrap();
        let draft = create_job(&db, admin, posting_input(company.id, JobStatus::Draft))
            .await
            .unwrap();

        let listed = browse_open(&db).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, open.id);

        assert!(get_open(&db, draft.id).await.is_err());
    }
}
