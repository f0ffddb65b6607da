use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m20250901_000001_create_users::Migration),
            Box::new(migrations::m20250901_000002_create_profiles::Migration),
            Box::new(migrations::m20250901_000003_create_companies::Migration),
            Box::new(migrations::m20250901_000004_create_applications::Migration),
            Box::new(migrations::m20250901_000005_create_placements::Migration),
            Box::new(migrations::m20250901_000006_create_reports::Migration),
            Box::new(migrations::m20250901_000007_create_evaluations::Migration),
            Box::new(migrations::m20250901_000008_create_notifications::Migration),
        ]
    }
}
