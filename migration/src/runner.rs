use sea_orm_migration::prelude::*;
use std::time::Instant;

pub async fn run_all_migrations(url: &str) {
    let db = sea_orm::Database::connect(url)
        .await
        .expect("DB connection failed");

    let schema_manager = SchemaManager::new(&db);

    for migration in <migration::Migrator as MigratorTrait>::migrations() {
        let start = Instant::now();
        match migration.up(&schema_manager).await {
            Ok(()) => println!("applied {} ({:.2?})", migration.name(), start.elapsed()),
            Err(e) => {
                eprintln!("migration {} failed: {e}", migration.name());
                std::process::exit(1);
            }
        }
    }
}
