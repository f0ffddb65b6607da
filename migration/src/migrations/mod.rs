pub mod m20250901_000001_create_users;
pub mod m20250901_000002_create_profiles;
pub mod m20250901_000003_create_companies;
pub mod m20250901_000004_create_applications;
pub mod m20250901_000005_create_placements;
pub mod m20250901_000006_create_reports;
pub mod m20250901_000007_create_evaluations;
pub mod m20250901_000008_create_notifications;
