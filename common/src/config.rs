use once_cell::sync::OnceCell;
use std::{env, fs};

/// Runtime configuration loaded once from the environment (and an optional
/// `.env` file). Initialized explicitly in `main` or by test helpers.
#[derive(Debug)]
pub struct Config {
    pub project_name: String,
    pub app_env: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_url: String,
    pub storage_root: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub max_upload_bytes: u64,
    pub student_email_domain: String,
}

static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    /// Loads configuration from `env_path` (if present) and the process
    /// environment. Required: `DATABASE_URL`, `JWT_SECRET`.
    pub fn init(env_path: &str) -> &'static Self {
        dotenvy::from_filename(env_path).ok();

        CONFIG.get_or_init(|| {
            let project_name =
                env::var("PROJECT_NAME").unwrap_or_else(|_| "coop-portal".into());
            let app_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
            let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into());
            let log_file = env::var("LOG_FILE").unwrap_or_else(|_| "logs/api.log".into());
            let log_to_stdout =
                env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true";
            let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
            let storage_root =
                env::var("STORAGE_ROOT").unwrap_or_else(|_| "data/uploads".into());
            let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into());
            let port = env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000);
            let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");
            let jwt_duration_minutes = env::var("JWT_DURATION_MINUTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(60);
            let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|m| m.parse().ok())
                .unwrap_or(5 * 1024 * 1024);
            let student_email_domain = env::var("STUDENT_EMAIL_DOMAIN")
                .unwrap_or_else(|_| "@student.prasetiyamulya.ac.id".into());

            if let Some(parent) = std::path::Path::new(&log_file).parent() {
                fs::create_dir_all(parent).expect("Failed to create log directory");
            }

            Config {
                project_name,
                app_env,
                log_level,
                log_file,
                log_to_stdout,
                database_url,
                storage_root,
                host,
                port,
                jwt_secret,
                jwt_duration_minutes,
                max_upload_bytes,
                student_email_domain,
            }
        })
    }

    pub fn get() -> &'static Self {
        CONFIG.get().expect("Config not initialized")
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}
