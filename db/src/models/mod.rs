pub mod admin_profile;
pub mod application;
pub mod company;
pub mod evaluation;
pub mod evaluation_reminder;
pub mod internship_placement;
pub mod job_posting;
pub mod monthly_report;
pub mod notification;
pub mod report_feedback;
pub mod student_profile;
pub mod supervisor_profile;
pub mod user;

pub use admin_profile::Entity as AdminProfile;
pub use application::Entity as Application;
pub use company::Entity as Company;
pub use evaluation::Entity as Evaluation;
pub use evaluation_reminder::Entity as EvaluationReminder;
pub use internship_placement::Entity as InternshipPlacement;
pub use job_posting::Entity as JobPosting;
pub use monthly_report::Entity as MonthlyReport;
pub use notification::Entity as Notification;
pub use report_feedback::Entity as ReportFeedback;
pub use student_profile::Entity as StudentProfile;
pub use supervisor_profile::Entity as SupervisorProfile;
pub use user::Entity as User;
