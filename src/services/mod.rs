pub mod clusters;
pub mod eligibility;
pub mod integrity;
pub mod meetings;
pub mod recommendations;
pub mod scheduler;
pub mod templates;
