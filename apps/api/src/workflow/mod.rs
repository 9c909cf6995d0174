//! Submission workflow: rate limiting, validation, job records and the
//! submit/process orchestration behind `POST /` and `POST /process`.

pub mod clock;
pub mod handlers;
pub mod jobs;
pub mod orchestrator;
pub mod rate_limit;
pub mod validation;

pub use orchestrator::Orchestrator;
