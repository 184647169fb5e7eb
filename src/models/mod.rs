pub mod field;
pub mod job;
pub mod loaders;
pub mod outcome;
pub mod profile;

pub use field::{default_required_predicate, FieldDescriptor, FieldKind, RequiredPredicate};
pub use job::{resolve_apply_url, ApplyOption, Job, JobSearchRequest, JobSearchResult, JobType};
pub use loaders::{load_jobs, load_profile};
pub use outcome::{ApplicationOutcome, BatchSummary, CaptchaPolicy, JobResult, JobStatus};
pub use profile::{yes_no, ApplicantProfile, Education, Project, WorkExperience};
