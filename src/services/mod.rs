pub mod context_formatter;
pub mod field_classifier;
pub mod job_locator;
pub mod llm_service;
pub mod pattern_filler;
pub mod report_writer;

pub use context_formatter::format_applicant_context;
pub use field_classifier::{classify_label, ProfileField};
pub use job_locator::JobLocator;
pub use llm_service::LlmService;
pub use pattern_filler::{DocumentKind, PatternFiller};
pub use report_writer::ReportWriter;
