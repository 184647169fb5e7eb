pub mod application_ctx;
pub mod form_flow;
pub mod page_cycle;
pub mod queries;

pub use application_ctx::ApplicationCtx;
pub use form_flow::{field_instruction, FormFlow};
pub use page_cycle::{PageCycleState, Progress};
