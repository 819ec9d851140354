//! Response pipeline stages shared by the task modules
//!
//! - `tiered`: sequential retry ladder over attempt plans
//! - `extract`: lenient JSON extraction from model text
//! - `sanitize`: schema coercion with fixed defaults
//! - `format`: markdown rendering and length capping

pub mod extract;
pub mod format;
pub mod sanitize;
pub mod tiered;

pub use extract::extract_json;
pub use tiered::{run_tiered, run_tiered_with_fallback, AttemptPlan, RetryPolicy, TieredOutcome};
