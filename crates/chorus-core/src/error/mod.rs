//! Unified error handling for the Chorus engine
//!
//! One closed taxonomy covers every provider failure; adapters translate
//! vendor HTTP shapes into it (see `llm::providers::error_utils`) and the
//! retry/fallback machinery consumes it through the classifier methods.

mod classifiers;
mod constructors;
mod types;

pub use types::{ChorusError, ChorusResult};
