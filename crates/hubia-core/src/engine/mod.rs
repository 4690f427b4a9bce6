pub mod intent;
pub mod orchestrator;

pub use intent::{is_catalog_question, is_interpretive, Intent};
pub use orchestrator::QueryEngine;
