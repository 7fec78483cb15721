//! Live migration tests
//!
//! - `migration`: the three scenarios, in order, plus a validating dry run

pub mod common;
pub mod migration;
