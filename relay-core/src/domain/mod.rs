//! Core domain types
//!
//! These types describe what gets triggered (`target`), what the CI system
//! hands back (`pipeline`) and how its workflows progress (`workflow`).

pub mod pipeline;
pub mod target;
pub mod workflow;
