//! Data Transfer Objects for the CI API
//!
//! Request and response bodies as they travel over the wire.

pub mod pipeline;
pub mod workflow;
