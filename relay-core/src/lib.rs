//! Relay Core
//!
//! Core types and abstractions for triggering and watching remote CI pipelines.
//!
//! This crate contains:
//! - Domain types: trigger targets, pipeline handles, workflow statuses
//! - DTOs: request and response bodies exchanged with the CI API
//!
//! Everything here is pure: no I/O, no environment lookups.

pub mod domain;
pub mod dto;
