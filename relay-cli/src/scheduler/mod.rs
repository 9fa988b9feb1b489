//! Scheduler layer
//!
//! Polls the CI API for the workflows of a triggered pipeline until they
//! finish or the wait times out.

pub mod poller;

pub use poller::{WaitOutcome, WorkflowPoller};
