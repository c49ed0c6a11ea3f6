//! State module for tracking audit progress
//!
//! # Components
//!
//! - `RunStatus`: lifecycle of a single page audit (queued, running, completed, failed)
//! - `BatchStatus`: lifecycle of a batch of runs (queued, running, completed)

mod batch_state;
mod run_state;

pub use batch_state::BatchStatus;
pub use run_state::RunStatus;
