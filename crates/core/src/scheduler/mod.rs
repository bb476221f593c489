//! Background re-run of the ingestion on a jittered timer.
//!
//! Runs never overlap: the scheduled loop and [`Scheduler::run_now`] share a
//! run lock, and a run that is already in flight is never interrupted.

mod runner;
mod types;

pub use runner::{jittered_delay, Scheduler};
pub use types::{SchedulerError, SchedulerStatus};
