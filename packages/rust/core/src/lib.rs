//! Batch orchestration for stdpdf.
//!
//! Ties the catalog loader, candidate generator and fetch-and-verify executor
//! into a single bounded, sequential run (see [`pipeline::run_batch`]).

pub mod pipeline;
pub mod report;

pub use pipeline::{
    PlannedItem, ProgressReporter, RunSummary, SilentProgress, plan_batch, progress_line,
    run_batch, run_batch_with,
};
