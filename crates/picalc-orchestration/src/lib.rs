//! # picalc-orchestration
//!
//! Worker pool, ordered parallel reduction, reducer selection and the
//! threaded entry points.

pub mod calculator_selection;
pub mod interfaces;
pub mod orchestrator;
pub mod pool;
pub mod scheduler;

pub use calculator_selection::{reducer_by_name, select_reducer};
pub use interfaces::{CalculationResult, ProgressReporter, ResultPresenter};
pub use orchestrator::{
    compute_pi_base_threaded, compute_pi_on_pool, compute_pi_with_options, execute_calculation,
    resume_threaded, run_self_test,
};
pub use pool::{TaskHandle, WorkerPool};
pub use scheduler::{chunk_ranges, ParallelScheduler};
