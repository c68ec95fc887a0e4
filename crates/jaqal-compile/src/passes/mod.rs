//! Built-in compilation passes.
//!
//! - [`ParallelScheduler`]: rewrites unscheduled blocks into sequential and
//!   parallel blocks.
//! - [`ScheduleVerification`]: checks a circuit is in scheduled form.

pub mod schedule;
pub mod verification;

pub use schedule::{
    ParallelScheduler, is_parallelizable, is_parallelizable_block, is_parallelizable_gate,
    schedule_circuit, schedule_with_stats,
};
pub use verification::{ScheduleVerification, VerificationResult, verify_schedule};
