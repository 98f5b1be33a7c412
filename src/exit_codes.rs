//! Exit code constants for the grove CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Pipeline failure (step or required safety gate)
//! - 3: Git operation failure
//! - 4: Queue operation failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, or missing tool.
pub const USER_ERROR: i32 = 1;

/// Pipeline failure: a step failed or a required safety gate did not pass.
pub const PIPELINE_FAILURE: i32 = 2;

/// Git operation failure: branch, commit, or push errors.
pub const GIT_FAILURE: i32 = 3;

/// Queue operation failure: unknown id or persistence error.
pub const QUEUE_FAILURE: i32 = 4;
