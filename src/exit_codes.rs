//! Exit code constants for the agentform CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable files, unresolved indirections)
//! - 2: Validation failure (document parse errors or verify violations)
//! - 3: Model call failure
//! - 4: Deployment failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, missing files, or unresolvable configuration values.
pub const USER_ERROR: i32 = 1;

/// Validation failure: the document failed to parse or verify reported violations.
pub const VALIDATION_FAILURE: i32 = 2;

/// A language-model or embedding call failed.
pub const MODEL_FAILURE: i32 = 3;

/// A deployment runtime could not start or crashed.
pub const DEPLOY_FAILURE: i32 = 4;
