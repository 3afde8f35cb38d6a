//! Error handling and exit codes.

use picalc_core::calculator::PiError;
use picalc_core::constants::exit_codes;

/// Application-level failures that are not computation errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The self-test digits disagree with the reference.
    #[error("self-test failed at {digits} digits (first mismatch at character {index})")]
    SelfTestFailed { digits: u64, index: usize },
}

/// Map a computation error to its exit code.
pub fn handle_error(err: &PiError) -> i32 {
    match err {
        PiError::Config(_) | PiError::Checkpoint(_) => exit_codes::ERROR_CONFIG,
        PiError::PoolStopped | PiError::TaskFailed(_) => exit_codes::ERROR_POOL,
        PiError::Render(_) | PiError::Arithmetic(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for an error returned by [`crate::app::run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(err) = err.downcast_ref::<PiError>() {
        return handle_error(err);
    }
    match err.downcast_ref::<AppError>() {
        Some(AppError::SelfTestFailed { .. }) => exit_codes::ERROR_SELF_TEST,
        None => exit_codes::ERROR_GENERIC,
    }
}
