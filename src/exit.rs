// src/exit.rs
//! Process exit codes for `tiergraph`.
//!
//! Provides a stable contract for scripts and CI jobs.

use colored::Colorize;
use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum TierGraphExit {
    /// Graph built (or check passed).
    Success = 0,
    /// Generic error (IO, config, cancellation).
    Error = 1,
    /// The inventory was structurally invalid or unparseable.
    InvalidInput = 2,
    /// `check` found non-determinism or invariant violations.
    CheckFailed = 3,
}

impl TierGraphExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for TierGraphExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl From<anyhow::Result<TierGraphExit>> for TierGraphExit {
    fn from(res: anyhow::Result<TierGraphExit>) -> Self {
        match res {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{} {e:#}", "Error:".red());
                let input_error = e
                    .chain()
                    .filter_map(|cause| cause.downcast_ref::<crate::error::EngineError>())
                    .any(crate::error::EngineError::is_input_error);
                if input_error {
                    Self::InvalidInput
                } else {
                    Self::Error
                }
            }
        }
    }
}
