//! Command dispatch, kept out of the binary.

use std::path::PathBuf;

use anyhow::Result;

use super::args::Commands;
use super::handlers::{handle_build, handle_check, handle_enrich, BuildArgs};
use crate::exit::TierGraphExit;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands, config: Option<PathBuf>) -> Result<TierGraphExit> {
    match command {
        Commands::Build {
            input,
            output,
            level,
            compact,
        } => handle_build(&BuildArgs {
            config,
            input,
            output,
            level,
            compact,
        }),
        Commands::Check { input } => handle_check(config.as_deref(), &input),
        Commands::Enrich {
            graph,
            responses,
            output,
        } => handle_enrich(&graph, &responses, output.as_deref()),
    }
}
