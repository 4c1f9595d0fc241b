//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.

mod capacity;
mod extract;
mod hide;

pub use capacity::CapacityCommand;
pub use extract::ExtractCommand;
pub use hide::HideCommand;

use anyhow::Result;
use veilpix::config::Settings;

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments and the loaded settings.
    fn execute(&self, settings: &Settings) -> Result<()>;
}
