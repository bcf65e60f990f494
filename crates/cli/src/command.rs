//! Command trait for laminate CLI
//!
//! Every subcommand implements [`Command`] and receives the shared
//! [`RuntimeContext`] holding the resolved project directory and manifest.

use crate::common::RuntimeContext;
use crate::error::Result;

/// Trait for all laminate commands
///
/// Commands can specify their return type via the `Output` associated type.
/// Commands print their own output and also return what they found, so
/// tests can inspect the result without capturing stdout.
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use crate::error::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(short, long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         // context.project_dir(), context.manifest
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns a `CommandError` if the command fails to execute.
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
