//! Command executor trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs a program with arguments and captures its output
///
/// Arguments are passed verbatim, never through a shell, so package names
/// with spaces need no quoting.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a program to completion
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandResult, ExecError>;

    /// Run a program, giving up after `timeout`
    ///
    /// On timeout the child is abandoned, not killed.
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;

    /// Executor type name, for logging
    fn executor_type(&self) -> &'static str;
}
