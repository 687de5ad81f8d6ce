use crate::env::Environment;
use std::io::Write;

/// Continuation status returned by every command.
///
/// This is independent of the numeric exit code of any spawned process:
/// a program that fails still leaves the shell running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Read the next command line.
    Continue,
    /// Leave the interactive loop.
    Terminate,
}

/// Everything a command may touch while it runs.
///
/// `stdout` receives the command's regular output and `stderr` its
/// diagnostics. External programs inherit the real process streams instead;
/// only the launcher's own diagnostics go through `stderr`.
pub struct Context<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub env: &'a mut Environment,
    /// Names of the registered built-ins, in registry order.
    pub builtins: &'a [&'static str],
}

/// Object-safe trait for any command that can be executed by the shell.
///
/// This is implemented by built-ins via a blanket impl and by external commands.
pub trait ExecutableCommand {
    /// Executes the command. Failures are reported through `ctx.stderr`.
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Status;
}

/// Factory that creates a command from the full token sequence.
///
/// `args` excludes the command name itself.
pub trait CommandFactory {
    /// The name this factory answers to.
    fn name(&self) -> &'static str;

    /// Create a command instance for the provided arguments.
    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand>;
}
