use crate::SHELL_NAME;
use crate::command::{CommandFactory, Context, ExecutableCommand, Status};
use crate::registry::Factory;
use crate::suggest;
use anyhow::{Context as _, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;

/// Built-in commands known to the shell at compile time.
///
/// Builtins are parsed using the [`argh`] crate (`FromArgs`) and executed directly
/// in-process without spawning a child process.
pub(crate) trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "exit".
    fn name() -> &'static str;

    /// Executes the command.
    ///
    /// An `Err` is reported as a diagnostic and the shell keeps looping.
    fn execute(self, ctx: &mut Context<'_>) -> Result<Status>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Status {
        match <T as BuiltinCommand>::execute(*self, ctx) {
            Ok(status) => status,
            Err(e) => {
                log::debug!("builtin {} failed: {e:?}", T::name());
                let _ = writeln!(ctx.stderr, "{SHELL_NAME}: {e:#}");
                Status::Continue
            }
        }
    }
}

/// Output of a built-in whose arguments did not parse, or that was asked for `--help`.
struct InvalidArgs {
    output: String,
    is_error: bool,
}

impl ExecutableCommand for InvalidArgs {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Status {
        let output = self.output.trim_end();
        let _ = if self.is_error {
            writeln!(ctx.stderr, "{SHELL_NAME}: {output}")
        } else {
            writeln!(ctx.stdout, "{output}")
        };
        Status::Continue
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn name(&self) -> &'static str {
        T::name()
    }

    fn create(&self, args: &[&str]) -> Box<dyn ExecutableCommand> {
        match T::from_args(&[T::name()], args) {
            Ok(cmd) => Box::new(cmd),
            Err(EarlyExit { output, status }) => Box::new(InvalidArgs {
                output,
                is_error: status.is_err(),
            }),
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Status> {
        let Some(target) = self.target else {
            anyhow::bail!("cd: missing operand");
        };

        env::set_current_dir(&target).with_context(|| format!("cd: {target}"))?;
        ctx.env.current_dir = env::current_dir().context("cd: can't read new directory")?;
        log::debug!("cwd is now {}", ctx.env.current_dir.display());
        Ok(Status::Continue)
    }
}

#[derive(FromArgs)]
/// List the shell's built-in commands.
pub struct Help {
    #[argh(positional, greedy)]
    /// ignored.
    pub _topics: Vec<String>,
}

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Status> {
        writeln!(ctx.stdout, "{SHELL_NAME} shell, version 1.0")?;
        writeln!(
            ctx.stdout,
            "These shell commands are defined internally. Type `help' to see this list."
        )?;
        for name in ctx.builtins {
            writeln!(ctx.stdout, " {name}")?;
        }
        Ok(Status::Continue)
    }
}

/// Exit the shell. Any arguments are ignored.
pub struct Exit;

impl FromArgs for Exit {
    fn from_args(_command_name: &[&str], _args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Exit)
    }
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, _ctx: &mut Context<'_>) -> Result<Status> {
        Ok(Status::Terminate)
    }
}

/// Ask a text-generation service for help with a command.
///
/// All arguments are free text, so they are taken verbatim instead of being
/// parsed as flags.
pub struct Suggest {
    pub words: Vec<String>,
}

impl FromArgs for Suggest {
    fn from_args(_command_name: &[&str], args: &[&str]) -> Result<Self, EarlyExit> {
        Ok(Suggest {
            words: args.iter().map(|s| s.to_string()).collect(),
        })
    }
}

impl BuiltinCommand for Suggest {
    fn name() -> &'static str {
        "suggest"
    }

    fn execute(self, ctx: &mut Context<'_>) -> Result<Status> {
        // Flattened: the error's Display already carries its cause.
        let answer =
            suggest::suggest(ctx.env, &self.words).map_err(|e| anyhow::anyhow!("suggest: {e}"))?;
        writeln!(ctx.stdout, "{answer}")?;
        Ok(Status::Continue)
    }
}
