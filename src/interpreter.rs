use crate::command::{Context, Status};
use crate::env::Environment;
use crate::errors::{ShellError, ShellResult};
use crate::registry::Registry;
use crate::signal::InterruptFlag;
use crate::{external, lexer, prompt};
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use std::io::Write;

/// What a single attempt to read a command line produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The user pressed Ctrl-C while editing.
    Interrupted,
    /// End of input.
    Eof,
}

/// Source of command lines for the interactive loop.
pub trait LineSource {
    /// Show `prompt` and read one line without its terminator.
    fn read_line(&mut self, prompt: &str) -> ShellResult<ReadOutcome>;
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> ShellResult<ReadOutcome> {
        match self.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(ShellError::Read(e.to_string())),
        }
    }
}

/// The interactive command interpreter.
///
/// Holds the shell [`Environment`] and the [`Registry`] of built-ins. Every
/// line is split into tokens, the first token is looked up among the
/// built-ins and anything else is launched as an external program.
///
/// ```no_run
/// use kaiven::Interpreter;
/// use kaiven::signal::InterruptFlag;
///
/// let interrupts = InterruptFlag::install().unwrap();
/// Interpreter::default().repl(&interrupts).unwrap();
/// ```
pub struct Interpreter {
    env: Environment,
    registry: Registry,
}

impl Interpreter {
    pub fn new(env: Environment, registry: Registry) -> Self {
        Self { env, registry }
    }

    /// Tokenize and run one command line.
    pub fn execute_line(
        &mut self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Status {
        let tokens = lexer::split_into_tokens(line);
        log::trace!("tokens: {tokens:?}");
        self.dispatch(&tokens, stdout, stderr)
    }

    /// Run a tokenized command line.
    ///
    /// An empty sequence does nothing. A first token naming a built-in runs it
    /// with the remaining tokens; otherwise the whole sequence goes to the
    /// process launcher.
    pub fn dispatch(
        &mut self,
        tokens: &[&str],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Status {
        let Some((name, args)) = tokens.split_first() else {
            return Status::Continue;
        };

        let mut ctx = Context {
            stdout,
            stderr,
            env: &mut self.env,
            builtins: self.registry.names(),
        };
        let status = match self.registry.lookup(name) {
            Some(factory) => {
                log::debug!("builtin: {name}");
                factory.create(args).execute(&mut ctx)
            }
            None => external::launch(tokens, &mut ctx),
        };

        // Built-in output is buffered; children write straight to the descriptor.
        let _ = ctx.stdout.flush();
        let _ = ctx.stderr.flush();
        status
    }

    /// Read and execute lines from `lines` until `exit`, end of input or a
    /// read failure.
    ///
    /// An interrupt during a read abandons the line and draws a fresh prompt,
    /// whether the line source reports it or it only raised `interrupts`.
    /// Interrupts that arrive between reads are discarded.
    pub fn run<L: LineSource + ?Sized>(
        &mut self,
        lines: &mut L,
        interrupts: &InterruptFlag,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> ShellResult<()> {
        loop {
            interrupts.take();
            let outcome = lines.read_line(&prompt::render())?;
            if interrupts.take() && matches!(outcome, ReadOutcome::Line(_)) {
                log::debug!("interrupted during read, line dropped");
                continue;
            }

            match outcome {
                ReadOutcome::Line(line) => {
                    if self.execute_line(&line, stdout, stderr) == Status::Terminate {
                        log::debug!("exit requested");
                        return Ok(());
                    }
                }
                ReadOutcome::Interrupted => log::debug!("line abandoned"),
                ReadOutcome::Eof => {
                    log::debug!("end of input");
                    return Ok(());
                }
            }
        }
    }

    /// Run the interactive loop on the terminal.
    pub fn repl(&mut self, interrupts: &InterruptFlag) -> ShellResult<()> {
        let config = Config::builder().auto_add_history(false).build();
        // On a terminal the editor takes over SIGINT while it lives, so a
        // delivered interrupt ends `readline` with `Interrupted`.
        let mut editor =
            DefaultEditor::with_config(config).map_err(|e| ShellError::Read(e.to_string()))?;
        self.run(
            &mut editor,
            interrupts,
            &mut std::io::stdout(),
            &mut std::io::stderr(),
        )
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(Environment::new(), Registry::default())
    }
}
