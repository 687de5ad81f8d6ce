//! kaiVen, a small interactive command shell.
//!
//! A command line is split on whitespace into tokens. The first token is
//! looked up among the built-ins (`cd`, `help`, `exit` and `suggest`); anything
//! else is resolved on `PATH` and launched as a child process, optionally with
//! its standard output redirected to a file with `> path`.
//!
//! The main entry point is [`Interpreter`]. The public modules [`command`] and
//! [`env`] expose the traits and types needed to register additional built-ins.

mod builtin;
pub mod command;
pub mod env;
pub mod errors;
mod external;
mod http;
mod interpreter;
pub mod lexer;
mod prompt;
mod redirection;
mod registry;
pub mod signal;
mod suggest;

pub use command::Status;
pub use interpreter::{Interpreter, LineSource, ReadOutcome};
pub use registry::Registry;

/// Name shown in the prompt, the help banner and every diagnostic.
pub const SHELL_NAME: &str = "kaiVen";
