use crate::SHELL_NAME;
use crate::command::{Context, ExecutableCommand, Status};
use crate::env::Environment;
use crate::errors::{ShellError, ShellResult};
use crate::redirection::{Redirection, parse_redirection};
use std::borrow::Cow;
use std::ffi::OsStr;
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

/// Command that is not a builtin.
#[derive(Debug)]
pub struct ExternalCommand {
    /// Program name as typed; empty when the line was only a redirection.
    name: String,
    args: Vec<String>,
    redirect: Option<Redirection>,
}

impl ExternalCommand {
    /// Build a command from a full token sequence, detecting an output redirection.
    pub fn parse(tokens: &[&str]) -> ShellResult<Self> {
        let (argv, redirect) = parse_redirection(tokens)?;
        let (name, args) = match argv.split_first() {
            Some((name, args)) => (name.to_string(), args.iter().map(|a| a.to_string()).collect()),
            None => (String::new(), Vec::new()),
        };
        Ok(Self {
            name,
            args,
            redirect,
        })
    }

    /// Spawn the program and block until it exits or is killed by a signal.
    ///
    /// Returns `None` when there was no program to run. The child's exit
    /// status is returned for logging only; the shell does not interpret it.
    pub fn run(self, env: &Environment) -> ShellResult<Option<ExitStatus>> {
        // Opened before the program is resolved, so `missing > out` still creates `out`.
        let stdout = match &self.redirect {
            Some(redirect) => {
                log::debug!("redirecting stdout to {}", redirect.path.display());
                Stdio::from(redirect.open()?)
            }
            None => Stdio::inherit(),
        };

        if self.name.is_empty() {
            return Ok(None);
        }

        let program = match env.get_var("PATH") {
            Some(search_paths) => {
                find_command_path(OsStr::new(&search_paths), Path::new(&self.name))
                    .ok_or_else(|| ShellError::CommandNotFound(self.name.clone()))?
                    .into_owned()
            }
            None => PathBuf::from(&self.name),
        };

        let mut cmd = std::process::Command::new(&program);
        cmd.arg0(&self.name)
            .args(&self.args)
            .stdout(stdout)
            .envs(env.vars.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .current_dir(&env.current_dir);

        // SAFETY: the hook runs in the forked child before exec and only calls
        // signal(2), which is async-signal-safe.
        unsafe {
            cmd.pre_exec(|| {
                if libc::signal(libc::SIGINT, libc::SIG_DFL) == libc::SIG_ERR {
                    return Err(io::Error::last_os_error());
                }
                Ok(())
            });
        }

        let mut child = cmd.spawn().map_err(|source| ShellError::Spawn {
            name: self.name.clone(),
            source,
        })?;
        log::debug!("spawned {} as pid {}", program.display(), child.id());

        // Child::wait only returns once the child has exited or been killed;
        // stopped children keep it blocked.
        let status = child.wait().map_err(ShellError::Wait)?;
        log::debug!("pid {} finished: {status}", child.id());
        Ok(Some(status))
    }
}

impl ExecutableCommand for ExternalCommand {
    fn execute(self: Box<Self>, ctx: &mut Context<'_>) -> Status {
        match (*self).run(ctx.env) {
            // The terminal shows `^C` after the child's output; start the prompt on a fresh line.
            Ok(Some(status)) if status.signal() == Some(libc::SIGINT) => {
                let _ = writeln!(ctx.stdout);
            }
            Ok(_) => {}
            Err(e) => {
                log::debug!("launch failed: {e:?}");
                let _ = writeln!(ctx.stderr, "{SHELL_NAME}: {e}");
            }
        }
        Status::Continue
    }
}

/// Launch an external program for a token sequence. Always keeps the shell looping.
pub fn launch(tokens: &[&str], ctx: &mut Context<'_>) -> Status {
    match ExternalCommand::parse(tokens) {
        Ok(cmd) => Box::new(cmd).execute(ctx),
        Err(e) => {
            let _ = writeln!(ctx.stderr, "{SHELL_NAME}: {e}");
            Status::Continue
        }
    }
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it is a file.
/// - Relative with multiple components (e.g., `bin/sh` or `./foo`): returns it if it is a file.
/// - Single path component (no separators): search each directory in `search_paths` (PATH)
///   and return the first match.
/// - Empty path: returns `None`.
///
/// Returns either a borrowed reference to the provided `path` or an owned `PathBuf`
/// when the result is discovered via PATH lookup.
pub fn find_command_path<'a>(search_paths: &OsStr, path: &'a Path) -> Option<Cow<'a, Path>> {
    if path.is_absolute() {
        return find_by_path(path).map(Cow::Borrowed);
    }

    let mut components = path.components();
    let first = components.next();
    let second = components.next();
    match (first, second) {
        (None, None) => None,
        (Some(x), None) if !path.to_string_lossy().contains('/') => {
            find_in_path(search_paths, x.as_os_str()).map(Cow::Owned)
        }
        _ => find_by_path(path).map(Cow::Borrowed),
    }
}

/// Like `execvp`, skips PATH entries that exist but cannot be executed.
fn find_in_path(search_paths: &OsStr, cmd: &OsStr) -> Option<PathBuf> {
    std::env::split_paths(search_paths)
        .map(|dir| dir.join(cmd))
        .find(|path| is_executable(path))
}

fn is_executable(path: &Path) -> bool {
    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

fn find_by_path(path: &Path) -> Option<&Path> {
    if path.is_file() { Some(path) } else { None }
}
