use crate::errors::{ShellError, ShellResult};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

/// Token that introduces an output redirection.
pub const REDIRECT_MARKER: &str = ">";

/// Permission bits for files created by a redirection (`rw-r--r--`).
pub const REDIRECT_MODE: u32 = 0o644;

/// Standard output of a command diverted into a file, truncating it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub path: PathBuf,
}

impl Redirection {
    /// Open the target for writing, creating it if absent and truncating it if present.
    pub fn open(&self) -> ShellResult<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(REDIRECT_MODE)
            .open(&self.path)
            .map_err(|source| ShellError::Redirect {
                path: self.path.clone(),
                source,
            })
    }
}

/// Split a token sequence into the program's argument vector and an optional
/// redirection.
///
/// The first token equal to `>` starts the redirection and the token after it
/// is the target. The marker, the target and anything after them are dropped
/// from the returned arguments.
pub fn parse_redirection<'a, 't>(
    tokens: &'a [&'t str],
) -> ShellResult<(&'a [&'t str], Option<Redirection>)> {
    match tokens.iter().position(|t| *t == REDIRECT_MARKER) {
        None => Ok((tokens, None)),
        Some(i) => match tokens.get(i + 1) {
            Some(target) => Ok((
                &tokens[..i],
                Some(Redirection {
                    path: PathBuf::from(target),
                }),
            )),
            None => Err(ShellError::Syntax("newline".to_string())),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn no_marker_passes_through() {
        let tokens = ["ls", "-l", "/tmp"];
        let (argv, redir) = parse_redirection(&tokens).unwrap();
        assert_eq!(argv, &tokens);
        assert_eq!(redir, None);
    }

    #[test]
    fn marker_and_target_are_removed() {
        let tokens = ["echo", "a", "b", ">", "out.txt"];
        let (argv, redir) = parse_redirection(&tokens).unwrap();
        assert_eq!(argv, &["echo", "a", "b"]);
        assert_eq!(redir.unwrap().path, PathBuf::from("out.txt"));
    }

    #[test]
    fn tokens_after_target_are_dropped() {
        let tokens = ["echo", "a", ">", "out.txt", "b", "c"];
        let (argv, redir) = parse_redirection(&tokens).unwrap();
        assert_eq!(argv, &["echo", "a"]);
        assert_eq!(redir.unwrap().path, PathBuf::from("out.txt"));
    }

    #[test]
    fn first_marker_wins() {
        let tokens = ["echo", ">", "one", ">", "two"];
        let (argv, redir) = parse_redirection(&tokens).unwrap();
        assert_eq!(argv, &["echo"]);
        assert_eq!(redir.unwrap().path, PathBuf::from("one"));
    }

    #[test]
    fn trailing_marker_is_a_syntax_error() {
        let err = parse_redirection(&["echo", "hi", ">"]).unwrap_err();
        assert!(matches!(err, ShellError::Syntax(_)));
        assert_eq!(
            err.to_string(),
            "syntax error near unexpected token `newline'"
        );
    }

    #[test]
    fn attached_marker_is_an_ordinary_word() {
        let tokens = ["echo", ">out"];
        let (argv, redir) = parse_redirection(&tokens).unwrap();
        assert_eq!(argv, &tokens);
        assert!(redir.is_none());
    }

    #[test]
    fn open_creates_and_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        fs::write(&path, "a much longer previous content\n").unwrap();

        let redir = Redirection { path: path.clone() };
        drop(redir.open().unwrap());
        assert_eq!(fs::read(&path).unwrap(), b"");

        let fresh = dir.path().join("fresh.txt");
        drop(Redirection { path: fresh.clone() }.open().unwrap());
        let mode = fs::metadata(&fresh).unwrap().permissions().mode();
        assert_eq!(mode & 0o600, 0o600);
        assert_eq!(mode & 0o133, 0);
    }

    #[test]
    fn open_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        let err = Redirection { path: path.clone() }.open().unwrap_err();
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }
}
