use crate::SHELL_NAME;
use std::io;
use std::path::PathBuf;

/// Render the prompt for the current working directory.
///
/// The directory is looked up on every call, so a redraw after an interrupt
/// shows the same thing a regular iteration would.
pub fn render() -> String {
    render_for(std::env::current_dir())
}

fn render_for(cwd: io::Result<PathBuf>) -> String {
    match cwd {
        Ok(cwd) => format!(
            "\x1b[1;36m{SHELL_NAME}\x1b[0m:\x1b[1;32m{}\x1b[0m$ ",
            cwd.display()
        ),
        Err(e) => {
            log::warn!("getcwd: {e}");
            format!("{SHELL_NAME}$ ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_the_directory() {
        let prompt = render_for(Ok(PathBuf::from("/srv/data")));
        assert_eq!(prompt, "\x1b[1;36mkaiVen\x1b[0m:\x1b[1;32m/srv/data\x1b[0m$ ");
    }

    #[test]
    fn falls_back_without_a_directory() {
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(render_for(Err(err)), "kaiVen$ ");
    }
}
