use std::collections::HashMap;
use std::env as stdenv;
use std::path::PathBuf;

/// Name of the variable holding the `suggest` credential.
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
/// Overrides the base URL of the text-generation service.
pub const ENDPOINT_VAR: &str = "KAIVEN_SUGGEST_ENDPOINT";
/// Overrides the model used by `suggest`.
pub const MODEL_VAR: &str = "KAIVEN_SUGGEST_MODEL";

/// Mutable, user-level view of the process environment used by the interpreter.
///
/// The environment contains:
/// - `vars`: a map of environment variables that will be visible to executed commands.
/// - `current_dir`: the working directory for command execution.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Key-value store of environment variables (e.g., PATH, HOME).
    pub vars: HashMap<String, String>,
    /// The current working directory for command execution.
    pub current_dir: PathBuf,
}

impl Environment {
    /// Capture the current process state into a new `Environment` instance.
    pub fn new() -> Self {
        let vars = stdenv::vars().collect();
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { vars, current_dir }
    }

    /// An environment with no variables, rooted at the process working directory.
    pub fn empty() -> Self {
        Self {
            vars: HashMap::new(),
            current_dir: stdenv::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Get the value of an environment variable from `self.vars`.
    pub fn get_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    /// Set or override an environment variable in `self.vars`.
    pub fn set_var(&mut self, key: impl Into<String>, val: impl Into<String>) {
        self.vars.insert(key.into(), val.into());
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_set_and_get_var() {
        let mut env = Environment::empty();

        assert_eq!(env.get_var("SOME_RANDOM_ENV_VAR_12345"), None);

        env.set_var("KEY", "VALUE");
        assert_eq!(env.get_var("KEY"), Some("VALUE".to_string()));

        env.set_var("KEY", "OTHER");
        assert_eq!(env.get_var("KEY"), Some("OTHER".to_string()));
    }

    #[test]
    fn test_env_reads_from_process_env() {
        let env = Environment::new();
        assert!(env.get_var("PATH").is_some());
        assert!(env.current_dir.is_absolute());
    }
}
