//! Lexical analysis for command lines.
//!
//! The shell understands a single kind of token: a word. Words are separated
//! by runs of delimiter characters. There is no quoting, escaping or comment
//! syntax, so a delimiter can never appear inside a word.

/// Characters that separate words: space, tab, carriage return, newline and bell.
pub const DELIMITERS: &[char] = &[' ', '\t', '\r', '\n', '\x07'];

/// Returns `true` if `ch` separates words.
pub fn is_delimiter(ch: char) -> bool {
    DELIMITERS.contains(&ch)
}

/// Splits a command line into word tokens.
///
/// Consecutive delimiters collapse and leading or trailing delimiters never
/// produce empty tokens. The returned tokens borrow from `line`, so the token
/// sequence cannot outlive the line it was read from.
///
/// # Examples
/// ```
/// use kaiven::lexer::split_into_tokens;
/// assert_eq!(split_into_tokens("  ls\t-la \n"), vec!["ls", "-la"]);
/// assert!(split_into_tokens(" \t\r\n").is_empty());
/// ```
pub fn split_into_tokens(line: &str) -> Vec<&str> {
    line.split(is_delimiter)
        .filter(|word| !word.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_every_delimiter() {
        let tokens = split_into_tokens("a b\tc\rd\ne\x07f");
        assert_eq!(tokens, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn collapses_runs_and_trims_edges() {
        let tokens = split_into_tokens(" \t echo   hello \x07\x07 world\r\n");
        assert_eq!(tokens, vec!["echo", "hello", "world"]);
    }

    #[test]
    fn blank_lines_have_no_tokens() {
        assert!(split_into_tokens("").is_empty());
        assert!(split_into_tokens("   ").is_empty());
        assert!(split_into_tokens("\n").is_empty());
        assert!(split_into_tokens("\t\r\n\x07 ").is_empty());
    }

    #[test]
    fn quotes_are_ordinary_characters() {
        let tokens = split_into_tokens("echo \"a b\" 'c'");
        assert_eq!(tokens, vec!["echo", "\"a", "b\"", "'c'"]);
    }

    #[test]
    fn redirection_marker_must_stand_alone() {
        assert_eq!(split_into_tokens("ls > out"), vec!["ls", ">", "out"]);
        assert_eq!(split_into_tokens("ls >out"), vec!["ls", ">out"]);
    }

    #[test]
    fn long_lines_keep_every_token() {
        let words: Vec<String> = (0..1000).map(|i| format!("w{i}")).collect();
        let line = words.join(" \t ");
        let tokens = split_into_tokens(&line);
        assert_eq!(tokens.len(), 1000);
        for (token, word) in tokens.iter().zip(&words) {
            assert_eq!(token, word);
        }
    }

    #[test]
    fn tokens_borrow_from_the_line() {
        let line = String::from("cd /tmp");
        let tokens = split_into_tokens(&line);
        let start = line.as_ptr() as usize;
        let end = start + line.len();
        for token in tokens {
            let ptr = token.as_ptr() as usize;
            assert!(ptr >= start && ptr < end);
        }
    }
}
