//! Directive parsing
//!
//! A directive is a generated line of the form `![namespace::]command arg...`.
//! The marker is stripped by the stream parser; this module turns the rest of
//! the line into an argument vector using shell-style quoting:
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `'text'` | literal, no escapes |
//! | `"text"` | `\` escapes only `"`, `\`, `$`, `` ` `` and newline |
//! | `\c` | literal `c` outside quotes; `\<newline>` is removed |
//! | blanks | separate words; adjacent quoted/unquoted parts join |

use thiserror::Error;

use super::error::DispatchError;

/// Character that opens a directive line.
pub const DIRECTIVE_MARKER: char = '!';

/// Separator between a tool namespace and a command name.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Shell-style tokenization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    #[error("Text was empty (or contained only whitespace)")]
    Empty,

    #[error("Text ended before matching quote was found for {0}.")]
    UnterminatedQuote(char),

    #[error("Text ended just after a '\\' character.")]
    TrailingBackslash,
}

/// Split `text` into words using shell-style quoting rules.
pub fn split_argv(text: &str) -> Result<Vec<String>, QuoteError> {
    let mut words = Vec::new();
    let mut current = String::new();
    // Distinguishes "no word yet" from a quoted empty word like `''`.
    let mut in_word = false;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(QuoteError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some('\n') => {}
                            Some(c @ ('"' | '\\' | '$' | '`')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(QuoteError::UnterminatedQuote('"')),
                        },
                        Some(c) => current.push(c),
                        None => return Err(QuoteError::UnterminatedQuote('"')),
                    }
                }
            }
            '\\' => match chars.next() {
                Some('\n') => {}
                Some(c) => {
                    in_word = true;
                    current.push(c);
                }
                None => return Err(QuoteError::TrailingBackslash),
            },
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    if words.is_empty() {
        return Err(QuoteError::Empty);
    }
    Ok(words)
}

/// A tokenized directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// The command text as generated, marker and line terminator removed.
    pub text: String,
    /// Tokens; `argv[0]` may carry a `namespace::` prefix.
    pub argv: Vec<String>,
}

impl Directive {
    /// Tokenize the text following a directive marker.
    pub fn parse(text: &str) -> Result<Self, DispatchError> {
        let text = text.trim_end_matches(['\n', '\r']);
        let argv = split_argv(text).map_err(|e| DispatchError::ParseFailure {
            command: text.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            text: text.to_string(),
            argv,
        })
    }

    fn head(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    /// Tool namespace, if `argv[0]` is written as `namespace::command`.
    pub fn namespace(&self) -> Option<&str> {
        self.head()
            .split_once(NAMESPACE_SEPARATOR)
            .map(|(namespace, _)| namespace)
    }

    /// Command name with any namespace removed.
    pub fn command(&self) -> &str {
        let head = self.head();
        head.split_once(NAMESPACE_SEPARATOR)
            .map(|(_, command)| command)
            .unwrap_or(head)
    }

    /// Argument vector handed to the tool: `argv[0]` is the bare command.
    pub fn tool_argv(&self) -> Vec<String> {
        let mut argv = self.argv.clone();
        if let Some(first) = argv.first_mut() {
            *first = self.command().to_string();
        }
        argv
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(text: &str) -> Vec<String> {
        split_argv(text).unwrap()
    }

    #[test]
    fn splits_on_blanks() {
        assert_eq!(words("add 1  2"), vec!["add", "1", "2"]);
        assert_eq!(words("  \tls\t-l "), vec!["ls", "-l"]);
    }

    #[test]
    fn quotes_group_words() {
        assert_eq!(words("echo 'a b' \"c d\""), vec!["echo", "a b", "c d"]);
        assert_eq!(words("echo a'b'\"c\""), vec!["echo", "abc"]);
        assert_eq!(words("echo ''"), vec!["echo", ""]);
    }

    #[test]
    fn escapes() {
        assert_eq!(words(r"echo a\ b"), vec!["echo", "a b"]);
        assert_eq!(words(r#"echo "say \"hi\"""#), vec!["echo", "say \"hi\""]);
        assert_eq!(words(r#"echo "a\nb""#), vec!["echo", "a\\nb"]);
        assert_eq!(words(r"echo 'a\b'"), vec!["echo", "a\\b"]);
    }

    #[test]
    fn quoting_failures() {
        assert_eq!(split_argv(""), Err(QuoteError::Empty));
        assert_eq!(split_argv("   "), Err(QuoteError::Empty));
        assert_eq!(
            split_argv("echo 'open"),
            Err(QuoteError::UnterminatedQuote('\''))
        );
        assert_eq!(
            split_argv("echo \"open"),
            Err(QuoteError::UnterminatedQuote('"'))
        );
        assert_eq!(split_argv("echo \\"), Err(QuoteError::TrailingBackslash));
    }

    #[test]
    fn directive_namespace() {
        let d = Directive::parse("calc::add 1 2\n").unwrap();
        assert_eq!(d.text, "calc::add 1 2");
        assert_eq!(d.namespace(), Some("calc"));
        assert_eq!(d.command(), "add");
        assert_eq!(d.tool_argv(), vec!["add", "1", "2"]);

        let d = Directive::parse("add 1 2").unwrap();
        assert_eq!(d.namespace(), None);
        assert_eq!(d.command(), "add");
        assert_eq!(d.tool_argv(), d.argv);
    }

    #[test]
    fn directive_parse_failure_keeps_text() {
        let err = Directive::parse("say 'oops\r\n").unwrap_err();
        assert_eq!(
            err,
            DispatchError::ParseFailure {
                command: "say 'oops".into(),
                reason: "Text ended before matching quote was found for '.".into(),
            }
        );
    }
}
