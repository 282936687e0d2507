//! Highlighting and completion for the command prompt
//!
//! Verbs are completed at the start of every `;`-separated command, and
//! `setpos` additionally completes `min`/`max`.

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use servotune_core::session::command::SEPARATOR;
use servotune_core::session::Verb;
use std::borrow::Cow;

/// Words accepted as verbs, including aliases
fn verb_words() -> impl Iterator<Item = &'static str> {
    Verb::ALL
        .iter()
        .map(|verb| verb.name())
        .chain(std::iter::once("quit"))
}

fn is_word_boundary(c: char) -> bool {
    c.is_whitespace() || c == SEPARATOR
}

/// Find the candidates for the word ending at `pos`
///
/// Returns the start of the word and the matching replacements.
pub fn complete_word(line: &str, pos: usize) -> (usize, Vec<String>) {
    let head = &line[..pos];
    let start = head
        .char_indices()
        .rev()
        .find(|&(_, c)| is_word_boundary(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    let prefix = &head[start..];

    // Words before the cursor within the current command
    let command_start = head[..start]
        .rfind(SEPARATOR)
        .map(|i| i + 1)
        .unwrap_or(0);
    let before: Vec<&str> = head[command_start..start].split_whitespace().collect();

    let mut candidates: Vec<String> = match before.as_slice() {
        [] => verb_words()
            .filter(|w| w.starts_with(prefix))
            .map(str::to_string)
            .collect(),
        ["setpos"] => ["min", "max"]
            .into_iter()
            .filter(|w| w.starts_with(prefix))
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    candidates.sort();

    (start, candidates)
}

/// Helper struct for rustyline that provides verb completion and
/// highlighting.
#[derive(Helper, Default)]
pub struct ReplHelper;

impl ReplHelper {
    /// Create a new ReplHelper
    pub fn new() -> Self {
        Self
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let (start, words) = complete_word(line, pos);
        let completions = words
            .into_iter()
            .map(|word| Pair {
                display: format!("{}", word.white()),
                replacement: word,
            })
            .collect();
        Ok((start, completions))
    }
}

impl Validator for ReplHelper {}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _context: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.trim().is_empty() {
            return Cow::Borrowed(line);
        }

        let mut highlighted = String::with_capacity(line.len() * 2);
        for (i, command) in line.split(SEPARATOR).enumerate() {
            if i > 0 {
                highlighted.push_str(&";".bright_black().to_string());
            }
            highlighted.push_str(&highlight_command(command));
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        !line.is_empty()
    }
}

/// Color one command: known verb blue, unknown verb red, numbers yellow
fn highlight_command(command: &str) -> String {
    let mut out = String::with_capacity(command.len() * 2);
    let mut first = true;
    let mut rest = command;

    while !rest.is_empty() {
        let space_len = rest.len() - rest.trim_start().len();
        out.push_str(&rest[..space_len]);
        rest = &rest[space_len..];
        if rest.is_empty() {
            break;
        }

        let word_len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let word = &rest[..word_len];
        let painted = if first {
            if Verb::from_word(word).is_some() {
                word.bright_blue().bold()
            } else {
                word.bright_red()
            }
        } else if is_number(word) {
            word.bright_yellow()
        } else {
            word.normal()
        };
        out.push_str(&painted.to_string());

        first = false;
        rest = &rest[word_len..];
    }

    out
}

fn is_number(word: &str) -> bool {
    match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_verb_prefix() {
        let (start, words) = complete_word("lo", 2);
        assert_eq!(start, 0);
        assert_eq!(words, vec!["loadtemplate", "lockeeprom"]);
    }

    #[test]
    fn test_complete_after_separator() {
        let line = "select 3; read";
        let (start, words) = complete_word(line, line.len());
        assert_eq!(start, 10);
        assert_eq!(words, vec!["readreg"]);
    }

    #[test]
    fn test_complete_setpos_argument() {
        let line = "setpos m";
        let (start, words) = complete_word(line, line.len());
        assert_eq!(start, 7);
        assert_eq!(words, vec!["max", "min"]);
    }

    #[test]
    fn test_no_completion_for_numbers() {
        let line = "writereg 9 ";
        let (_, words) = complete_word(line, line.len());
        assert!(words.is_empty());
    }

    #[test]
    fn test_quit_alias_completes() {
        let (_, words) = complete_word("q", 1);
        assert_eq!(words, vec!["quit"]);
    }

    #[test]
    fn test_is_number() {
        assert!(is_number("42"));
        assert!(is_number("0x2A"));
        assert!(!is_number("0x"));
        assert!(!is_number("min"));
    }

    #[test]
    fn test_highlight_keeps_text() {
        colored::control::set_override(false);
        let line = "select 3;  readreg 0x09 ";
        assert_eq!(ReplHelper::new().highlight(line, 0), line);
    }
}
