//! Interactive prompt for the servotune command session
//!
//! This crate wraps a [`Session`] in a line editor. Each line typed at the
//! prompt is handed to the session as one batch, so several commands can
//! be chained with `;` just like on the command line.
//!
//! # Features
//!
//! - Prompt showing the selected servo
//! - Command history persisted across runs, with arrow key navigation
//! - Tab completion for verbs
//! - Highlighting of verbs and numeric arguments
//!
//! # Example Session
//!
//! ```text
//! >> list
//! Found 1 servos
//! Servo 1 - Model: 777
//! >> select 1
//! Selected servo: 1
//! (Servo 1) >> readreg 9
//! Register 9 = 0
//! ```

mod error;
pub mod highlight;

pub use error::ReplError;

use crate::highlight::ReplHelper;
use colored::Colorize;
use directories::ProjectDirs;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::Editor;
use servotune_core::bus::DeviceBus;
use servotune_core::session::{Selection, Session};
use servotune_core::template::TemplateDatabase;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Get the history file path
fn get_history_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "servotune") {
        let mut path = proj_dirs.data_dir().to_path_buf();
        std::fs::create_dir_all(&path).ok();
        path.push("repl_history");
        path
    } else {
        PathBuf::from(".servotune_history")
    }
}

/// Prompt text for a selection, without colors
pub fn prompt_text(selection: Selection) -> String {
    match selection {
        Selection::None => ">> ".to_string(),
        Selection::Servo(id) => format!("(Servo {}) >> ", id),
    }
}

fn prompt(selection: Selection) -> String {
    match selection {
        Selection::None => format!("{} ", ">>".bright_green().bold()),
        Selection::Servo(id) => format!(
            "{} {} ",
            format!("(Servo {})", id).bright_cyan(),
            ">>".bright_green().bold()
        ),
    }
}

/// Run the interactive prompt until `exit`/`quit` or end of input
///
/// The selection starts out empty. Ctrl-C discards the current line,
/// Ctrl-D ends the session.
pub fn run_repl(
    bus: &mut dyn DeviceBus,
    templates: &TemplateDatabase,
) -> Result<(), ReplError> {
    let mut rl = Editor::<ReplHelper, FileHistory>::new()?;
    rl.set_helper(Some(ReplHelper::new()));
    rl.set_auto_add_history(false);

    // Load history
    let history_path = get_history_path();
    if rl.load_history(&history_path).is_err() {
        log::debug!("No history at {}", history_path.display());
    }

    println!(
        "Type {} for available commands, {} or {} to leave.",
        "help".bright_cyan(),
        "exit".bright_cyan(),
        "quit".bright_cyan()
    );
    println!();

    let mut session = Session::new(bus, templates, std::io::stdout());
    let mut selection = Selection::None;

    loop {
        match rl.readline(&prompt(selection)) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                // Add to history
                let _ = rl.add_history_entry(line.as_str());

                let outcome = session.handle_line(&line, selection)?;
                selection = outcome.selection;
                std::io::stdout().flush()?;

                if outcome.exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                // Still save what we have before giving up
                save_history(&mut rl, &history_path);
                return Err(err.into());
            }
        }
    }

    save_history(&mut rl, &history_path);
    Ok(())
}

fn save_history(rl: &mut Editor<ReplHelper, FileHistory>, path: &Path) {
    if let Err(e) = rl.save_history(path) {
        eprintln!(
            "{}: Failed to save history: {}",
            "Warning".bright_yellow(),
            e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_reflects_selection() {
        assert_eq!(prompt_text(Selection::None), ">> ");
        assert_eq!(prompt_text(Selection::Servo(12)), "(Servo 12) >> ");
    }

    #[test]
    fn test_colored_prompt_has_same_text() {
        colored::control::set_override(false);
        assert_eq!(prompt(Selection::Servo(3)), prompt_text(Selection::Servo(3)));
        assert_eq!(prompt(Selection::None), prompt_text(Selection::None));
    }
}
