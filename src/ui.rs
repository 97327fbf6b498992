use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// write one colored line to stdout or stderr
#[doc(hidden)]
#[macro_export]
macro_rules! colored_line {
    ($stream:ident, $color:ident, $($arg:tt)*) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::$stream(), "{}", format!($($arg)*).$color());
    }};
}

#[macro_export]
macro_rules! warning {
    ($($arg:tt)*) => {
        $crate::colored_line!(stderr, yellow, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::colored_line!(stderr, red, $($arg)*)
    };
}

#[macro_export]
macro_rules! status {
    ($($arg:tt)*) => {
        $crate::colored_line!(stdout, green, $($arg)*)
    };
}

/// dimmed trace output on stderr, only shown with --verbose
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        if $crate::ui::verbose() {
            $crate::colored_line!(stderr, dimmed, $($arg)*)
        }
    };
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    // format string literal (with or without inline formatting or args)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// build the prompt label for an option, eg. "[o]pen diff"
fn option_label(option: &str) -> String {
    let mut chars = option.chars();
    match chars.next() {
        Some(first) => format!("[{first}]{}", chars.as_str()),
        None => String::new(),
    }
}

/// shortcut key for an option: its first character, lowercased
fn option_key(option: &str) -> Option<char> {
    option.chars().next()?.to_lowercase().next()
}

/// single key prompt, returns the chosen option's key
///
/// enter picks the first option, the arrow keys pick `u`/`d` when offered,
/// esc and ctrl-c exit
pub fn prompt(options: &[&str]) -> Result<char> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode},
    };
    use std::io::{self, Write};

    debug_assert!(!options.is_empty(), "prompt requires at least one option");

    let keys: Vec<char> = options.iter().filter_map(|opt| option_key(opt)).collect();
    debug_assert_eq!(keys.len(), options.len(), "prompt options cannot be empty");

    let labels: Vec<String> = options.iter().map(|opt| option_label(opt)).collect();
    print!("{} ? ", labels.join("/"));
    let _ = io::stdout().flush();

    // enable raw mode for single-character input
    enable_raw_mode().context("this command requires an interactive terminal")?;

    let choice = loop {
        let Ok(Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        })) = event::read()
        else {
            continue;
        };

        let pressed = match code {
            KeyCode::Esc => None,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => None,
            KeyCode::Enter => Some(keys[0]),
            KeyCode::Up => Some('u'),
            KeyCode::Down => Some('d'),
            KeyCode::Char(c) => c.to_lowercase().next(),
            _ => continue,
        };

        match pressed {
            None => break None,
            Some(key) => {
                if let Some(idx) = keys.iter().position(|&k| k == key) {
                    break Some(idx);
                }
            }
        }
    };

    disable_raw_mode().ok();

    match choice {
        Some(idx) => {
            info!(options[idx]);
            Ok(keys[idx])
        }
        None => {
            info!("^C");
            std::process::exit(1);
        }
    }
}

/// read one line of input, returns None when the user aborts with ctrl-c/ctrl-d
pub fn read_line(prompt: &str) -> Result<Option<String>> {
    use rustyline::DefaultEditor;
    use rustyline::error::ReadlineError;

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;

    match editor.readline(prompt) {
        Ok(line) => Ok(Some(line.trim().to_string())),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            info!("^C");
            Ok(None)
        }
        Err(e) => Err(e).context("failed to read input"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label("YES"), "[Y]ES");
        assert_eq!(option_label("open diff"), "[o]pen diff");
        assert_eq!(option_label(""), "");
    }

    #[test]
    fn test_option_keys_are_lowercase() {
        assert_eq!(option_key("YES"), Some('y'));
        assert_eq!(option_key("down"), Some('d'));
        assert_eq!(option_key(""), None);
    }
}
