use crate::constants::SPINNER_TICK_MILLIS;
use crate::decoration::decoration_for;
use crate::host::{Host, Progress, ProgressLocation};
use crate::ledger::Ledger;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! warning {
    // format string literal (with or without inline formatting)
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).yellow());
    }};
    // arbitrary expression (non-literal)
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).yellow());
    }};
}

#[macro_export]
macro_rules! error {
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).red());
    }};
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).red());
    }};
}

/// print an error and exit; for states that can only come from a bug
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {{
        $crate::error!($($arg)*);
        std::process::exit(1)
    }};
}

#[macro_export]
macro_rules! status {
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!($fmt $(, $($arg)*)?).green());
    }};
    ($expr:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", format!("{}", $expr).green());
    }};
}

#[macro_export]
macro_rules! info {
    () => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout());
    }};
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), $fmt $(, $($arg)*)?);
    }};
    ($expr:expr) => {{
        use std::io::{self, Write};
        let _ = writeln!(io::stdout(), "{}", $expr);
    }};
}

/// diagnostic output, only shown with --verbose
#[macro_export]
macro_rules! debug {
    ($fmt:literal $(, $($arg:tt)*)?) => {{
        if $crate::ui::is_verbose() {
            use colored::Colorize;
            use std::io::{self, Write};
            let _ = writeln!(io::stderr(), "{}", format!($fmt $(, $($arg)*)?).dimmed());
        }
    }};
    ($expr:expr) => {{
        if $crate::ui::is_verbose() {
            use colored::Colorize;
            use std::io::{self, Write};
            let _ = writeln!(io::stderr(), "{}", format!("{}", $expr).dimmed());
        }
    }};
}

/// single-key prompt, returns the lowercased first letter of the chosen option
///
/// enter picks the first option; esc and ctrl-c return `None`
pub fn prompt(options: &[&str]) -> Result<Option<char>> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        terminal::{disable_raw_mode, enable_raw_mode},
    };
    use std::io::{self, Write};

    debug_assert!(!options.is_empty(), "prompt requires at least one option");
    debug_assert!(
        options.iter().all(|opt| !opt.is_empty()),
        "prompt options cannot be empty strings"
    );

    // "[n]o/[y]es"
    let prompt_parts: Vec<String> = options
        .iter()
        .map(|opt| {
            let mut chars = opt.chars();
            let first = chars.next().unwrap_or(' ');
            format!("[{first}]{}", chars.as_str())
        })
        .collect();

    let valid_chars: Vec<char> = options
        .iter()
        .filter_map(|opt| opt.chars().next())
        .flat_map(char::to_lowercase)
        .collect();

    print!("{} ? ", prompt_parts.join("/"));
    let _ = io::stdout().flush();

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

        match code {
            KeyCode::Esc => break None,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break None,
            KeyCode::Enter => break Some(0),
            KeyCode::Char(c) => {
                let lower = c.to_lowercase().next().unwrap_or(c);
                if let Some(idx) = valid_chars.iter().position(|&ch| ch == lower) {
                    break Some(idx);
                }
            }
            _ => {}
        }
    };

    disable_raw_mode().ok();
    match choice {
        Some(idx) => {
            info!(options[idx]);
            Ok(Some(valid_chars[idx]))
        }
        None => {
            info!("^C");
            Ok(None)
        }
    }
}

/// edit a single line in place, `None` if the user cancelled
pub fn edit_one_line(line: &str) -> Result<Option<String>> {
    use rustyline::DefaultEditor;

    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;

    match editor.readline_with_initial("? ", (line, "")) {
        Ok(edited) => Ok(Some(edited.trim().to_string())),
        Err(_) => {
            info!("^C");
            Ok(None)
        }
    }
}

/// edit text in $EDITOR, `None` if the editor failed or the result is empty
pub fn edit_multi_line(text: &str) -> Result<Option<String>> {
    use std::env;
    use std::fs;
    use std::io::Write;
    use std::process::Command;
    use tempfile::Builder;

    let editor = env::var("EDITOR").context("EDITOR not set")?;

    let mut temp_file = Builder::new()
        .prefix("checkin-comment-")
        .suffix(".txt")
        .tempfile()
        .context("failed to create temporary file")?;
    temp_file
        .write_all(text.as_bytes())
        .context("failed to write to temporary file")?;
    temp_file
        .flush()
        .context("failed to flush temporary file")?;
    let temp_path = temp_file.path().to_owned();

    // run via the shell so arguments inside EDITOR work
    let quoted_path = shlex::try_quote(&temp_path.to_string_lossy())
        .context("cannot quote temporary file path")?
        .into_owned();
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{editor} {quoted_path}"))
        .status()
        .with_context(|| format!("failed to run editor: {editor}"))?;

    if !status.success() {
        return Ok(None);
    }

    let edited = fs::read_to_string(&temp_path)
        .context("failed to read back temporary file")?
        .trim()
        .to_string();

    Ok(Some(edited).filter(|text| !text.is_empty()))
}

/// notifications, prompts and spinners on the controlling terminal
pub struct TerminalHost {
    multi_line_comments: bool,
}

impl TerminalHost {
    pub fn new(multi_line_comments: bool) -> Self {
        Self {
            multi_line_comments,
        }
    }
}

impl Host for TerminalHost {
    fn info(&self, message: &str) {
        status!(message);
    }

    fn warning(&self, message: &str) {
        warning!(message);
    }

    fn error(&self, message: &str) {
        error!(message);
    }

    fn log(&self, message: &str) {
        debug!(message);
    }

    fn confirm(&self, message: &str) -> bool {
        if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
            warning!("{} (not confirmed, no interactive terminal)", message);
            return false;
        }

        warning!(message);
        match prompt(&["no", "yes"]) {
            Ok(choice) => choice == Some('y'),
            Err(e) => {
                error!("{:#}", e);
                false
            }
        }
    }

    fn request_comment(&self, description: &str) -> Option<String> {
        let result = if self.multi_line_comments {
            edit_multi_line("")
        } else {
            status!("check-in comment for {}:", description);
            edit_one_line("")
        };

        result.unwrap_or_else(|e| {
            error!("{:#}", e);
            None
        })
    }

    fn begin_progress(&self, location: ProgressLocation, title: &str) -> Box<dyn Progress + '_> {
        Box::new(Spinner::start(location, title))
    }
}

struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    fn start(location: ProgressLocation, title: &str) -> Self {
        let template = match location {
            ProgressLocation::SourceControl => "{spinner:.dim} {msg:.dim}",
            ProgressLocation::Notification => "{spinner} {msg}",
        };

        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template(template)
                .expect("invalid spinner template"),
        );
        bar.set_message(title.to_string());
        bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MILLIS));
        debug!(title);

        Self { bar }
    }
}

impl Progress for Spinner {
    fn report(&self, message: &str) {
        debug!(message);
        self.bar.set_message(message.to_string());
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

/// print the change list, paths relative to the workspace root
pub fn render_ledger(root: &str, ledger: &Ledger) {
    use colored::Colorize;

    if ledger.is_empty() {
        status!("no pending changes");
        return;
    }

    status!(
        "{} pending {}:",
        ledger.len(),
        if ledger.len() == 1 { "change" } else { "changes" }
    );

    for change in ledger.changes() {
        let decoration = decoration_for(&change.change_kind);
        let path = Path::new(&change.local_path)
            .strip_prefix(root)
            .map_or_else(|_| change.local_path.clone(), |p| p.display().to_string());

        let letter = decoration.letter.to_string();
        let letter = match decoration.color {
            Some(color) => letter.as_str().color(color),
            None => letter.as_str().normal(),
        };
        let path = if decoration.strike_through {
            path.as_str().strikethrough()
        } else {
            path.as_str().normal()
        };

        info!("{} {}", letter, path);
    }
}

#[derive(Serialize)]
struct RenderedChange<'a> {
    local_path: &'a str,
    change_kind: &'a str,
    letter: char,
    tooltip: &'a str,
}

/// print the change list as json for scripts and editor integrations
pub fn print_ledger_json(ledger: &Ledger) -> Result<()> {
    let rendered: Vec<RenderedChange> = ledger
        .changes()
        .iter()
        .map(|change| {
            let decoration = decoration_for(&change.change_kind);
            RenderedChange {
                local_path: &change.local_path,
                change_kind: &change.change_kind,
                letter: decoration.letter,
                tooltip: decoration.tooltip,
            }
        })
        .collect();

    let json = serde_json::to_string_pretty(&rendered).context("failed to serialise changes")?;
    info!(json);
    Ok(())
}
