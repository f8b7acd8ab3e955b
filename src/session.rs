use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::host::Host;
use crate::scm::Outcome;
use crate::target::Target;
use crate::tf::Backend;
use crate::{error, info, status, ui};
use anyhow::{Context, Result, bail};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

const HELP: &str = "\
status                   list pending changes
refresh                  reload pending changes from the server
checkout <path>          check out a file
checkin [-m <comment>] [<path>...]
                         check in files, or the whole workspace
undo [<path>...]         undo files, or the whole workspace
save <path>              a file is being saved (auto checkout, then refresh)
changed                  files were created, deleted or renamed
reload                   re-read settings
quit                     end the session";

#[derive(Debug, PartialEq, Eq)]
enum SessionCommand {
    Status,
    Refresh,
    Checkout(String),
    CheckIn {
        paths: Vec<String>,
        comment: Option<String>,
    },
    Undo(Vec<String>),
    Save(String),
    Changed,
    Reload,
    Help,
    Quit,
}

/// where settings are re-read from on `reload`
pub struct SettingsSource {
    pub root: PathBuf,
    pub explicit: Option<PathBuf>,
}

/// read commands until `quit` or end of input, acting like an editor that
/// keeps the change list between operations
pub fn run<B: Backend, H: Host>(
    coordinator: &mut Coordinator<B, H>,
    source: &SettingsSource,
) -> Result<Outcome> {
    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    status!("tfvc session on {}, type help for commands", coordinator.scm().root().as_str());

    let mut last = Outcome::Completed;
    loop {
        let line = match editor.readline("tfvc> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("failed to read command"),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line.as_str());

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(e) => {
                error!("{:#}", e);
                continue;
            }
        };

        match execute(coordinator, source, command) {
            Ok(Some(outcome)) => last = outcome,
            Ok(None) => break,
            Err(e) => error!("{:#}", e),
        }
    }

    Ok(last)
}

/// `None` ends the session
fn execute<B: Backend, H: Host>(
    coordinator: &mut Coordinator<B, H>,
    source: &SettingsSource,
    command: SessionCommand,
) -> Result<Option<Outcome>> {
    let scm = coordinator.scm();
    let outcome = match command {
        SessionCommand::Status => {
            ui::render_ledger(scm.root().as_str(), &scm.ledger());
            Outcome::Completed
        }
        SessionCommand::Refresh | SessionCommand::Changed => coordinator.on_files_changed(),
        SessionCommand::Checkout(path) => scm.checkout(&scm.root().join(&path), true),
        SessionCommand::CheckIn { paths, comment } => {
            let target = Target::from_paths(scm.root().join_all(&paths));
            scm.check_in(&target, comment.as_deref())
        }
        SessionCommand::Undo(paths) => scm.undo(&Target::from_paths(scm.root().join_all(&paths))),
        SessionCommand::Save(path) => {
            if let Some(Outcome::Failed) = coordinator.on_will_save(&scm.root().join(&path)) {
                return Ok(Some(Outcome::Failed));
            }
            coordinator.on_files_changed()
        }
        SessionCommand::Reload => {
            let settings = Settings::load(&source.root, source.explicit.as_deref())?;
            coordinator.apply_settings(settings);
            status!(
                "settings reloaded, auto checkout is {:?}",
                coordinator.settings().auto_checkout
            );
            Outcome::Completed
        }
        SessionCommand::Help => {
            info!(HELP);
            Outcome::Completed
        }
        SessionCommand::Quit => return Ok(None),
    };
    Ok(Some(outcome))
}

fn parse_line(line: &str) -> Result<SessionCommand> {
    let Some(words) = shlex::split(line) else {
        bail!("unbalanced quotes in command");
    };
    let Some((name, args)) = words.split_first() else {
        bail!("empty command");
    };

    let command = match (name.as_str(), args) {
        ("status" | "ls", []) => SessionCommand::Status,
        ("refresh", []) => SessionCommand::Refresh,
        ("checkout", [path]) => SessionCommand::Checkout(path.clone()),
        ("checkout", _) => bail!("usage: checkout <path>"),
        ("checkin", args) => parse_checkin(args)?,
        ("undo", paths) => SessionCommand::Undo(paths.to_vec()),
        ("save", [path]) => SessionCommand::Save(path.clone()),
        ("save", _) => bail!("usage: save <path>"),
        ("changed", []) => SessionCommand::Changed,
        ("reload", []) => SessionCommand::Reload,
        ("help" | "?", _) => SessionCommand::Help,
        ("quit" | "exit", []) => SessionCommand::Quit,
        (name, _) => bail!("unknown command: {name} (try help)"),
    };
    Ok(command)
}

fn parse_checkin(args: &[String]) -> Result<SessionCommand> {
    let mut paths = Vec::new();
    let mut comment = None;
    let mut args = args.iter();

    while let Some(arg) = args.next() {
        if arg == "-m" {
            let Some(text) = args.next() else {
                bail!("usage: checkin [-m <comment>] [<path>...]");
            };
            comment = Some(text.clone());
        } else {
            paths.push(arg.clone());
        }
    }

    Ok(SessionCommand::CheckIn { paths, comment })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_line("status").unwrap(), SessionCommand::Status);
        assert_eq!(parse_line("  refresh ").unwrap(), SessionCommand::Refresh);
        assert_eq!(parse_line("quit").unwrap(), SessionCommand::Quit);
        assert_eq!(parse_line("help checkin").unwrap(), SessionCommand::Help);
    }

    #[test]
    fn test_quoted_paths() {
        assert_eq!(
            parse_line(r#"checkout "/ws/My Documents/a.txt""#).unwrap(),
            SessionCommand::Checkout("/ws/My Documents/a.txt".to_string())
        );
        assert_eq!(
            parse_line("undo /ws/a.txt /ws/b.txt").unwrap(),
            SessionCommand::Undo(vec!["/ws/a.txt".to_string(), "/ws/b.txt".to_string()])
        );
    }

    #[test]
    fn test_checkin_comment() {
        assert_eq!(
            parse_line(r#"checkin -m "fix the build" /ws/a.txt"#).unwrap(),
            SessionCommand::CheckIn {
                paths: vec!["/ws/a.txt".to_string()],
                comment: Some("fix the build".to_string()),
            }
        );
        assert_eq!(
            parse_line("checkin").unwrap(),
            SessionCommand::CheckIn {
                paths: Vec::new(),
                comment: None,
            }
        );
        assert!(parse_line("checkin -m").is_err());
    }

    #[test]
    fn test_invalid_lines() {
        assert!(parse_line("checkout").is_err());
        assert!(parse_line("checkout a b").is_err());
        assert!(parse_line("status now").is_err());
        assert!(parse_line("merge").is_err());
        assert!(parse_line(r#"checkout "unterminated"#).is_err());
    }
}
