mod cli;
mod config;
mod constants;
mod coordinator;
mod decoration;
mod host;
mod ledger;
mod scm;
mod session;
mod status;
mod target;
mod tf;
mod ui;

#[cfg(test)]
mod testing;

use crate::cli::{Cli, Command};
use crate::config::Settings;
use crate::coordinator::Coordinator;
use crate::scm::{Outcome, WorkspaceRoot};
use crate::session::SettingsSource;
use crate::target::Target;
use crate::tf::TfCommand;
use crate::ui::TerminalHost;
use anyhow::Result;
use std::path::PathBuf;

fn main() {
    match run() {
        Ok(Outcome::Failed) => std::process::exit(1),
        Ok(_) => {}
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<Outcome> {
    let cli = Cli::parse_args();
    ui::set_verbose(cli.verbose);

    // activation: a single root, mapped in a tfvc workspace
    let root_path = cli.root.clone().unwrap_or_else(|| PathBuf::from("."));
    let root = WorkspaceRoot::resolve(&root_path)?;
    let source = SettingsSource {
        root: PathBuf::from(root.as_str()),
        explicit: cli.config.clone(),
    };
    let settings = Settings::load(&source.root, source.explicit.as_deref())?;

    let backend = TfCommand::new(
        settings.tf_path.clone(),
        settings.tf_args_prefix.clone(),
        settings.command_timeout(),
    );
    let multi_line_comments = matches!(cli.command, Command::Checkin { edit: true, .. });
    let host = TerminalHost::new(multi_line_comments);

    let mut coordinator = Coordinator::init(backend, host, root, settings)?;
    let outcome = execute(&mut coordinator, &source, cli.command);
    coordinator.teardown();
    outcome
}

fn execute(
    coordinator: &mut Coordinator<TfCommand, TerminalHost>,
    source: &SettingsSource,
    command: Command,
) -> Result<Outcome> {
    let scm = coordinator.scm();

    let outcome = match command {
        Command::Status { json } => {
            // the change list was loaded during activation
            if scm.last_refresh() == Outcome::Failed {
                return Ok(Outcome::Failed);
            }
            if json {
                ui::print_ledger_json(&scm.ledger())?;
            } else {
                ui::render_ledger(scm.root().as_str(), &scm.ledger());
            }
            Outcome::Completed
        }
        Command::Checkout { path, auto } => scm.checkout(&scm.root().join(&path), !auto),
        Command::Checkin {
            paths, comment, ..
        } => scm.check_in(
            &Target::from_paths(scm.root().join_all(&paths)),
            comment.as_deref(),
        ),
        Command::Undo { paths } => scm.undo(&Target::from_paths(scm.root().join_all(&paths))),
        Command::WillSave { path } => {
            let path = scm.root().join(&path);
            coordinator.on_will_save(&path).unwrap_or_else(|| {
                debug!("no auto checkout policy for saves, nothing to do");
                Outcome::Completed
            })
        }
        Command::Session => session::run(coordinator, source)?,
    };

    Ok(outcome)
}
