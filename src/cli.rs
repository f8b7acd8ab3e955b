use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tfvc-scm: keep a view of tfvc pending changes in sync and check files out, in and back
#[derive(Parser, Debug)]
#[command(name = "tfvc-scm", about, long_about = None, version)]
pub struct Cli {
    /// workspace root (defaults to the current directory), relative file paths start here
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// settings file to use instead of the workspace or user settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// print diagnostic output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// list pending changes
    Status {
        /// print json instead of the coloured list
        #[arg(long)]
        json: bool,
    },

    /// check out a file for editing
    Checkout {
        path: PathBuf,

        /// triggered by automation: guard violations are only logged
        #[arg(long)]
        auto: bool,
    },

    /// check in pending changes, the whole workspace when no paths are given
    Checkin {
        paths: Vec<PathBuf>,

        /// check-in comment
        #[arg(long, short = 'm')]
        comment: Option<String>,

        /// write the comment in $EDITOR when prompted
        #[arg(long, conflicts_with = "comment")]
        edit: bool,
    },

    /// discard pending changes, the whole workspace when no paths are given
    Undo { paths: Vec<PathBuf> },

    /// editor hook: a file is about to be saved
    WillSave { path: PathBuf },

    /// interactive session keeping the change list in memory
    Session,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
