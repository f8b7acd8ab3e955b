use crate::config::CommentPolicy;
use crate::host::{Host, ProgressLocation};
use crate::ledger::Ledger;
use crate::status::parse_status;
use crate::target::Target;
use crate::tf::{self, Backend, BackendError};
use anyhow::{Context, Result, bail};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};

const REFRESHING: &str = "refreshing the source control...";

/// result of a workflow; failures have already been shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Skipped(Skip),
    Failed,
}

/// why a workflow stopped before calling the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    OutsideWorkspace,
    AlreadyCheckedOut,
    Declined,
    NoComment,
    NothingSelected,
}

/// the single absolute root of the managed workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot(String);

impl WorkspaceRoot {
    pub fn resolve(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path)
            .with_context(|| format!("failed to resolve workspace root {}", path.display()))?;
        let root = normalize(&absolute);
        if !Path::new(&root).is_dir() {
            bail!("workspace root {} is not a directory", root);
        }
        Ok(Self(root))
    }

    /// absolute form of a path given by the user, relative paths start at the root
    pub fn join(&self, path: impl AsRef<Path>) -> String {
        normalize(&Path::new(&self.0).join(path))
    }

    pub fn join_all<P: AsRef<Path>>(&self, paths: &[P]) -> Vec<String> {
        paths.iter().map(|path| self.join(path)).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// case-insensitive prefix check that stops at a path separator
    pub fn contains(&self, path: &str) -> bool {
        let root = self.0.to_lowercase();
        let root = root.trim_end_matches(['/', '\\']);
        let path = normalize(Path::new(path)).to_lowercase();
        match path.strip_prefix(root) {
            Some(rest) => rest.is_empty() || rest.starts_with(['/', '\\']),
            None => false,
        }
    }
}

/// drop `.` and resolve `..` lexically, files about to be saved may not exist yet
fn normalize(path: &Path) -> String {
    let mut normal = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normal.components().next_back() {
                Some(Component::Normal(_)) => {
                    normal.pop();
                }
                // `..` at the root stays at the root
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normal.push(component),
            },
            _ => normal.push(component),
        }
    }
    normal.to_string_lossy().into_owned()
}

#[cfg(test)]
impl From<&str> for WorkspaceRoot {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

struct RefreshState {
    running: bool,
    requested: u64,
    completed: u64,
    last: Outcome,
}

/// single-slot queue: requests arriving during a run share one follow-up run
struct RefreshQueue {
    state: Mutex<RefreshState>,
    done: Condvar,
}

impl RefreshQueue {
    fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState {
                running: false,
                requested: 0,
                completed: 0,
                last: Outcome::Completed,
            }),
            done: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// pending change model plus the workflows that change backend state
pub struct Scm<B, H> {
    backend: B,
    host: H,
    root: WorkspaceRoot,
    comment_policy: CommentPolicy,
    ledger: RwLock<Arc<Ledger>>,
    refresh_queue: RefreshQueue,
}

impl<B: Backend, H: Host> Scm<B, H> {
    pub fn new(backend: B, host: H, root: WorkspaceRoot, comment_policy: CommentPolicy) -> Self {
        Self {
            backend,
            host,
            root,
            comment_policy,
            ledger: RwLock::new(Arc::new(Ledger::default())),
            refresh_queue: RefreshQueue::new(),
        }
    }

    pub fn set_comment_policy(&mut self, comment_policy: CommentPolicy) {
        self.comment_policy = comment_policy;
    }

    pub fn root(&self) -> &WorkspaceRoot {
        &self.root
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// snapshot of the ledger from the most recent successful refresh
    pub fn ledger(&self) -> Arc<Ledger> {
        Arc::clone(&self.ledger.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// outcome of the most recently finished refresh
    pub fn last_refresh(&self) -> Outcome {
        self.refresh_queue.lock().last
    }

    pub fn is_checked_out(&self, path: &str) -> bool {
        self.ledger().contains(&normalize(Path::new(path)))
    }

    /// rebuild the ledger from the backend's status report
    ///
    /// a call made while another refresh is running waits for one follow-up
    /// run that starts after the current one and returns its outcome
    pub fn refresh(&self) -> Outcome {
        let ticket = {
            let mut state = self.refresh_queue.lock();
            state.requested += 1;
            let ticket = state.requested;
            if state.running {
                self.host.log("refresh already running, queued another one");
                while state.completed < ticket {
                    state = self
                        .refresh_queue
                        .done
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                return state.last;
            }
            state.running = true;
            ticket
        };

        let mut target = ticket;
        loop {
            let outcome = self.refresh_once();

            let mut state = self.refresh_queue.lock();
            state.completed = target;
            state.last = outcome;
            self.refresh_queue.done.notify_all();
            if state.requested == target {
                state.running = false;
                return outcome;
            }
            target = state.requested;
        }
    }

    fn refresh_once(&self) -> Outcome {
        let progress = self
            .host
            .begin_progress(ProgressLocation::SourceControl, REFRESHING);

        let result = self
            .backend
            .run(&tf::status_args(self.root.as_str()))
            .and_then(|output| {
                parse_status(&output).map_err(|e| BackendError::new("xml", format!("{e:#}")))
            });

        match result {
            Ok(changes) => {
                let ledger = Arc::new(Ledger::from_changes(changes));
                self.host
                    .log(&format!("{} pending change(s) found", ledger.len()));
                *self.ledger.write().unwrap_or_else(PoisonError::into_inner) = ledger;
                progress.report("source control refreshed");
                Outcome::Completed
            }
            Err(e) => {
                drop(progress);
                self.host
                    .error(&failure_message("cannot check the source control", &e));
                Outcome::Failed
            }
        }
    }

    /// check out a single file for editing
    ///
    /// `is_manual` is false when triggered by the auto-checkout policy, in
    /// which case guard violations are only logged
    pub fn checkout(&self, path: &str, is_manual: bool) -> Outcome {
        let path = normalize(Path::new(path));
        let path = path.as_str();
        if !self.root.contains(path) {
            if is_manual {
                self.host.warning("file is outside of the workspace");
            } else {
                self.host
                    .log(&format!("auto checkout skipped, {path} is outside of the workspace"));
            }
            return Outcome::Skipped(Skip::OutsideWorkspace);
        }

        if self.is_checked_out(path) {
            if is_manual {
                self.host.warning("file is already checked out");
            } else {
                self.host
                    .log(&format!("auto checkout skipped, {path} is already checked out"));
            }
            return Outcome::Skipped(Skip::AlreadyCheckedOut);
        }

        self.run_action(
            &format!("checking out \"{path}\"..."),
            &tf::checkout_args(path),
            "checkout failed",
            "file has been checked out successfully",
        )
    }

    /// submit pending changes after confirmation and a check-in comment
    pub fn check_in(&self, target: &Target, comment: Option<&str>) -> Outcome {
        if target.is_empty() {
            self.host.log("check-in skipped, nothing selected");
            return Outcome::Skipped(Skip::NothingSelected);
        }

        let description = target.description();
        if !self.confirm(&format!("check in {description}")) {
            return Outcome::Skipped(Skip::Declined);
        }

        let supplied = comment.map(str::trim).filter(|c| !c.is_empty());
        let comment = match (supplied, self.comment_policy) {
            (Some(comment), _) => Some(comment.to_string()),
            (None, CommentPolicy::Optional) => None,
            (None, CommentPolicy::Prompt) => {
                let requested = self
                    .host
                    .request_comment(&description)
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty());
                if requested.is_none() {
                    self.host.warning("check-in aborted: no comment provided");
                    return Outcome::Skipped(Skip::NoComment);
                }
                requested
            }
        };

        let paths = target.paths(self.root.as_str());
        self.run_action(
            &format!("checking in {description}..."),
            &tf::checkin_args(&paths, comment.as_deref()),
            "check-in failed",
            "check-in completed successfully",
        )
    }

    /// discard pending changes; always asks first
    pub fn undo(&self, target: &Target) -> Outcome {
        if target.is_empty() {
            self.host.log("undo skipped, nothing selected");
            return Outcome::Skipped(Skip::NothingSelected);
        }

        let description = target.description();
        if !self.confirm(&format!("undo {description}")) {
            return Outcome::Skipped(Skip::Declined);
        }

        let paths = target.paths(self.root.as_str());
        self.run_action(
            &format!("undoing {description}..."),
            &tf::undo_args(&paths),
            "undo failed",
            "undo completed successfully",
        )
    }

    fn confirm(&self, action: &str) -> bool {
        let confirmed = self
            .host
            .confirm(&format!("You are going to {action}. Are you sure?"));
        if !confirmed {
            self.host.log(&format!("{action} declined"));
        }
        confirmed
    }

    /// run a state-changing command under progress, then refresh and notify
    fn run_action(&self, title: &str, args: &[String], failure: &str, success: &str) -> Outcome {
        let result = {
            let _progress = self
                .host
                .begin_progress(ProgressLocation::Notification, title);
            self.backend.run(args)
        };

        // the action's progress is finished before the refresh shows its own
        match result {
            Ok(_) => {
                self.refresh();
                self.host.info(success);
                Outcome::Completed
            }
            Err(e) => {
                self.host.error(&failure_message(failure, &e));
                Outcome::Failed
            }
        }
    }
}

fn failure_message(action: &str, error: &BackendError) -> String {
    format!(
        "error: {action} (code: {}; error: {})",
        error.code, error.message
    )
}
