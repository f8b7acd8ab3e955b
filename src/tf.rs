use crate::constants::{COMMENT_FLAG, RECURSIVE_FLAG, XML_FORMAT_FLAG};
use crate::debug;
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use wait_timeout::ChildExt;

/// a failed backend invocation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code: {code})")]
pub struct BackendError {
    pub code: String,
    pub message: String,
}

impl BackendError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// runs a version control command and returns its standard output
pub trait Backend: Send + Sync {
    fn run(&self, args: &[String]) -> Result<String, BackendError>;
}

pub fn status_args(root: &str) -> Vec<String> {
    vec![
        "status".to_string(),
        root.to_string(),
        RECURSIVE_FLAG.to_string(),
        XML_FORMAT_FLAG.to_string(),
    ]
}

pub fn checkout_args(path: &str) -> Vec<String> {
    vec!["checkout".to_string(), path.to_string()]
}

pub fn checkin_args(paths: &[String], comment: Option<&str>) -> Vec<String> {
    let mut args = vec!["checkin".to_string(), RECURSIVE_FLAG.to_string()];
    if let Some(comment) = comment {
        args.push(format!("{COMMENT_FLAG}{comment}"));
    }
    args.extend_from_slice(paths);
    args
}

pub fn undo_args(paths: &[String]) -> Vec<String> {
    let mut args = vec!["undo".to_string(), RECURSIVE_FLAG.to_string()];
    args.extend_from_slice(paths);
    args
}

pub fn workfold_args(root: &str) -> Vec<String> {
    vec!["workfold".to_string(), root.to_string()]
}

/// the `tf` command line client
pub struct TfCommand {
    program: String,
    prefix: Vec<String>,
    timeout: Duration,
}

impl TfCommand {
    pub fn new(program: impl Into<String>, prefix: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            prefix,
            timeout,
        }
    }
}

impl Backend for TfCommand {
    fn run(&self, args: &[String]) -> Result<String, BackendError> {
        debug!("running {} {}", self.program, display_args(&self.prefix, args));

        let mut child = Command::new(&self.program)
            .args(&self.prefix)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BackendError::new(
                    format!("{:?}", e.kind()),
                    format!("failed to run {}: {e}", self.program),
                )
            })?;

        // drain both pipes while waiting, a large status report fills the pipe buffer
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::new(
                    "timeout",
                    format!(
                        "{} did not finish within {} seconds",
                        self.program,
                        self.timeout.as_secs()
                    ),
                ));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(BackendError::new(
                    format!("{:?}", e.kind()),
                    format!("failed to wait for {}: {e}", self.program),
                ));
            }
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        if status.success() {
            return Ok(stdout);
        }

        let code = status
            .code()
            .map_or_else(|| "signal".to_string(), |code| code.to_string());
        let message = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        debug!("{} failed with code {}", self.program, code);
        Err(BackendError::new(code, message))
    }
}

fn drain(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut data = Vec::new();
        if let Err(e) = pipe.read_to_end(&mut data) {
            debug!("failed to read tf output: {}", e);
        }
        data
    })
}

fn collect(reader: Option<thread::JoinHandle<Vec<u8>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .map(|data| String::from_utf8_lossy(&data).into_owned())
        .unwrap_or_default()
}

fn display_args(prefix: &[String], args: &[String]) -> String {
    prefix
        .iter()
        .chain(args)
        .map(|arg| shlex::try_quote(arg).map_or_else(|_| arg.clone(), |quoted| quoted.into_owned()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests;
