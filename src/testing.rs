//! fakes for the backend and host used by unit tests

use crate::host::{Host, Progress, ProgressLocation};
use crate::tf::{Backend, BackendError};
use std::collections::VecDeque;
use std::sync::Mutex;

pub const TWO_CHANGES: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<Status>
  <PendingSet>
    <PendingChanges>
      <PendingChange local="/ws/a.txt" chg="edit" />
      <PendingChange local="/ws/b.txt" chg="add" />
    </PendingChanges>
  </PendingSet>
</Status>"#;

pub const EMPTY_STATUS: &str = r#"<?xml version="1.0" encoding="utf-8"?><Status />"#;

pub fn ok(output: &str) -> Result<String, BackendError> {
    Ok(output.to_string())
}

pub fn failure(code: &str, message: &str) -> Result<String, BackendError> {
    Err(BackendError::new(code, message))
}

/// backend that answers from a queue and records every call
///
/// once the queue is empty every call succeeds with an empty status report
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Vec<String>>>,
    responses: Mutex<VecDeque<Result<String, BackendError>>>,
}

impl FakeBackend {
    pub fn with_responses(
        responses: impl IntoIterator<Item = Result<String, BackendError>>,
    ) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// first argument of every call
    pub fn commands(&self) -> Vec<String> {
        self.calls().iter().map(|call| call[0].clone()).collect()
    }
}

impl Backend for FakeBackend {
    fn run(&self, args: &[String]) -> Result<String, BackendError> {
        self.calls.lock().unwrap().push(args.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(EMPTY_STATUS.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Info(String),
    Warning(String),
    Error(String),
    Log(String),
    Confirm(String),
    Comment(String),
    Progress(ProgressLocation, String),
    Report(String),
    Finished(String),
}

/// host that answers prompts from fixed values and records everything
pub struct RecordingHost {
    events: Mutex<Vec<Event>>,
    confirm: bool,
    comment: Option<String>,
}

impl RecordingHost {
    pub fn confirming(confirm: bool) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            confirm,
            comment: Some("a comment".to_string()),
        }
    }

    pub fn without_comment() -> Self {
        Self {
            comment: None,
            ..Self::confirming(true)
        }
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// info, warning and error messages only
    pub fn notifications(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, Event::Info(_) | Event::Warning(_) | Event::Error(_)))
            .collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Log(message) => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn confirmations(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Confirm(_)))
            .count()
    }
}

struct RecordingProgress<'a> {
    host: &'a RecordingHost,
    title: String,
}

impl Progress for RecordingProgress<'_> {
    fn report(&self, message: &str) {
        self.host.push(Event::Report(message.to_string()));
    }
}

impl Drop for RecordingProgress<'_> {
    fn drop(&mut self) {
        self.host.push(Event::Finished(self.title.clone()));
    }
}

impl Host for RecordingHost {
    fn info(&self, message: &str) {
        self.push(Event::Info(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(Event::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Event::Error(message.to_string()));
    }

    fn log(&self, message: &str) {
        self.push(Event::Log(message.to_string()));
    }

    fn confirm(&self, message: &str) -> bool {
        self.push(Event::Confirm(message.to_string()));
        self.confirm
    }

    fn request_comment(&self, description: &str) -> Option<String> {
        self.push(Event::Comment(description.to_string()));
        self.comment.clone()
    }

    fn begin_progress(&self, location: ProgressLocation, title: &str) -> Box<dyn Progress + '_> {
        self.push(Event::Progress(location, title.to_string()));
        Box::new(RecordingProgress {
            host: self,
            title: title.to_string(),
        })
    }
}
