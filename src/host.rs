/// where a progress indication is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressLocation {
    /// quiet indication scoped to the change list, does not block
    SourceControl,
    /// prominent indication for a user-initiated action
    Notification,
}

/// an active progress indication, finished when dropped
pub trait Progress {
    fn report(&self, message: &str);
}

/// the user-facing surface the workflows talk to
pub trait Host: Send + Sync {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);

    /// diagnostic line that is not shown as a notification
    fn log(&self, message: &str);

    /// modal yes/no question, `No` is the default
    fn confirm(&self, message: &str) -> bool;

    /// ask for a check-in comment, `None` if the user cancelled
    fn request_comment(&self, description: &str) -> Option<String>;

    fn begin_progress(&self, location: ProgressLocation, title: &str) -> Box<dyn Progress + '_>;
}
