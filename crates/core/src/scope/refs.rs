use std::fmt;
use tracing::debug;

/// Reference used for linear pushes: the commit before `HEAD`.
pub const PARENT_COMMIT_REF: &str = "HEAD~1";

/// Kind of CI event that triggered the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PullRequest,
    ManualDispatch,
    Push,
}

impl EventKind {
    /// Maps a GitHub Actions event name. Unknown names count as a push.
    pub fn from_event_name(name: &str) -> Self {
        match name.trim() {
            "pull_request" | "pull_request_target" => EventKind::PullRequest,
            "workflow_dispatch" => EventKind::ManualDispatch,
            _ => EventKind::Push,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PullRequest => "pull_request",
            EventKind::ManualDispatch => "workflow_dispatch",
            EventKind::Push => "push",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the prior state a run is compared against.
#[derive(Debug, Clone)]
pub struct RefResolver {
    event: EventKind,
    base_ref: String,
    ref_override: Option<String>,
}

impl RefResolver {
    pub fn new(event: EventKind, base_ref: impl Into<String>) -> Self {
        Self {
            event,
            base_ref: base_ref.into(),
            ref_override: None,
        }
    }

    /// Pins the reference for pull requests and pushes. Ignored when empty.
    pub fn with_override(mut self, reference: Option<String>) -> Self {
        self.ref_override = reference.filter(|r| !r.trim().is_empty());
        self
    }

    /// Returns the comparison reference. An empty string means "do not diff".
    pub fn resolve(&self) -> String {
        let reference = match (self.event, &self.ref_override) {
            (EventKind::ManualDispatch, _) => String::new(),
            (_, Some(pinned)) => pinned.clone(),
            (EventKind::PullRequest, None) => format!("origin/{}", self.base_ref),
            (EventKind::Push, None) => PARENT_COMMIT_REF.to_string(),
        };

        debug!(event = %self.event, reference = %reference, "Resolved comparison ref");
        reference
    }
}
