//! User-facing notices.
//!
//! Components in this crate never render anything themselves: every message
//! meant for the user's eyes goes through [`NoticeSink`] with a severity,
//! and the embedder decides how to show it. Each externally visible failure
//! produces exactly one notice.

use std::sync::Mutex;
use std::sync::PoisonError;

use core::fmt;

/// How prominently a notice should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Neutral information.
    Info,
    /// A completed action worth celebrating.
    Success,
    /// Something the user should correct before retrying.
    Warning,
    /// A failure outside the user's control.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Receiver for user-facing messages.
pub trait NoticeSink: Send + Sync {
    /// Deliver one message at the given severity.
    fn notify(&self, severity: Severity, message: &str);

    /// Deliver an informational message.
    fn info(&self, message: &str) {
        self.notify(Severity::Info, message);
    }

    /// Deliver a success message.
    fn success(&self, message: &str) {
        self.notify(Severity::Success, message);
    }

    /// Deliver a warning.
    fn warning(&self, message: &str) {
        self.notify(Severity::Warning, message);
    }

    /// Deliver an error message.
    fn error(&self, message: &str) {
        self.notify(Severity::Error, message);
    }
}

/// Notice sink that renders through `tracing`.
///
/// Useful for headless runs and as a safe default: notices land in the log
/// stream alongside everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNoticeSink;

impl NoticeSink for LogNoticeSink {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!(%severity, "{message}"),
            Severity::Warning => tracing::warn!(%severity, "{message}"),
            Severity::Error => tracing::error!(%severity, "{message}"),
        }
    }
}

/// Notice sink that records every message.
///
/// Backs test assertions and embedders that want to poll for messages
/// instead of receiving them push-style.
#[derive(Debug, Default)]
pub struct RecordingNoticeSink {
    notices: Mutex<Vec<(Severity, String)>>,
}

impl RecordingNoticeSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    #[must_use]
    pub fn notices(&self) -> Vec<(Severity, String)> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drain and return everything recorded so far. Calling this just to
    /// reset the sink is fine.
    pub fn take(&self) -> Vec<(Severity, String)> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl NoticeSink for RecordingNoticeSink {
    fn notify(&self, severity: Severity, message: &str) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_collects_in_order() {
        let sink = RecordingNoticeSink::new();
        sink.warning("first");
        sink.success("second");

        let notices = sink.notices();
        assert_eq!(
            notices,
            vec![
                (Severity::Warning, "first".to_owned()),
                (Severity::Success, "second".to_owned()),
            ]
        );
    }

    #[test]
    fn test_take_drains() {
        let sink = RecordingNoticeSink::new();
        sink.error("boom");
        assert_eq!(sink.take().len(), 1);
        assert!(sink.notices().is_empty());
    }

    #[test]
    fn test_severity_labels() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Success.to_string(), "success");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
