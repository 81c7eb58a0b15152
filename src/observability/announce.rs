//! User-visible notices.
//!
//! Every outcome a user should see goes through an [`Announcer`], which
//! shows it on a [`NoticeSink`] and records it with `tracing`, so the log
//! file holds the same trail the user saw.

use std::fmt;
use tracing::{info, warn};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Neutral information.
    Info,
    /// An import or export completed.
    Success,
    /// Something needs the user's attention.
    Warning,
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text as shown.
    pub text: String,
}

impl Notice {
    /// Creates a notice.
    #[must_use]
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Where notices are shown.
pub trait NoticeSink {
    /// Shows one notice.
    fn show(&mut self, notice: &Notice);
}

/// Prints notices to stdout, warnings to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl NoticeSink for ConsoleSink {
    #[allow(clippy::print_stdout, clippy::print_stderr)]
    fn show(&mut self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => println!("{notice}"),
            NoticeLevel::Warning => eprintln!("{notice}"),
        }
    }
}

/// Collects notices in order.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    notices: Vec<Notice>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    /// Notices shown so far.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Texts shown so far.
    #[must_use]
    pub fn texts(&self) -> Vec<&str> {
        self.notices.iter().map(|n| n.text.as_str()).collect()
    }
}

impl NoticeSink for MemorySink {
    fn show(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}

/// Shows and records notices.
#[derive(Debug, Default)]
pub struct Announcer<S = ConsoleSink> {
    sink: S,
}

impl<S: NoticeSink> Announcer<S> {
    /// Creates an announcer over a sink.
    #[must_use]
    pub const fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Shows a notice and records it.
    pub fn announce(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => {
                info!(target: "kinfile::notice", "{}", notice.text);
            },
            NoticeLevel::Warning => warn!(target: "kinfile::notice", "{}", notice.text),
        }
        self.sink.show(&notice);
    }

    /// Shows and records an informational notice.
    pub fn info(&mut self, text: impl Into<String>) {
        self.announce(Notice::new(NoticeLevel::Info, text));
    }

    /// Shows and records a success notice.
    pub fn success(&mut self, text: impl Into<String>) {
        self.announce(Notice::new(NoticeLevel::Success, text));
    }

    /// Shows and records a warning.
    pub fn warn(&mut self, text: impl Into<String>) {
        self.announce(Notice::new(NoticeLevel::Warning, text));
    }

    /// Returns the sink.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Consumes the announcer, returning the sink.
    #[must_use]
    pub fn into_sink(self) -> S {
        self.sink
    }
}
