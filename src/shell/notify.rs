//! User-facing notifications (the blocking alert of a dashboard).

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

/// Delivers a message the user has to see.
pub trait Notifier: Send {
    fn notify(&mut self, level: Level, message: &str);

    fn info(&mut self, message: &str) {
        self.notify(Level::Info, message);
    }

    fn error(&mut self, message: &str) {
        self.notify(Level::Error, message);
    }
}

/// Writes info to one stream and errors to another (stdout/stderr).
pub struct TerminalNotifier<O, E> {
    out: O,
    err: E,
}

impl<O: Write + Send, E: Write + Send> TerminalNotifier<O, E> {
    #[must_use]
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }
}

impl<O: Write + Send, E: Write + Send> Notifier for TerminalNotifier<O, E> {
    fn notify(&mut self, level: Level, message: &str) {
        let written = match level {
            Level::Info => writeln!(self.out, "{message}"),
            Level::Error => writeln!(self.err, "error: {message}"),
        };
        if let Err(e) = written {
            tracing::warn!(error = %e, "failed to write notification");
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct NoticeLog {
    pub entries: Vec<(Level, String)>,
}

impl Notifier for NoticeLog {
    fn notify(&mut self, level: Level, message: &str) {
        self.entries.push((level, message.to_owned()));
    }
}
