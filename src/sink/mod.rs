//! Output sinks: the closed set of targets a routed event can be written
//! to. The configuration schema fixes the variants, so polymorphism is an
//! enum with a shared write contract rather than open-ended trait objects.

mod console;
mod file;
pub mod rotation;
mod syslog;

pub use console::ConsoleSink;
pub use file::FileSink;
pub use syslog::SyslogSink;

use crate::domain::LogEvent;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("rotation failed: {0}")]
    Rotation(#[source] std::io::Error),
}

/// What became of one write on a best-effort channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// Dropped on a low-value channel (console/syslog); counted, not
    /// reported.
    Dropped,
}

/// Renders an event in the line format existing log consumers expect:
/// `[<timestamp>][<LEVEL>][<tag>] <source>: <message>`.
pub fn format_event(event: &LogEvent) -> String {
    format!(
        "[{}][{}][{}] {}: {}",
        event.timestamp.format("%Y-%m-%d %H:%M:%S%.3f"),
        event.level,
        event.tag,
        event.source,
        event.message
    )
}

#[derive(Debug)]
pub enum SinkWriter {
    Console(ConsoleSink),
    Syslog(SyslogSink),
    File(FileSink),
}

impl SinkWriter {
    /// Writes one admitted event. `Ok(Dropped)` is a best-effort loss on a
    /// console/syslog channel; `Err` means the sink has failed and must
    /// stop receiving events.
    pub async fn write(&mut self, event: &LogEvent) -> Result<WriteOutcome, SinkError> {
        match self {
            SinkWriter::Console(sink) => Ok(sink.write(event).await),
            SinkWriter::Syslog(sink) => Ok(sink.write(event)),
            SinkWriter::File(sink) => sink.write(event).await.map(|()| WriteOutcome::Written),
        }
    }
}
