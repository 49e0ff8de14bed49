use super::{WriteOutcome, format_event};
use crate::domain::LogEvent;
use tokio::io::{AsyncWriteExt, Stdout};

/// Plain stdout sink. Failures are best-effort: the line is dropped and
/// counted, never escalated.
#[derive(Debug)]
pub struct ConsoleSink {
    out: Stdout,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            out: tokio::io::stdout(),
        }
    }

    pub async fn write(&mut self, event: &LogEvent) -> WriteOutcome {
        let mut line = format_event(event);
        line.push('\n');
        let result = async {
            self.out.write_all(line.as_bytes()).await?;
            self.out.flush().await
        }
        .await;

        match result {
            Ok(()) => WriteOutcome::Written,
            Err(_) => WriteOutcome::Dropped,
        }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}
