use super::{WriteOutcome, format_event};
use crate::domain::LogEvent;
use std::fmt;

#[cfg(unix)]
use crate::domain::Level;
#[cfg(unix)]
use std::os::unix::net::UnixDatagram;

#[cfg(unix)]
const SYSLOG_SOCKET: &str = "/dev/log";

// LOG_USER facility; a datagram's PRI is facility * 8 + severity.
#[cfg(unix)]
const FACILITY_USER: u8 = 1;

/// Sink delivering RFC 3164 datagrams to the local syslog daemon.
///
/// The socket is connected lazily on the first write so a missing daemon
/// degrades to counted drops instead of failing router construction. A
/// send error closes the socket; the next write reconnects.
pub struct SyslogSink {
    #[cfg(unix)]
    socket: Option<UnixDatagram>,
}

impl SyslogSink {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            socket: None,
        }
    }

    #[cfg(unix)]
    pub fn write(&mut self, event: &LogEvent) -> WriteOutcome {
        if self.socket.is_none() {
            self.socket = connect();
        }
        let Some(socket) = self.socket.as_ref() else {
            return WriteOutcome::Dropped;
        };

        match socket.send(encode(event).as_bytes()) {
            Ok(_) => WriteOutcome::Written,
            Err(_) => {
                // Reconnect on the next write; the daemon may have restarted.
                self.socket = None;
                WriteOutcome::Dropped
            }
        }
    }

    // No syslogd to talk to off Unix; degrade to stderr.
    #[cfg(not(unix))]
    pub fn write(&mut self, event: &LogEvent) -> WriteOutcome {
        use std::io::Write;

        let mut line = format_event(event);
        line.push('\n');
        match std::io::stderr().write_all(line.as_bytes()) {
            Ok(()) => WriteOutcome::Written,
            Err(_) => WriteOutcome::Dropped,
        }
    }
}

impl Default for SyslogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SyslogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyslogSink").finish_non_exhaustive()
    }
}

#[cfg(unix)]
fn connect() -> Option<UnixDatagram> {
    let socket = UnixDatagram::unbound().ok()?;
    socket.connect(SYSLOG_SOCKET).ok()?;
    Some(socket)
}

/// RFC 3164 datagram: `<PRI>TIMESTAMP IDENT[PID]: MSG`.
#[cfg(unix)]
fn encode(event: &LogEvent) -> String {
    let pri = FACILITY_USER * 8 + severity(event.level);
    format!(
        "<{pri}>{} {}[{}]: {}",
        event.timestamp.format("%b %e %H:%M:%S"),
        env!("CARGO_PKG_NAME"),
        std::process::id(),
        format_event(event)
    )
}

#[cfg(unix)]
fn severity(level: Level) -> u8 {
    match level {
        Level::Verbose => 7,  // debug
        Level::Info => 6,     // info
        Level::Metadata => 5, // notice
        Level::Warn => 4,     // warning
        Level::Error => 3,    // err
        Level::Critical => 2, // crit
    }
}
