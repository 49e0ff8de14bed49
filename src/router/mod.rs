//! The router: fan-out dispatch of log events to every sink whose rules
//! admit them.
//!
//! Each sink gets one bounded queue drained by one dedicated task. That
//! single mechanism provides per-sink write ordering (one writer per
//! sink), cross-sink independence (a slow sink only fills its own queue),
//! and shutdown flush (close the queues, wait for the drains).

mod metrics;

pub use metrics::{MetricsSnapshot, RouterMetrics};

use crate::config::{ConfigError, RouterConfig, SinkSpec, SinkType, file_sink_spec_or_err};
use crate::domain::LogEvent;
use crate::rules::{Rule, RuleSet};
use crate::sink::{ConsoleSink, FileSink, SinkError, SinkWriter, SyslogSink, WriteOutcome};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Queue depth per sink. Dispatch never blocks: when a sink's queue is
/// full the event is dropped for that sink and counted.
const SINK_QUEUE_CAPACITY: usize = 8192;

/// How long `shutdown` waits for the drain tasks before abandoning
/// whatever is still queued.
const DRAIN_GRACE_PERIOD: Duration = Duration::from_secs(4);

/// A runtime sink failure, reported once per sink on the router's error
/// channel. After reporting, the sink drops events until process restart.
#[derive(Debug)]
pub struct SinkFailure {
    pub sink_id: String,
    pub error: SinkError,
}

/// Summary returned by [`Router::shutdown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    /// False when the grace period expired with events still queued.
    pub flushed: bool,
    /// Events abandoned in sink queues.
    pub dropped: u64,
}

#[derive(Debug)]
struct SinkHandle {
    id: String,
    rules: RuleSet,
    tx: mpsc::Sender<Arc<LogEvent>>,
    task: JoinHandle<()>,
}

#[derive(Debug)]
pub struct Router {
    sinks: Vec<SinkHandle>,
    metrics: Arc<RouterMetrics>,
    failure_rx: Option<mpsc::UnboundedReceiver<SinkFailure>>,
}

impl Router {
    /// Builds a router from a configuration: validates it, compiles every
    /// rule, opens file sinks (honoring `append`), and spawns one drain
    /// task per sink. Any error aborts the build; no partial router is
    /// ever returned.
    pub async fn build(config: RouterConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let (failure_tx, failure_rx) = mpsc::unbounded_channel();
        let metrics = Arc::new(RouterMetrics::default());
        let mut sinks = Vec::new();

        for spec in config.resolved_sinks() {
            let rules = compile_rules(&config, &spec)?;
            let writer = open_writer(&spec).await?;
            sinks.push(spawn_sink(
                spec.id,
                rules,
                writer,
                failure_tx.clone(),
                Arc::clone(&metrics),
            ));
        }

        Ok(Self {
            sinks,
            metrics,
            failure_rx: Some(failure_rx),
        })
    }

    /// Routes one event to every sink whose rules admit it.
    ///
    /// Never blocks and has no error path: logging must not stall or fail
    /// the caller's logic. A full sink queue costs that one sink the
    /// event, nothing else.
    pub fn dispatch(&self, event: LogEvent) {
        self.metrics.record_dispatched();
        let event = Arc::new(event);

        for sink in &self.sinks {
            if !sink.rules.admits(&event) {
                continue;
            }
            match sink.tx.try_send(Arc::clone(&event)) {
                Ok(()) => self.metrics.record_admitted(),
                Err(mpsc::error::TrySendError::Full(_)) => {
                    self.metrics.record_queue_full_drop();
                    debug!(sink = %sink.id, "sink queue full, dropping event");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.metrics.record_queue_full_drop();
                    debug!(sink = %sink.id, "sink drain task gone, dropping event");
                }
            }
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Hands out the error channel. Yields `Some` exactly once.
    pub fn take_failure_channel(&mut self) -> Option<mpsc::UnboundedReceiver<SinkFailure>> {
        self.failure_rx.take()
    }

    /// Closes every sink queue and waits for the drain tasks to flush,
    /// bounded by a grace period. Events still queued when it expires are
    /// dropped, and that count is reported once.
    pub async fn shutdown(self) -> DrainSummary {
        let Router { sinks, metrics, .. } = self;

        let deadline = tokio::time::Instant::now() + DRAIN_GRACE_PERIOD;
        let drains = sinks.into_iter().map(|sink| {
            let SinkHandle { id, tx, mut task, .. } = sink;
            // Closing the queue lets the drain task finish its backlog and
            // exit on its own.
            drop(tx);
            async move {
                let drained = tokio::time::timeout_at(deadline, &mut task).await;
                if drained.is_err() {
                    task.abort();
                    warn!(sink = %id, "drain timed out, abandoning queued events");
                }
                drained.is_ok()
            }
        });
        let flushed = join_all(drains).await.into_iter().all(|done| done);

        let snapshot = metrics.snapshot();
        let processed = snapshot.written + snapshot.dropped_write + snapshot.dropped_failed;
        let dropped = snapshot.admitted.saturating_sub(processed);
        metrics.record_shutdown_drops(dropped);
        if dropped > 0 {
            warn!(dropped, "events dropped at shutdown");
        }

        DrainSummary { flushed, dropped }
    }
}

/// A sink's effective rule list: its inline rules followed by every
/// top-level binding naming it, in declaration order.
fn compile_rules(config: &RouterConfig, spec: &SinkSpec) -> Result<RuleSet, ConfigError> {
    let inline = spec.rules.iter();
    let bound = config
        .rules
        .iter()
        .filter(|binding| binding.sink == spec.id)
        .map(|binding| &binding.rule);

    let mut rules = RuleSet::default();
    for rule_spec in inline.chain(bound) {
        let rule = Rule::new(
            rule_spec.level,
            &rule_spec.source,
            &rule_spec.tag,
            &rule_spec.message,
        )
        .map_err(|source| ConfigError::Filter {
            sink: spec.id.clone(),
            source,
        })?;
        rules.push(rule);
    }
    Ok(rules)
}

async fn open_writer(spec: &SinkSpec) -> Result<SinkWriter, ConfigError> {
    match spec.kind {
        SinkType::Console => Ok(SinkWriter::Console(ConsoleSink::new())),
        SinkType::Syslog => Ok(SinkWriter::Syslog(SyslogSink::new())),
        SinkType::File => {
            let file_spec = file_sink_spec_or_err(spec)?;
            let sink = FileSink::open(file_spec)
                .await
                .map_err(|source| ConfigError::Io {
                    sink: spec.id.clone(),
                    source,
                })?;
            Ok(SinkWriter::File(sink))
        }
    }
}

fn spawn_sink(
    id: String,
    rules: RuleSet,
    mut writer: SinkWriter,
    failure_tx: mpsc::UnboundedSender<SinkFailure>,
    metrics: Arc<RouterMetrics>,
) -> SinkHandle {
    let (tx, mut rx) = mpsc::channel::<Arc<LogEvent>>(SINK_QUEUE_CAPACITY);
    let sink_id = id.clone();

    let task = tokio::spawn(async move {
        let mut failed = false;
        while let Some(event) = rx.recv().await {
            if failed {
                metrics.record_failed_drop();
                continue;
            }
            match writer.write(&event).await {
                Ok(WriteOutcome::Written) => metrics.record_written(),
                Ok(WriteOutcome::Dropped) => metrics.record_write_drop(),
                Err(sink_error) => {
                    // Latch the failure and report it once; later events
                    // for this sink drop without further noise.
                    failed = true;
                    metrics.record_failed_drop();
                    error!(sink = %sink_id, error = %sink_error, "sink failed, dropping subsequent events");
                    let _ = failure_tx.send(SinkFailure {
                        sink_id: sink_id.clone(),
                        error: sink_error,
                    });
                }
            }
        }
    });

    SinkHandle {
        id,
        rules,
        tx,
        task,
    }
}
