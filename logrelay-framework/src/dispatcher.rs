//! Fan-out of log entries to the active sinks.

use crate::sink::{ConsoleSink, Sink};
use logrelay_common::LogEntry;

/// Ordered, immutable set of active sinks.
///
/// Built once at startup and shared by reference (usually `Arc<Dispatcher>`)
/// with every listener.
pub struct Dispatcher {
    sinks: Vec<Box<dyn Sink>>,
}

impl Dispatcher {
    /// Create a dispatcher over `sinks`.
    ///
    /// With no sinks, falls back to a console sink on stderr at debug threshold.
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        let sinks = if sinks.is_empty() {
            tracing::debug!("No sink configured, using console");
            vec![Box::new(ConsoleSink::stderr()) as Box<dyn Sink>]
        } else {
            sinks
        };

        Self { sinks }
    }

    /// Number of active sinks.
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Whether the dispatcher holds no sink. `new` never builds an empty one.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Names of the active sinks, in delivery order.
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Deliver `entry` to every sink whose threshold it meets.
    ///
    /// A failing sink is logged and does not stop delivery to the others.
    pub async fn dispatch(&self, entry: &LogEntry) -> DispatchStats {
        let mut stats = DispatchStats::default();

        for sink in &self.sinks {
            if !entry.severity.is_at_least(sink.min_level()) {
                stats.skipped += 1;
                continue;
            }

            match sink.deliver(entry).await {
                Ok(()) => stats.delivered += 1,
                Err(e) => {
                    stats.failed += 1;
                    tracing::warn!(sink = %sink.name(), error = %e, "Failed to deliver entry");
                }
            }
        }

        stats
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("sinks", &self.sink_names())
            .finish()
    }
}

/// Outcome of dispatching one entry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchStats {
    /// Sinks that accepted the entry.
    pub delivered: usize,
    /// Sinks that reported a delivery failure.
    pub failed: usize,
    /// Sinks whose threshold filtered the entry out.
    pub skipped: usize,
}

impl DispatchStats {
    /// Number of delivery attempts.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}
