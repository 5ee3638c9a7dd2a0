use hindsight_core::{LogEntry, LogLevel, LogSink, Notifier, Toast};

/// Forwards log entries to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[async_trait::async_trait]
impl LogSink for TracingSink {
    async fn log(&self, entry: LogEntry) {
        let LogEntry {
            service,
            level,
            message,
        } = entry;
        match level {
            LogLevel::Debug => tracing::debug!(service = %service, "{message}"),
            LogLevel::Info => tracing::info!(service = %service, "{message}"),
            LogLevel::Error => tracing::error!(service = %service, "{message}"),
        }
    }
}

/// Prints toasts to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

#[async_trait::async_trait]
impl Notifier for StderrNotifier {
    async fn notify(&self, toast: Toast) -> anyhow::Result<()> {
        eprintln!("[hindsight] {}", toast.message);
        Ok(())
    }
}
