use std::sync::Arc;

use hindsight_core::{
    DirProvisioner, LogEntry, LogLevel, LogSink, MarkerSearch, Notifier, SessionStore,
};
use tokio_util::task::TaskTracker;

use crate::config::LOG_SERVICE;

/// The set of collaborators the engine runs against.
#[derive(Clone)]
pub struct Host {
    pub store: Arc<dyn SessionStore>,
    pub markers: Arc<dyn MarkerSearch>,
    pub dirs: Arc<dyn DirProvisioner>,
    pub log: Arc<dyn LogSink>,
    pub notifier: Arc<dyn Notifier>,
    /// Detached notification tasks, so a short-lived process can wait for them.
    pub tasks: TaskTracker,
}

impl Host {
    /// Wait for every notification spawned so far. Analysis never calls this;
    /// it is for callers about to tear the runtime down.
    pub async fn wait_for_notifications(&self) {
        self.tasks.close();
        self.tasks.wait().await;
        self.tasks.reopen();
    }

    pub(crate) async fn log(&self, level: LogLevel, message: String) {
        self.log
            .log(LogEntry {
                service: LOG_SERVICE.to_string(),
                level,
                message,
            })
            .await;
    }

    pub(crate) async fn debug(&self, message: String) {
        self.log(LogLevel::Debug, message).await;
    }

    pub(crate) async fn info(&self, message: String) {
        self.log(LogLevel::Info, message).await;
    }

    pub(crate) async fn error(&self, message: String) {
        self.log(LogLevel::Error, message).await;
    }
}
