pub mod config;
pub mod dispatch;
pub mod eligibility;
pub mod engine;
pub mod mock;
pub mod sinks;

mod host;

pub use config::ReflectConfig;
pub use dispatch::DispatchOutcome;
pub use eligibility::{Eligible, SkipReason, Verdict};
pub use engine::{AnalysisOutcome, CompletionTracker, Reflector};
pub use host::Host;
pub use sinks::{StderrNotifier, TracingSink};
