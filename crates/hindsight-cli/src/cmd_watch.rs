use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context as _, Result};
use hindsight_bridge::{AnalysisOutcome, Reflector};
use hindsight_core::parse_event_line;

use crate::Context;

/// Execute `hindsight watch [--events FILE] [--flush]`
pub fn execute(ctx: &Context, events: Option<&Path>, flush: bool) -> Result<()> {
    let reflector = Reflector::new(ctx.host(), ctx.config.clone(), &ctx.project_dir);
    let rt = tokio::runtime::Runtime::new()?;
    let outcomes = match events {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            rt.block_on(feed(reflector, BufReader::new(file), flush))?
        }
        None => rt.block_on(feed(reflector, io::stdin().lock(), flush))?,
    };
    let dispatched = outcomes
        .iter()
        .filter(|o| matches!(o, AnalysisOutcome::Dispatched { .. }))
        .count();
    tracing::info!(
        analyzed = outcomes.len(),
        dispatched,
        "event stream finished"
    );
    Ok(())
}

/// Feed every event line to the engine in arrival order.
///
/// Blank lines are ignored. Lines that do not parse are logged at debug and
/// skipped. Returns the outcome of every analysis that ran, after any
/// notifications they spawned have been delivered.
async fn feed(
    mut reflector: Reflector,
    input: impl BufRead,
    flush: bool,
) -> Result<Vec<AnalysisOutcome>> {
    let mut outcomes = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = match parse_event_line(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(line = idx + 1, error = %e, "skipping malformed event");
                continue;
            }
        };
        if let Some(outcome) = reflector.handle_event(&event).await {
            outcomes.push(outcome);
        }
    }
    if flush {
        if let Some(outcome) = reflector.flush().await {
            outcomes.push(outcome);
        }
    }
    // The runtime is dropped once this returns; let pending toasts print.
    reflector.wait_for_notifications().await;
    Ok(outcomes)
}
