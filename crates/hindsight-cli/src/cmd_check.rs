use anyhow::Result;
use hindsight_bridge::eligibility::evaluate;
use hindsight_bridge::Verdict;

use crate::Context;

/// Execute `hindsight check <SESSION>`
pub fn execute(ctx: &Context, session_id: &str) -> Result<()> {
    let rt = tokio::runtime::Runtime::new()?;
    let verdict = rt.block_on(evaluate(
        &ctx.host(),
        &ctx.config,
        &ctx.project_dir,
        session_id,
    ))?;
    println!("{}", describe(session_id, &verdict));
    Ok(())
}

fn describe(session_id: &str, verdict: &Verdict) -> String {
    match verdict {
        Verdict::Eligible(e) => format!(
            "eligible: {} ({} user messages, {} tool calls)",
            e.session.label(),
            e.stats.user_messages,
            e.stats.tool_calls
        ),
        Verdict::Skip(reason) => format!("skip {session_id}: {reason}"),
    }
}
