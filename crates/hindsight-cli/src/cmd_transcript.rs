use anyhow::{bail, Result};
use hindsight_transcript::format_transcript;

use crate::Context;

/// Execute `hindsight transcript <SESSION>`
pub fn execute(ctx: &Context, session_id: &str) -> Result<()> {
    println!("{}", render(ctx, session_id)?);
    Ok(())
}

fn render(ctx: &Context, session_id: &str) -> Result<String> {
    let Some(record) = ctx.store().load(session_id)? else {
        bail!("session not found: {session_id}");
    };
    Ok(format_transcript(
        &record.messages,
        ctx.config.transcript_max_lines,
    ))
}
