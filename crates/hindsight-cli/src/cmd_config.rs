use anyhow::Result;

use crate::Context;

/// Execute `hindsight config`
pub fn execute(ctx: &Context) -> Result<()> {
    println!("{}", render(ctx)?);
    Ok(())
}

fn render(ctx: &Context) -> Result<String> {
    let mut value = serde_json::to_value(&ctx.config)?;
    if let Some(map) = value.as_object_mut() {
        map.insert(
            "reflect_dir".to_string(),
            ctx.config.reflect_dir(&ctx.project_dir).display().to_string().into(),
        );
        map.insert(
            "store".to_string(),
            ctx.store_root.display().to_string().into(),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}
