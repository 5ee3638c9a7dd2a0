use std::path::Path;

use anyhow::Result;
use hindsight_core::{PromptPart, PromptRequest, SessionInfo, SessionStats, Toast, ToastVariant};
use hindsight_transcript::format_transcript;

use crate::config::ReflectConfig;
use crate::eligibility::Eligible;
use crate::host::Host;

pub const REFLECT_TITLE_PREFIX: &str = "Reflect: ";

/// Remedy categories and the specialist agent each one is routed to.
const SPECIALISTS: [(&str, &str); 3] = [
    ("process", "@reflect-process"),
    ("automation", "@reflect-automation"),
    ("knowledge", "@reflect-knowledge"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Prompt delivered to the new reflection session.
    Dispatched { reflection_id: String },
    /// The store created no usable session; nothing was sent.
    NoSessionId,
}

pub fn reflection_title(session: &SessionInfo) -> String {
    format!("{REFLECT_TITLE_PREFIX}{}", session.label())
}

/// Inputs for the analysis prompt.
pub struct PromptInput<'a> {
    pub session_id: &'a str,
    pub project_dir: &'a Path,
    pub reflect_dir: &'a Path,
    pub stats: SessionStats,
    pub transcript: &'a str,
}

pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let categories: Vec<&str> = SPECIALISTS.iter().map(|(c, _)| *c).collect();
    let routing: Vec<String> = SPECIALISTS
        .iter()
        .map(|(category, agent)| format!("   - {category} → {agent}"))
        .collect();

    format!(
        "Analyze this completed session for improvement opportunities.

## Session Metadata

Session ID: {session_id}
Project: {project}
User Messages: {users}
Tool Calls: {tools}

## Session Transcript

{transcript}

## Instructions

1. Identify symptoms in categories: {categories}
2. For high/medium severity symptoms, delegate to specialists:
{routing}
3. Specialists write remedies to: {reflect_dir}/YYYY-MM-DD_TYPE_title.md",
        session_id = input.session_id,
        project = input.project_dir.display(),
        users = input.stats.user_messages,
        tools = input.stats.tool_calls,
        transcript = input.transcript,
        categories = categories.join(", "),
        routing = routing.join("\n"),
        reflect_dir = input.reflect_dir.display(),
    )
}

/// Package an eligible session and hand it to a fresh reflection session.
///
/// Order: compress, ensure the artifact directory, create the reflection
/// session, send the prompt, then fire the notification without waiting on it.
pub async fn dispatch(
    host: &Host,
    config: &ReflectConfig,
    project_dir: &Path,
    eligible: &Eligible,
) -> Result<DispatchOutcome> {
    let transcript = format_transcript(&eligible.messages, config.transcript_max_lines);

    let reflect_dir = config.reflect_dir(project_dir);
    host.dirs.ensure_dir(&reflect_dir).await?;

    let created = host
        .store
        .create(&reflection_title(&eligible.session))
        .await?;
    let Some(reflection) = created.filter(|s| !s.id.is_empty()) else {
        return Ok(DispatchOutcome::NoSessionId);
    };

    let text = build_prompt(&PromptInput {
        session_id: &eligible.session.id,
        project_dir,
        reflect_dir: &reflect_dir,
        stats: eligible.stats,
        transcript: &transcript,
    });
    let request = PromptRequest {
        agent: config.classifier_agent.clone(),
        parts: vec![PromptPart::Text { text }],
    };
    host.store.prompt(&reflection.id, request).await?;

    let toast = Toast {
        message: format!("Reflecting on \"{}\"...", eligible.session.label()),
        variant: ToastVariant::Info,
    };
    let notifier = host.notifier.clone();
    host.tasks.spawn(async move {
        let _ = notifier.notify(toast).await;
    });

    Ok(DispatchOutcome::Dispatched {
        reflection_id: reflection.id,
    })
}
