use std::fmt;
use std::path::Path;

use anyhow::Result;
use hindsight_core::{Message, SessionInfo, SessionStats};

use crate::config::ReflectConfig;
use crate::host::Host;

/// Title fragments that mark a session as a reflection itself.
const REFLECTION_TITLE_MARKERS: [&str; 2] = ["reflect", "improvement"];

/// Why a completed session was not handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A reflection artifact already references the session.
    AlreadyReflected,
    /// The store no longer knows the session.
    Missing,
    /// The session is itself a reflection.
    ReflectionTitle,
    BelowThreshold {
        stats: SessionStats,
        min_user_messages: usize,
        min_tool_calls: usize,
    },
}

impl SkipReason {
    /// Log line for this skip.
    pub fn describe(&self, session_id: &str) -> String {
        match self {
            SkipReason::AlreadyReflected => format!("Skip already processed: {session_id}"),
            SkipReason::Missing => format!("Skip missing session: {session_id}"),
            SkipReason::ReflectionTitle => format!("Skip reflection session: {session_id}"),
            SkipReason::BelowThreshold {
                stats,
                min_user_messages,
                min_tool_calls,
            } => format!(
                "Skip {session_id}: {} msgs, {} tools (min: {min_user_messages}/{min_tool_calls})",
                stats.user_messages, stats.tool_calls
            ),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyReflected => write!(f, "already reflected"),
            SkipReason::Missing => write!(f, "session missing"),
            SkipReason::ReflectionTitle => write!(f, "reflection session"),
            SkipReason::BelowThreshold { stats, .. } => write!(
                f,
                "below threshold ({} user messages, {} tool calls)",
                stats.user_messages, stats.tool_calls
            ),
        }
    }
}

/// A session that passed every check, with the data fetched along the way.
#[derive(Debug, Clone)]
pub struct Eligible {
    pub session: SessionInfo,
    pub messages: Vec<Message>,
    pub stats: SessionStats,
}

#[derive(Debug, Clone)]
pub enum Verdict {
    Eligible(Eligible),
    Skip(SkipReason),
}

/// Case-insensitive check for titles that belong to reflection sessions.
pub fn is_reflection_title(title: &str) -> bool {
    let lower = title.to_lowercase();
    REFLECTION_TITLE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Both minimums are inclusive and both must hold.
pub fn meets_thresholds(stats: &SessionStats, config: &ReflectConfig) -> bool {
    stats.user_messages >= config.min_user_messages && stats.tool_calls >= config.min_tool_calls
}

/// Run the eligibility checks for one session, cheapest first.
///
/// Every skip is logged at debug level. Errors from the store propagate to
/// the caller; the marker search cannot fail.
pub async fn evaluate(
    host: &Host,
    config: &ReflectConfig,
    project_dir: &Path,
    session_id: &str,
) -> Result<Verdict> {
    let verdict = check(host, config, project_dir, session_id).await?;
    if let Verdict::Skip(reason) = &verdict {
        host.debug(reason.describe(session_id)).await;
    }
    Ok(verdict)
}

async fn check(
    host: &Host,
    config: &ReflectConfig,
    project_dir: &Path,
    session_id: &str,
) -> Result<Verdict> {
    let reflect_dir = config.reflect_dir(project_dir);
    if host.markers.exists(&reflect_dir, session_id).await {
        return Ok(Verdict::Skip(SkipReason::AlreadyReflected));
    }

    let Some(session) = host.store.get(session_id).await? else {
        return Ok(Verdict::Skip(SkipReason::Missing));
    };

    if session.title.as_deref().is_some_and(is_reflection_title) {
        return Ok(Verdict::Skip(SkipReason::ReflectionTitle));
    }

    let messages = host.store.messages(session_id).await?;
    let stats = SessionStats::from_messages(&messages);
    if !meets_thresholds(&stats, config) {
        return Ok(Verdict::Skip(SkipReason::BelowThreshold {
            stats,
            min_user_messages: config.min_user_messages,
            min_tool_calls: config.min_tool_calls,
        }));
    }

    Ok(Verdict::Eligible(Eligible {
        session,
        messages,
        stats,
    }))
}
