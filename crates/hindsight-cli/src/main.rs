mod cmd_check;
mod cmd_config;
mod cmd_transcript;
mod cmd_watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use hindsight_bridge::{Host, ReflectConfig, StderrNotifier, TracingSink};
use hindsight_store::{FsDirs, FsMarkerSearch, FsSessionStore};
use tokio_util::task::TaskTracker;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "hindsight",
    version,
    about = "Reflect on completed coding-agent sessions"
)]
struct Cli {
    /// Project directory (default: current directory)
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,
    /// Session store root (default: per-user data dir)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Minimum user messages for a session to be analyzed
    #[arg(long, global = true)]
    min_user_messages: Option<usize>,
    /// Minimum tool calls for a session to be analyzed
    #[arg(long, global = true)]
    min_tool_calls: Option<usize>,
    /// Transcript line budget
    #[arg(long, global = true)]
    lines: Option<usize>,
    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed newline-delimited host events to the reflection engine
    Watch {
        /// Read events from a file instead of stdin
        #[arg(long)]
        events: Option<PathBuf>,
        /// Analyze the last-known session when input ends
        #[arg(long)]
        flush: bool,
    },
    /// Run the eligibility checks for one session
    Check {
        /// Session ID
        session: String,
    },
    /// Print the compressed transcript of a session
    Transcript {
        /// Session ID
        session: String,
    },
    /// Print the effective configuration as JSON
    Config,
}

/// Everything a subcommand needs, resolved from global flags.
pub(crate) struct Context {
    pub project_dir: PathBuf,
    pub store_root: PathBuf,
    pub config: ReflectConfig,
}

impl Context {
    pub fn store(&self) -> FsSessionStore {
        FsSessionStore::new(&self.store_root)
    }

    pub fn host(&self) -> Host {
        build_host(&self.store_root)
    }
}

/// Filesystem-backed collaborators.
pub(crate) fn build_host(store_root: &Path) -> Host {
    Host {
        store: Arc::new(FsSessionStore::new(store_root)),
        markers: Arc::new(FsMarkerSearch::new()),
        dirs: Arc::new(FsDirs),
        log: Arc::new(TracingSink),
        notifier: Arc::new(StderrNotifier),
        tasks: TaskTracker::new(),
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "hindsight=debug,hindsight_bridge=debug,hindsight_store=debug"
        } else {
            "info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let config = ReflectConfig::load(&project_dir)
        .with_min_user_messages(cli.min_user_messages)
        .with_min_tool_calls(cli.min_tool_calls)
        .with_transcript_lines(cli.lines);
    let ctx = Context {
        store_root: cli.store.unwrap_or_else(hindsight_store::store_root),
        project_dir,
        config,
    };

    match cli.cmd {
        Command::Watch { events, flush } => cmd_watch::execute(&ctx, events.as_deref(), flush),
        Command::Check { session } => cmd_check::execute(&ctx, &session),
        Command::Transcript { session } => cmd_transcript::execute(&ctx, &session),
        Command::Config => cmd_config::execute(&ctx),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "hindsight",
            "check",
            "ses_1",
            "--min-tool-calls",
            "5",
            "--cwd",
            "/tmp/proj",
        ])
        .unwrap();
        assert_eq!(cli.min_tool_calls, Some(5));
        assert_eq!(cli.cwd, Some(PathBuf::from("/tmp/proj")));
        assert!(matches!(cli.cmd, Command::Check { session } if session == "ses_1"));
    }

    #[test]
    fn watch_flags() {
        let cli =
            Cli::try_parse_from(["hindsight", "watch", "--events", "ev.jsonl", "--flush"]).unwrap();
        match cli.cmd {
            Command::Watch { events, flush } => {
                assert_eq!(events, Some(PathBuf::from("ev.jsonl")));
                assert!(flush);
            }
            _ => panic!("expected watch"),
        }
    }

    #[test]
    fn subcommand_required() {
        assert!(Cli::try_parse_from(["hindsight"]).is_err());
    }
}
