//! Reflection thresholds and naming.
//!
//! Resolution order, lowest to highest: built-in defaults,
//! `<project>/.hindsight/config.json` (`reflect.*` keys), `HINDSIGHT_*`
//! environment variables, then explicit overrides from the caller.
//! Values that fail to parse leave the lower layer in place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Service name attached to every log entry.
pub const LOG_SERVICE: &str = "reflect";

pub const DEFAULT_MIN_USER_MESSAGES: usize = 2;
pub const DEFAULT_MIN_TOOL_CALLS: usize = 3;
pub const DEFAULT_TRANSCRIPT_LINES: usize = hindsight_transcript::DEFAULT_MAX_LINES;
pub const DEFAULT_REFLECT_DIR: &str = "reflect";
pub const DEFAULT_CLASSIFIER_AGENT: &str = "reflect-classifier";

const ENV_MIN_USER_MESSAGES: &str = "HINDSIGHT_MIN_USER_MESSAGES";
const ENV_MIN_TOOL_CALLS: &str = "HINDSIGHT_MIN_TOOL_CALLS";
const ENV_TRANSCRIPT_LINES: &str = "HINDSIGHT_TRANSCRIPT_LINES";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflectConfig {
    pub min_user_messages: usize,
    pub min_tool_calls: usize,
    pub transcript_max_lines: usize,
    /// Subdirectory of the project that holds reflection artifacts.
    pub reflect_dir_name: String,
    /// Agent the analysis prompt is addressed to.
    pub classifier_agent: String,
}

impl Default for ReflectConfig {
    fn default() -> Self {
        Self {
            min_user_messages: DEFAULT_MIN_USER_MESSAGES,
            min_tool_calls: DEFAULT_MIN_TOOL_CALLS,
            transcript_max_lines: DEFAULT_TRANSCRIPT_LINES,
            reflect_dir_name: DEFAULT_REFLECT_DIR.to_string(),
            classifier_agent: DEFAULT_CLASSIFIER_AGENT.to_string(),
        }
    }
}

impl ReflectConfig {
    /// Defaults, then the project config file, then the process environment.
    pub fn load(project_dir: &Path) -> Self {
        let mut config = Self::default();
        config.apply_file(project_dir);
        config.apply_lookup(|key| std::env::var(key).ok());
        config
    }

    pub fn with_min_user_messages(mut self, value: Option<usize>) -> Self {
        if let Some(v) = value {
            self.min_user_messages = v;
        }
        self
    }

    pub fn with_min_tool_calls(mut self, value: Option<usize>) -> Self {
        if let Some(v) = value {
            self.min_tool_calls = v;
        }
        self
    }

    pub fn with_transcript_lines(mut self, value: Option<usize>) -> Self {
        if let Some(v) = value {
            self.transcript_max_lines = v;
        }
        self
    }

    pub fn reflect_dir(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.reflect_dir_name)
    }

    fn apply_file(&mut self, project_dir: &Path) {
        if let Some(v) = config_usize(project_dir, "reflect.min_user_messages") {
            self.min_user_messages = v;
        }
        if let Some(v) = config_usize(project_dir, "reflect.min_tool_calls") {
            self.min_tool_calls = v;
        }
        if let Some(v) = config_usize(project_dir, "reflect.transcript_max_lines") {
            self.transcript_max_lines = v;
        }
        if let Some(v) = config_string(project_dir, "reflect.dir") {
            self.reflect_dir_name = v;
        }
        if let Some(v) = config_string(project_dir, "reflect.agent") {
            self.classifier_agent = v;
        }
    }

    fn apply_lookup(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let parse = |key: &str| lookup(key).and_then(|v| v.trim().parse::<usize>().ok());
        if let Some(v) = parse(ENV_MIN_USER_MESSAGES) {
            self.min_user_messages = v;
        }
        if let Some(v) = parse(ENV_MIN_TOOL_CALLS) {
            self.min_tool_calls = v;
        }
        if let Some(v) = parse(ENV_TRANSCRIPT_LINES) {
            self.transcript_max_lines = v;
        }
    }
}

/// Path of the per-project config file.
pub fn config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".hindsight").join("config.json")
}

/// Read a raw JSON value from `.hindsight/config.json` using dot-notation keys.
pub fn config_value(project_dir: &Path, key: &str) -> Option<serde_json::Value> {
    let content = fs::read_to_string(config_path(project_dir)).ok()?;
    let val: serde_json::Value = serde_json::from_str(&content).ok()?;
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?.clone();
    }
    Some(current)
}

fn config_usize(project_dir: &Path, key: &str) -> Option<usize> {
    config_value(project_dir, key)?.as_u64().map(|v| v as usize)
}

fn config_string(project_dir: &Path, key: &str) -> Option<String> {
    config_value(project_dir, key)?
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
