use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

const ENABLED_VAR: &str = "PLANNER_OBSERVABILITY_ENABLED";
const LEVEL_VAR: &str = "PLANNER_LOG_LEVEL";
const JSON_PATH_VAR: &str = "PLANNER_JSON_LOG_PATH";
const DEFAULT_JSON_FILE: &str = "planner.logs.jsonl";

static INIT: OnceCell<()> = OnceCell::new();

/// Where log records end up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LogSink {
    /// Compact human-readable lines on stderr.
    Console,
    /// One JSON object per line, appended to `dir/file_name`.
    JsonFile { dir: PathBuf, file_name: String },
}

impl LogSink {
    fn from_env() -> Self {
        match std::env::var(JSON_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::json_file(Path::new(&path)),
            _ => Self::Console,
        }
    }

    fn json_file(path: &Path) -> Self {
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_JSON_FILE)
            .to_string();
        Self::JsonFile { dir, file_name }
    }
}

fn enabled_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

fn env_filter(default_level: &str) -> EnvFilter {
    if let Ok(level) = std::env::var(LEVEL_VAR)
        && let Ok(filter) = EnvFilter::try_new(level)
    {
        return filter;
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn json_writer(dir: &Path, file_name: &str) -> RollingFileAppender {
    let _ = std::fs::create_dir_all(dir);
    tracing_appender::rolling::never(dir, file_name)
}

fn json_layer<S>(writer: RollingFileAppender) -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(false)
        .with_writer(writer)
}

/// Installs the global tracing subscriber the first time it is called.
///
/// - `PLANNER_OBSERVABILITY_ENABLED=false` turns logging off entirely.
/// - `PLANNER_LOG_LEVEL`, then `RUST_LOG`, select the filter; `default_level`
///   applies when neither is set or valid.
/// - `PLANNER_JSON_LOG_PATH` writes JSONL records to that file. Without it,
///   records go to stderr so stdout stays free for streamed output.
pub fn init_observability(default_level: &str) {
    INIT.get_or_init(|| {
        let enabled = std::env::var(ENABLED_VAR)
            .ok()
            .and_then(|v| enabled_flag(&v))
            .unwrap_or(true);
        if !enabled {
            return;
        }

        let registry = tracing_subscriber::registry().with(env_filter(default_level));
        let _ = match LogSink::from_env() {
            LogSink::JsonFile { dir, file_name } => registry
                .with(json_layer(json_writer(&dir, &file_name)))
                .try_init(),
            LogSink::Console => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .try_init(),
        };
    });
}
