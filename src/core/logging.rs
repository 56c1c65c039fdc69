use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::shared::paths::ensure_dir;

/// Log targets that get their own rolling file. Everything else lands in
/// `system.log`.
pub const PLUGIN_TARGETS: [&str; 6] = ["schedule", "stocks", "reminders", "projects", "weather", "server"];

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create logs directory: {0}")]
    Directory(#[from] std::io::Error),
    #[error("Failed to set global tracing subscriber: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Keeps the non-blocking writers flushing; hold for the process lifetime.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

struct PluginWriter {
    writers: HashMap<String, NonBlocking>,
    system_writer: NonBlocking,
}

/// Returns the plugin whose file should receive events from `target`.
fn plugin_for_target<'p>(target: &str, plugins: impl IntoIterator<Item = &'p str>) -> Option<&'p str> {
    plugins.into_iter().find(|plugin| {
        target == *plugin
            || target
                .strip_prefix(plugin)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

impl<'a> MakeWriter<'a> for PluginWriter {
    type Writer = Box<dyn std::io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        Box::new(self.system_writer.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        match plugin_for_target(meta.target(), self.writers.keys().map(String::as_str)) {
            Some(plugin) => Box::new(self.writers[plugin].clone()),
            None => Box::new(self.system_writer.clone()),
        }
    }
}

pub fn init_logging(log_dir: &Path) -> Result<LoggingGuards, LoggingError> {
    ensure_dir(log_dir)?;

    let mut guards = Vec::new();
    let mut writers = HashMap::new();

    for plugin in PLUGIN_TARGETS {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, format!("{}.log", plugin));
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        writers.insert(plugin.to_string(), non_blocking);
        guards.push(guard);
    }

    let system_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "system.log");
    let (system_writer, system_guard) = tracing_appender::non_blocking(system_appender);
    guards.push(system_guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(PluginWriter {
                writers,
                system_writer,
            })
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(target: "system", "Logging initialized at {:?}", log_dir);

    Ok(LoggingGuards { _guards: guards })
}
