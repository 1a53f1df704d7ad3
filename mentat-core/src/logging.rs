//! ``src/logging.rs``
//! ============================================================================
//! # Logging
//!
//! One file layer only: the TUI owns stdout and stderr while it runs, so
//! nothing is ever written to the terminal. Lines look like
//! `000042 INFO  [src/fs/dir_scanner.rs:40 mentat_core::fs::dir_scanner] ...`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

use directories::ProjectDirs;
use tracing::Metadata;
use tracing_appender::{non_blocking::WorkerGuard, rolling::daily};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    prelude::*,
};

use crate::config::Config;
use crate::error::AppError;

pub const LOG_FILE_PREFIX: &str = "mentat";

pub struct Logger;

impl Logger {
    /// Call **once** near the start of `main`. Keep the returned guard alive
    /// until exit or buffered lines are lost.
    pub fn init_tracing(config: &Config) -> Result<WorkerGuard, AppError> {
        let log_dir = Self::log_dir()?;
        fs::create_dir_all(&log_dir).map_err(|e| {
            AppError::Logging(format!("cannot create {}: {e}", log_dir.display()))
        })?;

        // daily rolling file appender → <log_dir>/mentat.YYYY-MM-DD
        let (writer, guard) = tracing_appender::non_blocking(daily(&log_dir, LOG_FILE_PREFIX));

        let file_layer = fmt::layer()
            .event_format(SeqFileMod)
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(Self::env_filter(config));

        tracing_subscriber::registry()
            .with(file_layer)
            .try_init()
            .map_err(|e| AppError::Logging(e.to_string()))?;

        tracing::info!("Logging to {}", log_dir.display());
        Ok(guard)
    }

    /// `MENTAT_LOG_DIR`, else `<data dir>/logs`.
    pub fn log_dir() -> Result<PathBuf, AppError> {
        if let Some(dir) = std::env::var_os("MENTAT_LOG_DIR").filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let proj_dirs = ProjectDirs::from("org", "mentat", "mentat")
            .ok_or_else(|| AppError::Logging("Could not determine data directory.".into()))?;
        Ok(default_log_dir(proj_dirs.data_local_dir()))
    }

    /// `RUST_LOG` wins; otherwise `config.log_level`, then plain `info`.
    fn env_filter(config: &Config) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn default_log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

static SEQ: AtomicUsize = AtomicUsize::new(1);

/// Custom formatter: `[SEQ] LEVEL [file:line mod::path] message`
struct SeqFileMod;

impl<S, N> FormatEvent<S, N> for SeqFileMod
where
    S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut w: Writer<'_>,
        ev: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let seq: usize = SEQ.fetch_add(1, Ordering::Relaxed);

        let meta: &'static Metadata<'static> = ev.metadata();
        write!(
            w,
            "{seq:06} {:5} [{}:{} {}] ",
            meta.level(),
            meta.file().unwrap_or("??"),
            meta.line().unwrap_or(0),
            meta.module_path().unwrap_or("???"),
        )?;

        ctx.field_format().format_fields(w.by_ref(), ev)?;
        writeln!(w)
    }
}
