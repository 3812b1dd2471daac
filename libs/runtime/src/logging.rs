use crate::config::{LoggingConfig, Section};
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{
    filter::{FilterFn, Targets},
    fmt,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};

const DEFAULT_SECTION: &str = "default";
const DEFAULT_MAX_SIZE_MB: u64 = 100;
const DEFAULT_MAX_BACKUPS: usize = 3;

fn parse_tracing_level(s: &str) -> Option<Level> {
    match s.to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        "off" | "none" => None,
        _ => Some(Level::INFO),
    }
}

/// `target == prefix` or `target` starts with `prefix::`.
fn matches_target_prefix(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .map(|rest| rest.is_empty() || rest.starts_with("::"))
        .unwrap_or(false)
}

type DefaultFilter = FilterFn<Box<dyn Fn(&tracing::Metadata<'_>) -> bool + Send + Sync + 'static>>;

/// Everything not claimed by an explicit section, up to `max_level`.
fn unclaimed_targets_filter(claimed: Vec<String>, max_level: Level) -> DefaultFilter {
    FilterFn::new(Box::new(move |meta: &tracing::Metadata<'_>| {
        !claimed.iter().any(|c| matches_target_prefix(meta.target(), c))
            && meta.level() <= &max_level
    }))
}

// -------- rotating file sinks --------

type SharedRotate = Arc<Mutex<FileRotate<AppendTimestamp>>>;

#[derive(Clone)]
struct FileSink(SharedRotate);

impl Write for FileSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?
            .write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?
            .flush()
    }
}

/// Writer handle that silently discards output when no sink matches.
struct MaybeSink(Option<FileSink>);

impl Write for MaybeSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(sink) => sink.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(sink) => sink.flush(),
            None => Ok(()),
        }
    }
}

/// Routes records to a per-target file, falling back to the default file.
#[derive(Clone, Default)]
struct FileRouter {
    default: Option<SharedRotate>,
    by_prefix: HashMap<String, SharedRotate>,
}

impl FileRouter {
    fn sink_for(&self, target: &str) -> Option<FileSink> {
        self.by_prefix
            .iter()
            .find(|(prefix, _)| matches_target_prefix(target, prefix))
            .map(|(_, rot)| rot)
            .or(self.default.as_ref())
            .map(|rot| FileSink(rot.clone()))
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_prefix.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = MaybeSink;

    fn make_writer(&'a self) -> Self::Writer {
        MaybeSink(self.default.as_ref().map(|rot| FileSink(rot.clone())))
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        MaybeSink(self.sink_for(meta.target()))
    }
}

/// Relative log paths are resolved against `base_dir` (the application home dir).
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating_file(log_path: &Path, section: &Section) -> std::io::Result<SharedRotate> {
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let backups = section.max_backups.unwrap_or(DEFAULT_MAX_BACKUPS);

    let rot = FileRotate::new(
        log_path,
        AppendTimestamp::default(FileLimit::MaxFiles(backups)),
        ContentLimit::BytesSurpassed(max_bytes as usize),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Arc::new(Mutex::new(rot)))
}

fn open_section_file(name: &str, section: &Section, base_dir: &Path) -> Option<SharedRotate> {
    if section.file.trim().is_empty() {
        return None;
    }
    let log_path = resolve_log_path(&section.file, base_dir);
    match open_rotating_file(&log_path, section) {
        Ok(rot) => Some(rot),
        Err(e) => {
            eprintln!(
                "Failed to open log file for '{}': {} ({})",
                name,
                log_path.display(),
                e
            );
            None
        }
    }
}

/// Explicit (non-default) sections, split from the default one.
struct Plan<'a> {
    default: Option<&'a Section>,
    explicit: Vec<(&'a str, &'a Section)>,
}

impl<'a> Plan<'a> {
    fn from_config(cfg: &'a LoggingConfig) -> Self {
        Self {
            default: cfg.get(DEFAULT_SECTION),
            explicit: cfg
                .iter()
                .filter(|(k, _)| k.as_str() != DEFAULT_SECTION)
                .map(|(k, v)| (k.as_str(), v))
                .collect(),
        }
    }

    fn claimed(&self) -> Vec<String> {
        self.explicit.iter().map(|(n, _)| n.to_string()).collect()
    }

    fn console_targets(&self) -> Targets {
        self.explicit
            .iter()
            .filter_map(|(name, s)| parse_tracing_level(&s.console_level).map(|l| (*name, l)))
            .fold(Targets::new().with_default(LevelFilter::OFF), |t, (name, l)| {
                t.with_target(name.to_string(), LevelFilter::from_level(l))
            })
    }

    fn file_targets(&self) -> Targets {
        self.explicit
            .iter()
            .filter(|(_, s)| !s.file.trim().is_empty())
            .filter_map(|(name, s)| parse_tracing_level(&s.file_level).map(|l| (*name, l)))
            .fold(Targets::new().with_default(LevelFilter::OFF), |t, (name, l)| {
                t.with_target(name.to_string(), LevelFilter::from_level(l))
            })
    }

    fn file_router(&self, base_dir: &Path) -> FileRouter {
        let mut router = FileRouter {
            default: self
                .default
                .and_then(|s| open_section_file(DEFAULT_SECTION, s, base_dir)),
            by_prefix: HashMap::new(),
        };
        for (name, section) in &self.explicit {
            if let Some(rot) = open_section_file(name, section, base_dir) {
                router.by_prefix.insert(name.to_string(), rot);
            }
        }
        router
    }
}

/// Install the global subscriber from configuration.
///
/// Console output is human readable; file output is JSON. `base_dir` resolves
/// relative file paths. Calling this twice keeps the first subscriber.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` records before installing the subscriber.
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        init_default_logging();
        return;
    }

    use tracing_subscriber::{layer::SubscriberExt, prelude::*, Registry};

    let plan = Plan::from_config(cfg);
    let router = plan.file_router(base_dir);
    let ansi = atty::is(atty::Stream::Stdout);

    let console_explicit = fmt::layer()
        .with_ansi(ansi)
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_filter(plan.console_targets());

    let file_explicit = (!router.is_empty()).then(|| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router.clone())
            .with_filter(plan.file_targets())
    });

    let default_console_level = plan
        .default
        .and_then(|s| parse_tracing_level(&s.console_level));
    let console_default = default_console_level.map(|level| {
        fmt::layer()
            .with_ansi(ansi)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(unclaimed_targets_filter(plan.claimed(), level))
    });

    let default_file_level = plan
        .default
        .filter(|_| router.default.is_some())
        .and_then(|s| parse_tracing_level(&s.file_level));
    let file_default = default_file_level.map(|level| {
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_writer(router.clone())
            .with_filter(unclaimed_targets_filter(plan.claimed(), level))
    });

    let _ = Registry::default()
        .with(console_explicit)
        .with(file_explicit)
        .with(console_default)
        .with(file_default)
        .try_init();
}

fn init_default_logging() {
    let _ = fmt()
        .with_target(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .try_init();
}
