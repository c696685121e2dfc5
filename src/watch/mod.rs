//! Watch module - Debounced redraw trigger
//!
//! A `notify` watcher on the data file's directory feeds an [`EventFilter`],
//! which turns bursts of modifications into single [`RedrawRequest`]s on an
//! mpsc channel. The [`RedrawLoop`] drains that channel on the main thread.

mod debounce;
mod redraw_loop;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE_WINDOW};
pub use redraw_loop::{RedrawLoop, RedrawStats, DEFAULT_POLL_INTERVAL};

use chrono::{DateTime, Local};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace, warn};

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),
    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] std::io::Error),
    #[error("Not a file path: {0}")]
    NoFileName(PathBuf),
}

/// A debounced request to regenerate the output.
#[derive(Debug, Clone, PartialEq)]
pub struct RedrawRequest {
    pub timestamp: DateTime<Local>,
    pub path: PathBuf,
}

/// Passes modifications of one file through a [`Debouncer`] into a channel.
pub struct EventFilter {
    file_name: OsString,
    debouncer: Debouncer,
    tx: Sender<RedrawRequest>,
}

impl EventFilter {
    pub fn new(file: &Path, window: Duration, tx: Sender<RedrawRequest>) -> Result<Self, WatchError> {
        let file_name = file
            .file_name()
            .ok_or_else(|| WatchError::NoFileName(file.to_path_buf()))?
            .to_os_string();
        Ok(Self {
            file_name,
            debouncer: Debouncer::new(window),
            tx,
        })
    }

    /// Returns `true` when the event was queued as a redraw request.
    pub fn handle(&mut self, event: &Event, now: Instant) -> bool {
        if !matches!(event.kind, EventKind::Modify(_)) {
            return false;
        }
        let Some(path) = event
            .paths
            .iter()
            .find(|path| path.file_name() == Some(self.file_name.as_os_str()))
        else {
            return false;
        };

        if !self.debouncer.accept(now) {
            trace!(path = %path.display(), "event inside debounce window, dropped");
            return false;
        }

        let request = RedrawRequest {
            timestamp: Local::now(),
            path: path.clone(),
        };
        if self.tx.send(request).is_err() {
            debug!("redraw queue closed, event dropped");
            return false;
        }
        true
    }
}

/// Watch the directory `watch_dir` for modifications of `file`.
///
/// The watcher must be kept alive for as long as events are wanted; dropping
/// it releases the watch and closes the channel.
pub fn watch_file(
    file: &Path,
    watch_dir: &Path,
    window: Duration,
) -> Result<(RecommendedWatcher, Receiver<RedrawRequest>), WatchError> {
    let (tx, rx) = channel();
    let mut filter = EventFilter::new(file, window, tx)?;

    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| match result {
        Ok(event) => {
            filter.handle(&event, Instant::now());
        }
        Err(error) => warn!("watch error: {error}"),
    })?;
    watcher.watch(watch_dir, RecursiveMode::NonRecursive)?;
    debug!(dir = %watch_dir.display(), file = %file.display(), "watching");

    Ok((watcher, rx))
}

/// Flag raised by SIGINT or SIGTERM.
pub fn install_shutdown_flag() -> Result<Arc<AtomicBool>, WatchError> {
    let should_terminate = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&should_terminate))?;
    }
    Ok(should_terminate)
}

/// Directory to watch for `file`: its parent, or `.` for a bare name.
pub fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{CreateKind, DataChange, ModifyKind, RenameMode};

    fn modified(path: &str) -> Event {
        Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any))).add_path(PathBuf::from(path))
    }

    #[test]
    fn test_filter_ignores_other_files_and_kinds() {
        let (tx, rx) = channel();
        let mut filter = EventFilter::new(Path::new("/data/log.yaml"), Duration::from_secs(5), tx).unwrap();
        let now = Instant::now();

        assert!(!filter.handle(&modified("/data/other.yaml"), now));
        assert!(!filter.handle(
            &Event::new(EventKind::Create(CreateKind::File)).add_path(PathBuf::from("/data/log.yaml")),
            now
        ));
        assert!(filter.handle(&modified("/data/log.yaml"), now));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_rename_into_place_triggers_redraw() {
        let (tx, rx) = channel();
        let mut filter = EventFilter::new(Path::new("/data/log.yaml"), Duration::from_secs(5), tx).unwrap();
        let renamed = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::To)))
            .add_path(PathBuf::from("/data/log.yaml"));

        assert!(filter.handle(&renamed, Instant::now()));
        assert_eq!(rx.try_recv().unwrap().path, PathBuf::from("/data/log.yaml"));
    }

    #[test]
    fn test_no_file_name_is_an_error() {
        let (tx, _rx) = channel();
        assert!(matches!(
            EventFilter::new(Path::new("/"), Duration::from_secs(5), tx),
            Err(WatchError::NoFileName(_))
        ));
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir(Path::new("/data/x.csv")), PathBuf::from("/data"));
        assert_eq!(parent_dir(Path::new("x.csv")), PathBuf::from("."));
    }
}
