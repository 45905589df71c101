//! Watching the inbox for newly arrived solicitation PDFs.

use crate::error::{ExtractError, ExtractResult};
use crate::pdf::PdfFile;
use dibbs_config::{FolderConfig, WatchConfig};
use glob::Pattern;
use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, Debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;
use tracing::{debug, error, info};

/// Events emitted by the inbox watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A PDF was created or modified in the inbox.
    PdfArrived(PathBuf),
    /// The underlying watcher reported an error.
    Error(String),
}

/// Settings for [`InboxWatcher`].
#[derive(Debug, Clone)]
pub struct InboxWatcherConfig {
    pub inbox: PathBuf,
    pub ignore_patterns: Vec<Pattern>,
    pub debounce: Duration,
}

impl InboxWatcherConfig {
    pub fn from_config(folders: &FolderConfig, watch: &WatchConfig) -> Self {
        let ignore_patterns = watch
            .ignore_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .collect();

        Self {
            inbox: folders.inbox_dir(),
            ignore_patterns,
            debounce: Duration::from_secs(watch.poll_interval_seconds.max(1)),
        }
    }
}

/// Debounced watcher over the inbox folder.
pub struct InboxWatcher {
    config: InboxWatcherConfig,
    debouncer: Debouncer<RecommendedWatcher>,
    receiver: Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
}

impl InboxWatcher {
    pub fn new(config: InboxWatcherConfig) -> ExtractResult<Self> {
        let (tx, rx) = channel();

        let debouncer = new_debouncer(config.debounce, tx)
            .map_err(|e| ExtractError::WatchError(e.to_string()))?;

        Ok(Self {
            config,
            debouncer,
            receiver: rx,
        })
    }

    pub fn inbox(&self) -> &Path {
        &self.config.inbox
    }

    /// Start watching the inbox. The folder must exist.
    pub fn start(&mut self) -> ExtractResult<()> {
        if !self.config.inbox.exists() {
            return Err(ExtractError::FileNotFound(self.config.inbox.clone()));
        }

        info!("Watching inbox: {:?}", self.config.inbox);
        self.debouncer
            .watcher()
            .watch(&self.config.inbox, RecursiveMode::NonRecursive)
            .map_err(|e| ExtractError::WatchError(e.to_string()))?;

        Ok(())
    }

    /// Drain pending events without blocking.
    pub fn poll(&self) -> Vec<WatchEvent> {
        let mut events = Vec::new();

        while let Ok(result) = self.receiver.try_recv() {
            match result {
                Ok(batch) => {
                    events.extend(batch.into_iter().filter_map(|e| self.process_event(e)))
                }
                Err(e) => {
                    error!("Watch error: {:?}", e);
                    events.push(WatchEvent::Error(e.to_string()));
                }
            }
        }

        events.dedup();
        events
    }

    fn process_event(&self, event: DebouncedEvent) -> Option<WatchEvent> {
        let path = event.path;

        // Moves out of the inbox show up as events for paths that are gone.
        if !path.is_file() {
            return None;
        }

        if should_ignore_path(&path, &self.config.ignore_patterns) {
            debug!("Ignoring file: {:?}", path);
            return None;
        }

        if !PdfFile::is_pdf(&path) {
            debug!("Ignoring non-PDF file: {:?}", path);
            return None;
        }

        info!("PDF arrived: {:?}", path);
        Some(WatchEvent::PdfArrived(path))
    }
}

/// Hidden files and anything matching an ignore pattern by file name.
pub fn should_ignore_path(path: &Path, patterns: &[Pattern]) -> bool {
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };

    if filename.starts_with('.') {
        return true;
    }

    patterns.iter().any(|pattern| pattern.matches(filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_ignore() {
        let patterns = vec![
            Pattern::new("*.tmp").unwrap(),
            Pattern::new("~$*").unwrap(),
        ];

        assert!(should_ignore_path(Path::new("/inbox/.hidden.pdf"), &patterns));
        assert!(should_ignore_path(Path::new("/inbox/upload.pdf.tmp"), &patterns));
        assert!(should_ignore_path(Path::new("/inbox/~$SPE1.pdf"), &patterns));
        assert!(!should_ignore_path(Path::new("/inbox/SPE7M124T1234.pdf"), &patterns));
    }

    #[test]
    fn test_config_from_settings() {
        let folders = FolderConfig {
            inbox: "/tmp/dibbs-inbox".to_string(),
            ..FolderConfig::default()
        };
        let watch = WatchConfig {
            ignore_patterns: vec!["*.part".to_string(), "[".to_string()],
            poll_interval_seconds: 0,
        };

        let config = InboxWatcherConfig::from_config(&folders, &watch);
        assert_eq!(config.inbox, PathBuf::from("/tmp/dibbs-inbox"));
        // Invalid glob patterns are dropped.
        assert_eq!(config.ignore_patterns.len(), 1);
        assert_eq!(config.debounce, Duration::from_secs(1));
    }

    #[test]
    fn test_start_requires_inbox() {
        let config = InboxWatcherConfig {
            inbox: PathBuf::from("/definitely/not/an/inbox"),
            ignore_patterns: Vec::new(),
            debounce: Duration::from_secs(1),
        };
        let mut watcher = InboxWatcher::new(config).unwrap();
        assert!(matches!(
            watcher.start(),
            Err(ExtractError::FileNotFound(_))
        ));
    }
}
