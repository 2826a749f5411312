use std::fs;
use std::path::Path;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use notify::{Config, Error as NotifyError, RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{
    new_debouncer_opt, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use thiserror::Error;

use crate::parse::parse_mapping_config;
use crate::store::is_safe_file_name;
use crate::{MappingConfig, ProfileError};

const DEBOUNCE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("notify error: {0}")]
    Notify(#[from] NotifyError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] ProfileError),
}

#[derive(Debug)]
pub enum ProfileEvent {
    Changed {
        name: String,
        config: Box<MappingConfig>,
    },
    Removed {
        name: String,
    },
    Error {
        name: Option<String>,
        error: WatcherError,
    },
}

pub type ProfileEventSender = Sender<ProfileEvent>;
pub type ProfileEventReceiver = Receiver<ProfileEvent>;

/// Watches a profile directory and reports changed `.json` profiles.
pub struct ProfileWatcher {
    #[allow(dead_code)]
    watcher: Debouncer<RecommendedWatcher>,
}

fn profile_name(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    (name.ends_with(".json") && is_safe_file_name(name)).then(|| name.to_string())
}

fn send_profile_event(path: &Path, tx: &ProfileEventSender) {
    let Some(name) = profile_name(path) else {
        return;
    };

    if !path.exists() {
        let _ = tx.send(ProfileEvent::Removed { name });
        return;
    }

    let event = match fs::read_to_string(path) {
        Ok(content) => match parse_mapping_config(&content) {
            Ok(config) => ProfileEvent::Changed {
                name,
                config: Box::new(config),
            },
            Err(e) => ProfileEvent::Error {
                name: Some(name),
                error: WatcherError::Parse(e),
            },
        },
        Err(e) => ProfileEvent::Error {
            name: Some(name),
            error: WatcherError::Io(e),
        },
    };
    let _ = tx.send(event);
}

impl ProfileWatcher {
    pub fn new_with_sender(
        dir: &Path,
        tx: ProfileEventSender,
    ) -> Result<Self, WatcherError> {
        let debouncer_config = notify_debouncer_mini::Config::default()
            .with_timeout(DEBOUNCE_TIMEOUT)
            .with_notify_config(Config::default());
        let mut debouncer = new_debouncer_opt::<_, RecommendedWatcher>(
            debouncer_config,
            move |events: DebounceEventResult| match events {
                Ok(events) => {
                    for event in events {
                        match event.kind {
                            DebouncedEventKind::Any
                            | DebouncedEventKind::AnyContinuous => {
                                send_profile_event(&event.path, &tx);
                            }
                            _ => {}
                        }
                    }
                }
                Err(error) => {
                    let _ = tx.send(ProfileEvent::Error {
                        name: None,
                        error: WatcherError::Notify(error),
                    });
                }
            },
        )?;

        debouncer.watcher().watch(dir, RecursiveMode::NonRecursive)?;

        Ok(Self { watcher: debouncer })
    }

    pub fn new(dir: &Path) -> Result<(Self, ProfileEventReceiver), WatcherError> {
        let (tx, rx) = crossbeam_channel::unbounded();

        Ok((Self::new_with_sender(dir, tx)?, rx))
    }
}
