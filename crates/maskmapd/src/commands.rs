use std::fs;
use std::path::Path;

use colored::Colorize;
use crossbeam_channel::{select, unbounded};
use maskmap_editor::EditorSession;
use maskmap_mapping::{
    default_mapping_config, profile_file_name, validate_mapping_config, MappingConfig,
    ProfileEvent, ProfileStore, ProfileWatcher, Size, StoreError, ValidationError,
    WatcherError,
};
use thiserror::Error;

use crate::replay::{ReplayError, ReplayScript, Replayer};
use crate::settings::{SettingsError, SETTING_KEYS};
use crate::workspace::{Workspace, WorkspaceError};
use crate::{print_debug, print_error, print_info, print_warning};

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Replay(#[from] ReplayError),
    #[error(transparent)]
    Watcher(#[from] WatcherError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("profile already exists: {0} (use --force to overwrite)")]
    ProfileExists(String),
    #[error("original size must be positive, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

type Result<T> = std::result::Result<T, CommandError>;

fn print_entries(config: &MappingConfig) {
    print_info!(
        "{} (version {}, {}x{}, {} entries)",
        config.title.bold(),
        config.version,
        config.original_size.width,
        config.original_size.height,
        config.len()
    );
    for (index, entry) in config.mappings.iter().enumerate() {
        let position = entry
            .position()
            .map(|p| format!("({},{})", p.x, p.y))
            .unwrap_or_default();
        let kind = if entry.is_unknown() {
            entry.type_name().dimmed()
        } else {
            entry.type_name().normal()
        };
        print_info!(
            "{index:>3} {kind:<16} {:<24} {position:<12} {}",
            entry.binding_text(),
            entry.note()
        );
    }
}

pub fn list(workspace: &Workspace) -> Result<()> {
    let store = workspace.store()?;
    let settings = workspace.load_settings()?;
    let names = store.list()?;
    if names.is_empty() {
        print_info!("no profiles in {}", store.path().display());
        return Ok(());
    }
    for name in names {
        if name == settings.active_mapping_file {
            print_info!("{} {}", "*".green(), name.bold());
        } else {
            print_info!("  {name}");
        }
    }
    Ok(())
}

pub fn show(workspace: &Workspace, name: &str) -> Result<()> {
    let config = workspace.store()?.load(name)?;
    print_entries(&config);
    Ok(())
}

pub fn validate(workspace: &Workspace, name: &str) -> Result<MappingConfig> {
    let config = workspace.store()?.load(name)?;
    validate_mapping_config(&config)?;
    print_info!("{} is valid", profile_file_name(name)?);
    Ok(config)
}

pub fn new_profile(
    workspace: &Workspace,
    name: &str,
    size: Option<Size>,
    force: bool,
) -> Result<()> {
    let store = workspace.store()?;
    let file_name = profile_file_name(name)?;
    if store.exists(&file_name)? && !force {
        return Err(CommandError::ProfileExists(file_name));
    }

    let config = match size {
        Some(size) if !size.is_valid() => {
            return Err(CommandError::InvalidSize {
                width: size.width,
                height: size.height,
            });
        }
        Some(size) => MappingConfig::new(file_name.trim_end_matches(".json"), size),
        None => default_mapping_config(),
    };
    store.save(&file_name, &config)?;
    print_info!("created {}", store.path().join(&file_name).display());
    Ok(())
}

pub fn activate(workspace: &Workspace, name: &str) -> Result<()> {
    validate(workspace, name)?;
    let mut settings = workspace.load_settings()?;
    settings.active_mapping_file = profile_file_name(name)?;
    workspace.save_settings(&settings)?;
    print_info!("active profile: {}", settings.active_mapping_file.bold());
    Ok(())
}

pub fn settings_show(workspace: &Workspace) -> Result<()> {
    let settings = workspace.load_settings()?;
    for key in SETTING_KEYS {
        print_info!("{key}: {}", settings.get(key)?);
    }
    Ok(())
}

pub fn settings_set(workspace: &Workspace, key: &str, value: &str) -> Result<()> {
    let mut settings = workspace.load_settings()?;
    settings.set(key, value)?;
    workspace.save_settings(&settings)?;
    print_info!("{key} = {}", settings.get(key)?);
    Ok(())
}

pub fn replay(workspace: &Workspace, name: &str, script: &Path, save: bool) -> Result<()> {
    let store = workspace.store()?;
    let config = store.load(name)?;
    let input = fs::read_to_string(script).map_err(|source| CommandError::Read {
        path: script.display().to_string(),
        source,
    })?;
    let script = ReplayScript::parse(&input)?;

    let mut session = EditorSession::new(profile_file_name(name)?, config);
    let mut replayer = Replayer::new();
    let report = replayer.run(&mut session, &script)?;

    for event in &report.events {
        print_debug!("{event:?}");
    }
    for notice in &report.notices {
        print_warning!("{notice}");
    }
    if replayer.listener_count() > 0 {
        print_debug!("{} input listeners still active", replayer.listener_count());
    }

    print_entries(session.config());
    if !session.is_edited() {
        print_info!("no changes");
    } else if save {
        store.save(session.name(), session.config())?;
        session.mark_saved();
        print_info!("saved {}", session.name());
    } else {
        print_info!("profile changed; pass --save to write it");
    }
    Ok(())
}

pub fn watch(workspace: &Workspace) -> Result<()> {
    let store = workspace.store()?;
    let active = workspace.load_settings()?.active_mapping_file;

    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let (_watcher, events) = ProfileWatcher::new(store.path())?;
    print_info!("watching {}", store.path().display());

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(events) -> msg => {
                let Ok(event) = msg else {
                    print_error!("watcher channel closed");
                    break;
                };
                match event {
                    ProfileEvent::Changed { name, config } => {
                        let marker = if name == active { " (active)" } else { "" };
                        match validate_mapping_config(&config) {
                            Ok(()) => {
                                print_info!("{name}{marker} changed: {} entries", config.len());
                            }
                            Err(e) => {
                                print_warning!("{name}{marker} changed but is invalid\n{e}");
                            }
                        }
                    }
                    ProfileEvent::Removed { name } => {
                        print_warning!("{name} removed");
                    }
                    ProfileEvent::Error { name, error } => {
                        print_error!("{}: {error}", name.as_deref().unwrap_or("watcher"));
                    }
                }
            }
        }
    }
    print_info!("stopped watching");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(Some(dir.path())).unwrap();
        (dir, ws)
    }

    #[test]
    fn new_refuses_to_overwrite_without_force() {
        let (_dir, ws) = workspace();
        new_profile(&ws, "game", None, false).unwrap();
        assert!(matches!(
            new_profile(&ws, "game", None, false),
            Err(CommandError::ProfileExists(_))
        ));
        new_profile(&ws, "game", None, true).unwrap();
    }

    #[test]
    fn new_with_size_creates_empty_profile() {
        let (_dir, ws) = workspace();
        new_profile(&ws, "phone", Some(Size::new(1080, 2400)), false).unwrap();
        let config = ws.store().unwrap().load("phone").unwrap();
        assert!(config.is_empty());
        assert_eq!(config.original_size, Size::new(1080, 2400));
        assert_eq!(config.title, "phone");
    }

    #[test]
    fn activate_sets_active_profile() {
        let (_dir, ws) = workspace();
        new_profile(&ws, "game", None, false).unwrap();
        activate(&ws, "game").unwrap();
        assert_eq!(ws.load_settings().unwrap().active_mapping_file, "game.json");
    }

    #[test]
    fn activate_rejects_invalid_profile() {
        let (_dir, ws) = workspace();
        new_profile(&ws, "small", Some(Size::new(100, 100)), false).unwrap();
        let store = ws.store().unwrap();
        let config = store.load("small").unwrap().append_entry(
            maskmap_mapping::default_entry(
                maskmap_mapping::EntryKind::SingleTap,
                maskmap_mapping::Position::new(1, 1),
                Size::new(100, 100),
            ),
        );
        store.save("small", &config).unwrap();

        assert!(matches!(activate(&ws, "small"), Err(CommandError::Validation(_))));
        assert_eq!(ws.load_settings().unwrap().active_mapping_file, "default.json");
    }

    #[test]
    fn replay_saves_when_asked() {
        let (dir, ws) = workspace();
        new_profile(&ws, "game", None, false).unwrap();
        let script = dir.path().join("script.json");
        fs::write(
            &script,
            r#"{"steps": [
                {"at_ms": 0, "action": "open_settings", "index": 0},
                {"at_ms": 0, "action": "set_note", "note": "renamed"}
            ]}"#,
        )
        .unwrap();

        replay(&ws, "game", &script, false).unwrap();
        let stored = ws.store().unwrap().load("game").unwrap();
        assert_eq!(stored.mappings[0].note(), "SingleTap");

        replay(&ws, "game", &script, true).unwrap();
        let stored = ws.store().unwrap().load("game").unwrap();
        assert_eq!(stored.mappings[0].note(), "renamed");
    }
}
