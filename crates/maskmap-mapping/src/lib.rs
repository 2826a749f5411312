//! Mapping profiles: the gesture entry model, edit operations, coordinate
//! mapping, validation and on-disk storage.

mod config;
mod edit;
mod entry;
pub mod geometry;
mod parse;
mod store;
mod validate;
mod watcher;

use thiserror::Error;

pub use config::{default_entry, default_mapping_config, MappingConfig, DEFAULT_VERSION};
pub use edit::{EditError, APPENDED_TAP_DURATION, APPENDED_TAP_WAIT};
pub use entry::{
    Aim, CancelCast, DirectionBinding, DirectionButtonBinding, DirectionPad,
    EntryKind, JoyStickBinding, MappingEntry, MouseCastReleaseMode,
    MouseCastSpell, MultipleTap, MultipleTapItem, PadCastReleaseMode,
    PadCastSpell, RawInput, RepeatTap, SingleTap, Swipe, UnknownEntry,
};
pub use geometry::{MaskViewport, Position, Size, ViewportPoint};
pub use parse::{parse_mapping_config, to_json};
pub use store::{
    is_safe_file_name, profile_file_name, DirStore, ProfileStore, StoreError,
};
pub use validate::{validate_mapping_config, ValidationError, MAX_ENTRIES_PER_KIND};
pub use watcher::{
    ProfileEvent, ProfileEventReceiver, ProfileEventSender, ProfileWatcher,
    WatcherError,
};

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("mapping #{index} has no string `type` field")]
    MissingType { index: usize },
    #[error("mapping #{index} ({type_name}): {source}")]
    Entry {
        index: usize,
        type_name: String,
        source: serde_json::Error,
    },
    #[error("invalid original size {width}x{height}")]
    InvalidOriginalSize { width: u32, height: u32 },
}
