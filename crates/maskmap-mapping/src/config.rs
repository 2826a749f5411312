use maskmap_input::ButtonBinding;
use serde::{Deserialize, Serialize};

use crate::edit::EditError;
use crate::entry::{
    Aim, CancelCast, DirectionBinding, DirectionButtonBinding, DirectionPad,
    EntryKind, JoyStickBinding, MappingEntry, MouseCastReleaseMode,
    MouseCastSpell, MultipleTap, MultipleTapItem, PadCastReleaseMode,
    PadCastSpell, RawInput, RepeatTap, SingleTap, Swipe,
};
use crate::geometry::{Position, Size};

/// A persisted mapping profile. Deserializing checks `original_size` and
/// decodes entries one by one, like [`crate::parse_mapping_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "crate::parse::RawMappingConfig")]
pub struct MappingConfig {
    pub title: String,
    pub version: String,
    pub original_size: Size,
    pub mappings: Vec<MappingEntry>,
}

impl MappingConfig {
    pub fn new(title: impl Into<String>, original_size: Size) -> Self {
        Self {
            title: title.into(),
            version: DEFAULT_VERSION.to_string(),
            original_size,
            mappings: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<&MappingEntry> {
        self.mappings.get(index)
    }

    fn check_index(&self, index: usize) -> Result<(), EditError> {
        let len = self.mappings.len();
        if index >= len {
            return Err(EditError::EntryOutOfRange { index, len });
        }
        Ok(())
    }

    pub fn replace_entry(
        &self,
        index: usize,
        entry: MappingEntry,
    ) -> Result<Self, EditError> {
        self.check_index(index)?;
        let mut next = self.clone();
        next.mappings[index] = entry;
        Ok(next)
    }

    pub fn delete_entry(&self, index: usize) -> Result<Self, EditError> {
        self.check_index(index)?;
        let mut next = self.clone();
        next.mappings.remove(index);
        Ok(next)
    }

    pub fn append_entry(&self, entry: MappingEntry) -> Self {
        let mut next = self.clone();
        next.mappings.push(entry);
        next
    }
}

pub const DEFAULT_VERSION: &str = "0.0.1";

fn wasd() -> DirectionButtonBinding {
    DirectionButtonBinding {
        up: bind(&["KeyW"]),
        down: bind(&["KeyS"]),
        left: bind(&["KeyA"]),
        right: bind(&["KeyD"]),
    }
}

// Codes here are literals known to be distinct.
fn bind(codes: &[&str]) -> ButtonBinding {
    ButtonBinding::new(codes.iter().copied()).unwrap_or_default()
}

/// A fresh entry of `kind` at `position`, as created by "add button".
/// Bindings start empty except for direction pads.
pub fn default_entry(
    kind: EntryKind,
    position: Position,
    original: Size,
) -> MappingEntry {
    let half = |v: u32| i32::try_from(v / 2).unwrap_or(i32::MAX);
    let center = Position::new(half(original.width), half(original.height));
    let empty = ButtonBinding::empty;
    let aim = |pointer_id, sensitivity| Aim {
        bind: empty(),
        note: String::new(),
        pointer_id,
        position,
        sensitivity_x: sensitivity,
        sensitivity_y: sensitivity,
    };

    match kind {
        EntryKind::SingleTap => MappingEntry::SingleTap(SingleTap {
            bind: empty(),
            duration: 30,
            note: String::new(),
            pointer_id: 1,
            position,
            sync: false,
        }),
        EntryKind::RepeatTap => MappingEntry::RepeatTap(RepeatTap {
            bind: empty(),
            duration: 30,
            interval: 100,
            note: String::new(),
            pointer_id: 1,
            position,
        }),
        EntryKind::MultipleTap => MappingEntry::MultipleTap(MultipleTap {
            bind: empty(),
            items: vec![MultipleTapItem {
                duration: 30,
                position,
                wait: 0,
            }],
            note: String::new(),
            pointer_id: 1,
        }),
        EntryKind::Swipe => MappingEntry::Swipe(Swipe {
            bind: empty(),
            interval: 1000,
            note: String::new(),
            pointer_id: 1,
            positions: vec![position],
        }),
        EntryKind::DirectionPad => MappingEntry::DirectionPad(DirectionPad {
            bind: DirectionBinding::Button(wasd()),
            initial_duration: 100,
            max_offset_x: 100.0,
            max_offset_y: 100.0,
            note: String::new(),
            pointer_id: 9,
            position,
        }),
        EntryKind::MouseCastSpell => MappingEntry::MouseCastSpell(MouseCastSpell {
            bind: empty(),
            cast_no_direction: false,
            cast_radius: 625.0,
            center,
            drag_radius: 150.0,
            horizontal_scale_factor: 7.0,
            note: String::new(),
            pointer_id: 3,
            position,
            release_mode: MouseCastReleaseMode::OnRelease,
            vertical_scale_factor: 10.0,
        }),
        EntryKind::PadCastSpell => MappingEntry::PadCastSpell(PadCastSpell {
            bind: empty(),
            block_direction_pad: true,
            drag_radius: 150.0,
            note: String::new(),
            pad_bind: wasd(),
            pointer_id: 3,
            position,
            release_mode: PadCastReleaseMode::OnRelease,
        }),
        EntryKind::CancelCast => MappingEntry::CancelCast(CancelCast {
            bind: empty(),
            note: String::new(),
            position,
        }),
        EntryKind::Observation => MappingEntry::Observation(aim(4, 0.5)),
        EntryKind::Fps => MappingEntry::Fps(aim(0, 1.0)),
        EntryKind::Fire => MappingEntry::Fire(aim(1, 1.0)),
        EntryKind::RawInput => MappingEntry::RawInput(RawInput {
            bind: empty(),
            note: String::new(),
            position,
        }),
    }
}

/// Sample profile written for new workspaces.
pub fn default_mapping_config() -> MappingConfig {
    let note = String::from;
    let cast = |note: &str, position: (i32, i32), mode, no_direction, code: &str| {
        MappingEntry::MouseCastSpell(MouseCastSpell {
            bind: bind(&[code]),
            cast_no_direction: no_direction,
            cast_radius: 625.0,
            center: Position::new(1280, 815),
            drag_radius: 150.0,
            horizontal_scale_factor: 7.0,
            note: note.to_string(),
            pointer_id: 3,
            position: position.into(),
            release_mode: mode,
            vertical_scale_factor: 10.0,
        })
    };

    MappingConfig {
        title: "Default".to_string(),
        version: DEFAULT_VERSION.to_string(),
        original_size: Size::new(2560, 1440),
        mappings: vec![
            MappingEntry::SingleTap(SingleTap {
                bind: bind(&["Digit1"]),
                duration: 1000,
                note: note("SingleTap"),
                pointer_id: 1,
                position: (100, 100).into(),
                sync: false,
            }),
            MappingEntry::SingleTap(SingleTap {
                bind: bind(&["Digit2"]),
                duration: 0,
                note: note("SingleTap (sync)"),
                pointer_id: 1,
                position: (200, 100).into(),
                sync: true,
            }),
            MappingEntry::SingleTap(SingleTap {
                bind: bind(&["ControlLeft", "ScrollDown"]),
                duration: 0,
                note: note("SingleTap (Scroll)"),
                pointer_id: 1,
                position: (200, 150).into(),
                sync: true,
            }),
            MappingEntry::RepeatTap(RepeatTap {
                bind: bind(&["Digit3"]),
                duration: 30,
                interval: 100,
                note: note("RepeatTap"),
                pointer_id: 1,
                position: (250, 200).into(),
            }),
            MappingEntry::RepeatTap(RepeatTap {
                bind: bind(&["ControlLeft", "Digit3"]),
                duration: 30,
                interval: 100,
                note: note("RepeatTap (multi-binding)"),
                pointer_id: 2,
                position: (250, 250).into(),
            }),
            MappingEntry::MultipleTap(MultipleTap {
                bind: bind(&["Digit4"]),
                items: vec![
                    MultipleTapItem {
                        duration: 500,
                        position: (100, 100).into(),
                        wait: 0,
                    },
                    MultipleTapItem {
                        duration: 500,
                        position: (200, 200).into(),
                        wait: 1000,
                    },
                    MultipleTapItem {
                        duration: 500,
                        position: (300, 300).into(),
                        wait: 1000,
                    },
                ],
                note: note("MultipleTap"),
                pointer_id: 1,
            }),
            MappingEntry::Swipe(Swipe {
                bind: bind(&["Digit5"]),
                interval: 1000,
                note: note("Swipe"),
                pointer_id: 1,
                positions: vec![
                    (100, 100).into(),
                    (200, 200).into(),
                    (300, 300).into(),
                ],
            }),
            MappingEntry::DirectionPad(DirectionPad {
                bind: DirectionBinding::Button(wasd()),
                initial_duration: 100,
                max_offset_x: 100.0,
                max_offset_y: 100.0,
                note: note("DirectionPad"),
                pointer_id: 9,
                position: (300, 1000).into(),
            }),
            MappingEntry::DirectionPad(DirectionPad {
                bind: DirectionBinding::JoyStick(JoyStickBinding {
                    x: "LeftStickX".to_string(),
                    y: "LeftStickY".to_string(),
                }),
                initial_duration: 300,
                max_offset_x: 100.0,
                max_offset_y: 100.0,
                note: note("DirectionPad gamepad"),
                pointer_id: 9,
                position: (500, 1000).into(),
            }),
            cast(
                "MouseCastSpell (no direction)",
                (1900, 1150),
                MouseCastReleaseMode::OnRelease,
                true,
                "KeyE",
            ),
            cast(
                "MouseCastSpell (press to release)",
                (1900, 1150),
                MouseCastReleaseMode::OnPress,
                false,
                "KeyQ",
            ),
            cast(
                "MouseCastSpell (second press to release)",
                (2100, 1030),
                MouseCastReleaseMode::OnSecondPress,
                true,
                "AltLeft",
            ),
            cast(
                "MouseCastSpell",
                (2250, 900),
                MouseCastReleaseMode::OnRelease,
                false,
                "M-Back",
            ),
            MappingEntry::PadCastSpell(PadCastSpell {
                bind: bind(&["KeyJ"]),
                block_direction_pad: true,
                drag_radius: 150.0,
                note: note("PadCastSpell"),
                pad_bind: wasd(),
                pointer_id: 3,
                position: (2000, 750).into(),
                release_mode: PadCastReleaseMode::OnRelease,
            }),
            MappingEntry::CancelCast(CancelCast {
                bind: bind(&["Space"]),
                note: note("CancelCast"),
                position: (2200, 175).into(),
            }),
            MappingEntry::Observation(Aim {
                bind: bind(&["M-Forward"]),
                note: note("Observation"),
                pointer_id: 4,
                position: (2000, 300).into(),
                sensitivity_x: 0.5,
                sensitivity_y: 0.5,
            }),
            MappingEntry::Fps(Aim {
                bind: bind(&["Backquote"]),
                note: note("FPS"),
                pointer_id: 0,
                position: (1280, 720).into(),
                sensitivity_x: 1.2,
                sensitivity_y: 1.0,
            }),
            MappingEntry::Fire(Aim {
                bind: bind(&["M-Left"]),
                note: note("Fire"),
                pointer_id: 1,
                position: (2000, 1000).into(),
                sensitivity_x: 1.0,
                sensitivity_y: 0.5,
            }),
            MappingEntry::RawInput(RawInput {
                bind: bind(&["Enter"]),
                note: note("RawInput"),
                position: (2000, 300).into(),
            }),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_operations_return_new_configs() {
        let config = default_mapping_config();
        let len = config.len();

        let appended = config.append_entry(default_entry(
            EntryKind::CancelCast,
            Position::new(1, 2),
            config.original_size,
        ));
        assert_eq!(appended.len(), len + 1);
        assert_eq!(config.len(), len);

        let deleted = appended.delete_entry(0).unwrap();
        assert_eq!(deleted.len(), len);
        assert_eq!(deleted.mappings[0], config.mappings[1]);

        let replaced = config
            .replace_entry(0, config.mappings[1].clone())
            .unwrap();
        assert_eq!(replaced.mappings[0], replaced.mappings[1]);
    }

    #[test]
    fn out_of_range_entry_index_is_an_error() {
        let config = MappingConfig::new("empty", Size::new(100, 100));
        assert_eq!(
            config.delete_entry(0),
            Err(EditError::EntryOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn default_entries_exist_for_every_kind() {
        let original = Size::new(2560, 1440);
        for kind in EntryKind::ALL {
            let entry = default_entry(*kind, Position::new(10, 20), original);
            assert_eq!(entry.kind(), Some(*kind));
            assert_eq!(entry.position(), Some(Position::new(10, 20)));
        }
    }

    #[test]
    fn sample_profile_survives_json() {
        let config = default_mapping_config();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let back: MappingConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
