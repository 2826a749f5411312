use maskmap_input::ButtonBinding;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::geometry::Position;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleTap {
    pub bind: ButtonBinding,
    pub duration: u64,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
    pub position: Position,
    pub sync: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepeatTap {
    pub bind: ButtonBinding,
    pub duration: u64,
    pub interval: u64,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleTapItem {
    pub duration: u64,
    pub position: Position,
    pub wait: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultipleTap {
    pub bind: ButtonBinding,
    pub items: Vec<MultipleTapItem>,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Swipe {
    pub bind: ButtonBinding,
    pub interval: u64,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
    pub positions: Vec<Position>,
}

/// Four button bindings, one per direction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionButtonBinding {
    pub up: ButtonBinding,
    pub down: ButtonBinding,
    pub left: ButtonBinding,
    pub right: ButtonBinding,
}

impl DirectionButtonBinding {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ButtonBinding)> {
        [
            ("up", &self.up),
            ("down", &self.down),
            ("left", &self.left),
            ("right", &self.right),
        ]
        .into_iter()
    }
}

/// Gamepad axis pair driving a direction pad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoyStickBinding {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DirectionBinding {
    Button(DirectionButtonBinding),
    JoyStick(JoyStickBinding),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionPad {
    pub bind: DirectionBinding,
    pub initial_duration: u64,
    pub max_offset_x: f32,
    pub max_offset_y: f32,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseCastReleaseMode {
    OnPress,
    OnRelease,
    OnSecondPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PadCastReleaseMode {
    OnRelease,
    OnSecondPress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouseCastSpell {
    pub bind: ButtonBinding,
    pub cast_no_direction: bool,
    pub cast_radius: f32,
    pub center: Position,
    pub drag_radius: f32,
    pub horizontal_scale_factor: f32,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
    pub position: Position,
    pub release_mode: MouseCastReleaseMode,
    pub vertical_scale_factor: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PadCastSpell {
    pub bind: ButtonBinding,
    pub block_direction_pad: bool,
    pub drag_radius: f32,
    #[serde(default)]
    pub note: String,
    #[serde(with = "button_direction")]
    pub pad_bind: DirectionButtonBinding,
    pub pointer_id: u32,
    pub position: Position,
    pub release_mode: PadCastReleaseMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelCast {
    pub bind: ButtonBinding,
    #[serde(default)]
    pub note: String,
    pub position: Position,
}

/// Pointer-look parameters shared by `Observation`, `Fps` and `Fire`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aim {
    pub bind: ButtonBinding,
    #[serde(default)]
    pub note: String,
    pub pointer_id: u32,
    pub position: Position,
    pub sensitivity_x: f32,
    pub sensitivity_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub bind: ButtonBinding,
    #[serde(default)]
    pub note: String,
    pub position: Position,
}

/// An entry whose `type` this version does not know. Kept verbatim so
/// saving a profile never drops it.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownEntry {
    pub type_name: String,
    pub raw: Value,
}

macro_rules! mapping_entries {
    ($($variant:ident($payload:ty)),* $(,)?) => {
        /// One gesture mapping, discriminated by `type` when persisted.
        #[derive(Debug, Clone, PartialEq)]
        pub enum MappingEntry {
            $($variant($payload),)*
            Unknown(UnknownEntry),
        }

        /// Discriminator of the known entry variants.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum EntryKind {
            $($variant,)*
        }

        impl EntryKind {
            pub const ALL: &'static [EntryKind] = &[$(EntryKind::$variant,)*];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(EntryKind::$variant => stringify!($variant),)*
                }
            }

            pub fn from_type_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some(EntryKind::$variant),)*
                    _ => None,
                }
            }
        }

        #[derive(Serialize)]
        #[serde(tag = "type")]
        enum TaggedRef<'a> {
            $($variant(&'a $payload),)*
        }

        #[derive(Deserialize)]
        #[serde(tag = "type")]
        enum Tagged {
            $($variant($payload),)*
        }

        impl MappingEntry {
            /// `None` for unknown entries.
            pub fn kind(&self) -> Option<EntryKind> {
                match self {
                    $(MappingEntry::$variant(_) => Some(EntryKind::$variant),)*
                    MappingEntry::Unknown(_) => None,
                }
            }

            /// The persisted `type` discriminator.
            pub fn type_name(&self) -> &str {
                match self {
                    $(MappingEntry::$variant(_) => stringify!($variant),)*
                    MappingEntry::Unknown(unknown) => &unknown.type_name,
                }
            }

            fn tagged(&self) -> Result<TaggedRef<'_>, &UnknownEntry> {
                match self {
                    $(MappingEntry::$variant(payload) => Ok(TaggedRef::$variant(payload)),)*
                    MappingEntry::Unknown(unknown) => Err(unknown),
                }
            }
        }

        impl From<Tagged> for MappingEntry {
            fn from(tagged: Tagged) -> Self {
                match tagged {
                    $(Tagged::$variant(payload) => MappingEntry::$variant(payload),)*
                }
            }
        }
    };
}

mapping_entries! {
    SingleTap(SingleTap),
    RepeatTap(RepeatTap),
    MultipleTap(MultipleTap),
    Swipe(Swipe),
    DirectionPad(DirectionPad),
    MouseCastSpell(MouseCastSpell),
    PadCastSpell(PadCastSpell),
    CancelCast(CancelCast),
    Observation(Aim),
    Fps(Aim),
    Fire(Aim),
    RawInput(RawInput),
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MappingEntry {
    pub fn is_unknown(&self) -> bool {
        matches!(self, MappingEntry::Unknown(_))
    }

    /// Decode one persisted entry. Unrecognised types become
    /// [`MappingEntry::Unknown`]; a missing `type` or a malformed known
    /// entry is an error.
    pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
        let type_name = match raw.get("type") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(serde_json::Error::custom("`type` must be a string"))
            }
            None => return Err(serde_json::Error::missing_field("type")),
        };

        if EntryKind::from_type_name(&type_name).is_none() {
            return Ok(MappingEntry::Unknown(UnknownEntry { type_name, raw }));
        }

        Tagged::deserialize(raw).map(Into::into)
    }
}

impl Serialize for MappingEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.tagged() {
            Ok(tagged) => tagged.serialize(serializer),
            Err(unknown) => unknown.raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MappingEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        MappingEntry::from_value(raw).map_err(D::Error::custom)
    }
}

/// `pad_bind` is persisted with a `"type": "Button"` tag like a regular
/// direction binding, but only the button form is accepted.
mod button_direction {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{DirectionBinding, DirectionButtonBinding};

    #[derive(Serialize)]
    #[serde(tag = "type")]
    enum Tagged<'a> {
        Button(&'a DirectionButtonBinding),
    }

    pub(super) fn serialize<S: Serializer>(
        binding: &DirectionButtonBinding,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Tagged::Button(binding).serialize(serializer)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DirectionButtonBinding, D::Error> {
        match DirectionBinding::deserialize(deserializer)? {
            DirectionBinding::Button(binding) => Ok(binding),
            DirectionBinding::JoyStick(_) => {
                Err(D::Error::custom("pad_bind must be a Button binding"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_known_entry_with_default_note() {
        let entry = MappingEntry::from_value(json!({
            "type": "SingleTap",
            "bind": ["KeyA"],
            "duration": 50,
            "pointer_id": 1,
            "position": {"x": 10, "y": 20},
            "sync": false
        }))
        .unwrap();

        let MappingEntry::SingleTap(tap) = &entry else {
            panic!("unexpected entry {entry:?}");
        };
        assert_eq!(tap.note, "");
        assert_eq!(tap.position, Position::new(10, 20));
        assert_eq!(entry.kind(), Some(EntryKind::SingleTap));
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = MappingEntry::from_value(json!({
            "type": "SingleTap",
            "bind": ["KeyA"],
            "duration": 50,
            "position": {"x": 10, "y": 20},
            "sync": false
        }));
        assert!(err.is_err());
    }

    #[test]
    fn missing_type_is_an_error() {
        assert!(MappingEntry::from_value(json!({"bind": []})).is_err());
        assert!(MappingEntry::from_value(json!({"type": 3})).is_err());
    }

    #[test]
    fn unknown_type_round_trips_verbatim() {
        let raw = json!({
            "type": "Script",
            "bind": ["Tab"],
            "note": "Script",
            "position": {"x": 2000, "y": 400},
            "interval": 1000
        });
        let entry = MappingEntry::from_value(raw.clone()).unwrap();
        assert!(entry.is_unknown());
        assert_eq!(entry.type_name(), "Script");
        assert_eq!(entry.kind(), None);
        assert_eq!(serde_json::to_value(&entry).unwrap(), raw);
    }

    #[test]
    fn serializes_with_type_tag() {
        let entry = MappingEntry::Fps(Aim {
            bind: ButtonBinding::new(["Backquote"]).unwrap(),
            note: "FPS".into(),
            pointer_id: 0,
            position: Position::new(1280, 720),
            sensitivity_x: 1.5,
            sensitivity_y: 1.0,
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "Fps");
        assert_eq!(value["bind"], json!(["Backquote"]));
        assert_eq!(value["position"], json!({"x": 1280, "y": 720}));
    }

    #[test]
    fn pad_bind_carries_button_tag() {
        let entry = MappingEntry::from_value(json!({
            "type": "PadCastSpell",
            "bind": ["KeyJ"],
            "block_direction_pad": true,
            "drag_radius": 150.0,
            "pad_bind": {
                "type": "Button",
                "up": ["KeyW"], "down": ["KeyS"], "left": ["KeyA"], "right": ["KeyD"]
            },
            "pointer_id": 3,
            "position": {"x": 2000, "y": 750},
            "release_mode": "OnRelease"
        }))
        .unwrap();

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["pad_bind"]["type"], "Button");
        assert_eq!(value["pad_bind"]["up"], json!(["KeyW"]));
    }

    #[test]
    fn pad_bind_rejects_joystick() {
        let err = MappingEntry::from_value(json!({
            "type": "PadCastSpell",
            "bind": ["KeyJ"],
            "block_direction_pad": true,
            "drag_radius": 150.0,
            "pad_bind": {"type": "JoyStick", "x": "LeftStickX", "y": "LeftStickY"},
            "pointer_id": 3,
            "position": {"x": 2000, "y": 750},
            "release_mode": "OnRelease"
        }));
        assert!(err.is_err());
    }

    #[test]
    fn direction_pad_accepts_both_binding_forms() {
        let joystick = MappingEntry::from_value(json!({
            "type": "DirectionPad",
            "bind": {"type": "JoyStick", "x": "LeftStickX", "y": "LeftStickY"},
            "initial_duration": 300,
            "max_offset_x": 100.0,
            "max_offset_y": 100.0,
            "pointer_id": 9,
            "position": {"x": 500, "y": 1000}
        }))
        .unwrap();
        let MappingEntry::DirectionPad(pad) = joystick else {
            panic!("expected a direction pad");
        };
        assert!(matches!(pad.bind, DirectionBinding::JoyStick(_)));
    }

    #[test]
    fn kind_names_match_type_tags() {
        for kind in EntryKind::ALL {
            assert_eq!(EntryKind::from_type_name(kind.as_str()), Some(*kind));
        }
        assert_eq!(EntryKind::ALL.len(), 12);
    }
}
