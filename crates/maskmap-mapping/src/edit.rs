//! Edit operations on mapping entries. Every operation returns a new value
//! and leaves the receiver untouched.

use maskmap_input::{BindingError, ButtonBinding};
use thiserror::Error;

use crate::entry::{
    DirectionBinding, DirectionButtonBinding, MappingEntry, MultipleTapItem,
};
use crate::geometry::Position;

/// Wait and duration of a tap appended to a `MultipleTap` sequence.
pub const APPENDED_TAP_WAIT: u64 = 50;
pub const APPENDED_TAP_DURATION: u64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("at least one point must remain (current: {len})")]
    LastPoint { len: usize },
    #[error("{0} has no point list")]
    NoPointList(String),
    #[error("point index {index} out of range (len {len})")]
    PointOutOfRange { index: usize, len: usize },
    #[error("entry index {index} out of range (len {len})")]
    EntryOutOfRange { index: usize, len: usize },
    #[error("{0} has no button binding")]
    NoButtonBinding(String),
    #[error("{0} has no direction binding")]
    NoDirectionBinding(String),
    #[error("{0} has no pointer id")]
    NoPointerId(String),
    #[error("{0} is not supported and cannot be edited")]
    Unsupported(String),
    #[error(transparent)]
    Binding(#[from] BindingError),
}

macro_rules! each_payload {
    ($entry:expr, $p:ident => $body:expr, $unknown:ident => $other:expr) => {
        match $entry {
            MappingEntry::SingleTap($p) => $body,
            MappingEntry::RepeatTap($p) => $body,
            MappingEntry::MultipleTap($p) => $body,
            MappingEntry::Swipe($p) => $body,
            MappingEntry::DirectionPad($p) => $body,
            MappingEntry::MouseCastSpell($p) => $body,
            MappingEntry::PadCastSpell($p) => $body,
            MappingEntry::CancelCast($p) => $body,
            MappingEntry::Observation($p)
            | MappingEntry::Fps($p)
            | MappingEntry::Fire($p) => $body,
            MappingEntry::RawInput($p) => $body,
            MappingEntry::Unknown($unknown) => $other,
        }
    };
}

impl MappingEntry {
    /// Button binding of every variant except `DirectionPad`.
    pub fn bind(&self) -> Option<&ButtonBinding> {
        match self {
            MappingEntry::SingleTap(e) => Some(&e.bind),
            MappingEntry::RepeatTap(e) => Some(&e.bind),
            MappingEntry::MultipleTap(e) => Some(&e.bind),
            MappingEntry::Swipe(e) => Some(&e.bind),
            MappingEntry::MouseCastSpell(e) => Some(&e.bind),
            MappingEntry::PadCastSpell(e) => Some(&e.bind),
            MappingEntry::CancelCast(e) => Some(&e.bind),
            MappingEntry::Observation(e)
            | MappingEntry::Fps(e)
            | MappingEntry::Fire(e) => Some(&e.bind),
            MappingEntry::RawInput(e) => Some(&e.bind),
            MappingEntry::DirectionPad(_) | MappingEntry::Unknown(_) => None,
        }
    }

    fn bind_mut(&mut self) -> Option<&mut ButtonBinding> {
        match self {
            MappingEntry::SingleTap(e) => Some(&mut e.bind),
            MappingEntry::RepeatTap(e) => Some(&mut e.bind),
            MappingEntry::MultipleTap(e) => Some(&mut e.bind),
            MappingEntry::Swipe(e) => Some(&mut e.bind),
            MappingEntry::MouseCastSpell(e) => Some(&mut e.bind),
            MappingEntry::PadCastSpell(e) => Some(&mut e.bind),
            MappingEntry::CancelCast(e) => Some(&mut e.bind),
            MappingEntry::Observation(e)
            | MappingEntry::Fps(e)
            | MappingEntry::Fire(e) => Some(&mut e.bind),
            MappingEntry::RawInput(e) => Some(&mut e.bind),
            MappingEntry::DirectionPad(_) | MappingEntry::Unknown(_) => None,
        }
    }

    pub fn direction_bind(&self) -> Option<&DirectionBinding> {
        match self {
            MappingEntry::DirectionPad(pad) => Some(&pad.bind),
            _ => None,
        }
    }

    pub fn note(&self) -> &str {
        each_payload!(self, e => e.note.as_str(), unknown => unknown
            .raw
            .get("note")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default())
    }

    pub fn pointer_id(&self) -> Option<u32> {
        match self {
            MappingEntry::SingleTap(e) => Some(e.pointer_id),
            MappingEntry::RepeatTap(e) => Some(e.pointer_id),
            MappingEntry::MultipleTap(e) => Some(e.pointer_id),
            MappingEntry::Swipe(e) => Some(e.pointer_id),
            MappingEntry::DirectionPad(e) => Some(e.pointer_id),
            MappingEntry::MouseCastSpell(e) => Some(e.pointer_id),
            MappingEntry::PadCastSpell(e) => Some(e.pointer_id),
            MappingEntry::Observation(e)
            | MappingEntry::Fps(e)
            | MappingEntry::Fire(e) => Some(e.pointer_id),
            MappingEntry::CancelCast(_)
            | MappingEntry::RawInput(_)
            | MappingEntry::Unknown(_) => None,
        }
    }

    /// Primary position: the marker location. For point lists this is the
    /// first point.
    pub fn position(&self) -> Option<Position> {
        match self {
            MappingEntry::MultipleTap(e) => e.items.first().map(|i| i.position),
            MappingEntry::Swipe(e) => e.positions.first().copied(),
            MappingEntry::SingleTap(e) => Some(e.position),
            MappingEntry::RepeatTap(e) => Some(e.position),
            MappingEntry::DirectionPad(e) => Some(e.position),
            MappingEntry::MouseCastSpell(e) => Some(e.position),
            MappingEntry::PadCastSpell(e) => Some(e.position),
            MappingEntry::CancelCast(e) => Some(e.position),
            MappingEntry::Observation(e)
            | MappingEntry::Fps(e)
            | MappingEntry::Fire(e) => Some(e.position),
            MappingEntry::RawInput(e) => Some(e.position),
            MappingEntry::Unknown(unknown) => unknown
                .raw
                .get("position")
                .and_then(|p| serde_json::from_value(p.clone()).ok()),
        }
    }

    pub fn has_point_list(&self) -> bool {
        matches!(self, MappingEntry::MultipleTap(_) | MappingEntry::Swipe(_))
    }

    /// Points of a list-valued entry, in order.
    pub fn points(&self) -> Option<Vec<Position>> {
        match self {
            MappingEntry::MultipleTap(e) => {
                Some(e.items.iter().map(|i| i.position).collect())
            }
            MappingEntry::Swipe(e) => Some(e.positions.clone()),
            _ => None,
        }
    }

    /// Human readable binding, `+` joined. Direction pads list their four
    /// directions or axes separated by `/`.
    pub fn binding_text(&self) -> String {
        match self {
            MappingEntry::DirectionPad(pad) => match &pad.bind {
                DirectionBinding::Button(b) => {
                    format!("{}/{}/{}/{}", b.up, b.down, b.left, b.right)
                }
                DirectionBinding::JoyStick(j) => format!("{}/{}", j.x, j.y),
            },
            other => other.bind().map(ToString::to_string).unwrap_or_default(),
        }
    }

    fn edited(
        &self,
        f: impl FnOnce(&mut Self) -> Result<(), EditError>,
    ) -> Result<Self, EditError> {
        if let MappingEntry::Unknown(unknown) = self {
            return Err(EditError::Unsupported(unknown.type_name.clone()));
        }
        let mut next = self.clone();
        f(&mut next)?;
        Ok(next)
    }

    pub fn with_bind(&self, bind: ButtonBinding) -> Result<Self, EditError> {
        self.edited(|e| {
            let name = e.type_name().to_owned();
            *e.bind_mut().ok_or(EditError::NoButtonBinding(name))? = bind;
            Ok(())
        })
    }

    pub fn with_direction_bind(
        &self,
        bind: DirectionBinding,
    ) -> Result<Self, EditError> {
        self.edited(|e| match e {
            MappingEntry::DirectionPad(pad) => {
                pad.bind = bind;
                Ok(())
            }
            other => Err(EditError::NoDirectionBinding(other.type_name().into())),
        })
    }

    /// Replace the secondary direction binding of a `PadCastSpell`.
    pub fn with_pad_bind(
        &self,
        bind: DirectionButtonBinding,
    ) -> Result<Self, EditError> {
        self.edited(|e| match e {
            MappingEntry::PadCastSpell(spell) => {
                spell.pad_bind = bind;
                Ok(())
            }
            other => Err(EditError::NoDirectionBinding(other.type_name().into())),
        })
    }

    pub fn with_note(&self, note: impl Into<String>) -> Result<Self, EditError> {
        let note = note.into();
        self.edited(|e| {
            each_payload!(e, p => p.note = note, _unknown => {});
            Ok(())
        })
    }

    pub fn with_pointer_id(&self, pointer_id: u32) -> Result<Self, EditError> {
        self.edited(|e| {
            let slot = match e {
                MappingEntry::SingleTap(p) => &mut p.pointer_id,
                MappingEntry::RepeatTap(p) => &mut p.pointer_id,
                MappingEntry::MultipleTap(p) => &mut p.pointer_id,
                MappingEntry::Swipe(p) => &mut p.pointer_id,
                MappingEntry::DirectionPad(p) => &mut p.pointer_id,
                MappingEntry::MouseCastSpell(p) => &mut p.pointer_id,
                MappingEntry::PadCastSpell(p) => &mut p.pointer_id,
                MappingEntry::Observation(p)
                | MappingEntry::Fps(p)
                | MappingEntry::Fire(p) => &mut p.pointer_id,
                other => {
                    return Err(EditError::NoPointerId(other.type_name().into()))
                }
            };
            *slot = pointer_id;
            Ok(())
        })
    }

    /// Move the marker. For point lists this moves the first point.
    pub fn with_position(&self, position: Position) -> Result<Self, EditError> {
        if self.has_point_list() {
            return self.with_point(0, position);
        }
        self.edited(|e| {
            match e {
                MappingEntry::SingleTap(p) => p.position = position,
                MappingEntry::RepeatTap(p) => p.position = position,
                MappingEntry::DirectionPad(p) => p.position = position,
                MappingEntry::MouseCastSpell(p) => p.position = position,
                MappingEntry::PadCastSpell(p) => p.position = position,
                MappingEntry::CancelCast(p) => p.position = position,
                MappingEntry::Observation(p)
                | MappingEntry::Fps(p)
                | MappingEntry::Fire(p) => p.position = position,
                MappingEntry::RawInput(p) => p.position = position,
                MappingEntry::MultipleTap(_)
                | MappingEntry::Swipe(_)
                | MappingEntry::Unknown(_) => {}
            }
            Ok(())
        })
    }

    /// Relocate the point at `index` of a list-valued entry.
    pub fn with_point(
        &self,
        index: usize,
        position: Position,
    ) -> Result<Self, EditError> {
        self.edited(|e| match e {
            MappingEntry::MultipleTap(tap) => {
                let len = tap.items.len();
                let item = tap
                    .items
                    .get_mut(index)
                    .ok_or(EditError::PointOutOfRange { index, len })?;
                item.position = position;
                Ok(())
            }
            MappingEntry::Swipe(swipe) => {
                let len = swipe.positions.len();
                let point = swipe
                    .positions
                    .get_mut(index)
                    .ok_or(EditError::PointOutOfRange { index, len })?;
                *point = position;
                Ok(())
            }
            other => Err(EditError::NoPointList(other.type_name().into())),
        })
    }

    /// Append a point. Appended taps use the default wait and duration.
    pub fn with_point_appended(
        &self,
        position: Position,
    ) -> Result<Self, EditError> {
        self.edited(|e| match e {
            MappingEntry::MultipleTap(tap) => {
                tap.items.push(MultipleTapItem {
                    duration: APPENDED_TAP_DURATION,
                    position,
                    wait: APPENDED_TAP_WAIT,
                });
                Ok(())
            }
            MappingEntry::Swipe(swipe) => {
                swipe.positions.push(position);
                Ok(())
            }
            other => Err(EditError::NoPointList(other.type_name().into())),
        })
    }

    /// Remove the point at `index`. The last remaining point cannot be
    /// removed.
    pub fn without_point(&self, index: usize) -> Result<Self, EditError> {
        self.edited(|e| {
            fn remove<T>(list: &mut Vec<T>, index: usize) -> Result<(), EditError> {
                let len = list.len();
                if index >= len {
                    return Err(EditError::PointOutOfRange { index, len });
                }
                if len <= 1 {
                    return Err(EditError::LastPoint { len });
                }
                list.remove(index);
                Ok(())
            }

            match e {
                MappingEntry::MultipleTap(tap) => remove(&mut tap.items, index),
                MappingEntry::Swipe(swipe) => remove(&mut swipe.positions, index),
                other => Err(EditError::NoPointList(other.type_name().into())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{Aim, MultipleTap, Swipe};

    fn swipe(points: &[(i32, i32)]) -> MappingEntry {
        MappingEntry::Swipe(Swipe {
            bind: ButtonBinding::new(["Digit5"]).unwrap(),
            interval: 1000,
            note: String::new(),
            pointer_id: 1,
            positions: points.iter().copied().map(Position::from).collect(),
        })
    }

    fn multiple_tap() -> MappingEntry {
        MappingEntry::MultipleTap(MultipleTap {
            bind: ButtonBinding::new(["Digit4"]).unwrap(),
            items: vec![MultipleTapItem {
                duration: 500,
                position: Position::new(100, 100),
                wait: 0,
            }],
            note: String::new(),
            pointer_id: 1,
        })
    }

    fn fire() -> MappingEntry {
        MappingEntry::Fire(Aim {
            bind: ButtonBinding::new(["M-Left"]).unwrap(),
            note: "Fire".into(),
            pointer_id: 1,
            position: Position::new(2000, 1000),
            sensitivity_x: 1.0,
            sensitivity_y: 0.5,
        })
    }

    #[test]
    fn edits_return_new_values() {
        let entry = fire();
        let moved = entry.with_position(Position::new(5, 6)).unwrap();
        assert_eq!(entry.position(), Some(Position::new(2000, 1000)));
        assert_eq!(moved.position(), Some(Position::new(5, 6)));

        let renamed = moved.with_note("shoot").unwrap();
        assert_eq!(renamed.note(), "shoot");
        assert_eq!(moved.note(), "Fire");
    }

    #[test]
    fn cannot_remove_last_point() {
        let one = swipe(&[(1, 1)]);
        assert_eq!(one.without_point(0), Err(EditError::LastPoint { len: 1 }));

        let two = swipe(&[(1, 1), (2, 2)]);
        let one_left = two.without_point(0).unwrap();
        assert_eq!(one_left.points(), Some(vec![Position::new(2, 2)]));
        assert_eq!(
            one_left.without_point(0),
            Err(EditError::LastPoint { len: 1 })
        );
    }

    #[test]
    fn cannot_remove_last_tap_of_sequence() {
        let one = multiple_tap();
        assert_eq!(one.without_point(0), Err(EditError::LastPoint { len: 1 }));

        let two = one.with_point_appended(Position::new(300, 300)).unwrap();
        let one_left = two.without_point(0).unwrap();
        assert_eq!(one_left.points(), Some(vec![Position::new(300, 300)]));
        assert_eq!(
            one_left.without_point(0),
            Err(EditError::LastPoint { len: 1 })
        );
    }

    #[test]
    fn appended_tap_uses_default_timing() {
        let tap = multiple_tap()
            .with_point_appended(Position::new(300, 300))
            .unwrap();
        let MappingEntry::MultipleTap(tap) = tap else {
            panic!("expected a multiple tap");
        };
        assert_eq!(tap.items.len(), 2);
        assert_eq!(tap.items[1].wait, 50);
        assert_eq!(tap.items[1].duration, 50);
    }

    #[test]
    fn with_position_moves_first_point_of_lists() {
        let moved = swipe(&[(1, 1), (2, 2)])
            .with_position(Position::new(9, 9))
            .unwrap();
        assert_eq!(
            moved.points(),
            Some(vec![Position::new(9, 9), Position::new(2, 2)])
        );
    }

    #[test]
    fn point_edits_require_a_point_list() {
        assert_eq!(
            fire().with_point_appended(Position::new(0, 0)),
            Err(EditError::NoPointList("Fire".into()))
        );
        assert_eq!(
            swipe(&[(1, 1)]).with_point(3, Position::new(0, 0)),
            Err(EditError::PointOutOfRange { index: 3, len: 1 })
        );
    }

    #[test]
    fn binding_edits_respect_variant_shape() {
        let bind = ButtonBinding::new(["KeyF"]).unwrap();
        let rebound = fire().with_bind(bind.clone()).unwrap();
        assert_eq!(rebound.bind(), Some(&bind));
        assert_eq!(rebound.binding_text(), "KeyF");

        assert!(matches!(
            fire().with_direction_bind(DirectionBinding::Button(
                DirectionButtonBinding::default()
            )),
            Err(EditError::NoDirectionBinding(_))
        ));
    }

    #[test]
    fn unknown_entries_are_read_only() {
        let entry = MappingEntry::from_value(serde_json::json!({
            "type": "Script",
            "note": "macro",
            "position": {"x": 4, "y": 5}
        }))
        .unwrap();
        assert_eq!(entry.note(), "macro");
        assert_eq!(entry.position(), Some(Position::new(4, 5)));
        assert_eq!(
            entry.with_note("x"),
            Err(EditError::Unsupported("Script".into()))
        );
    }
}
