use std::fmt;

use ahash::AHashMap;
use maskmap_input::key_code::{is_axis_name, is_known_key_name};
use maskmap_input::ButtonBinding;

use crate::entry::{DirectionBinding, DirectionButtonBinding, MappingEntry};
use crate::geometry::Position;
use crate::MappingConfig;

/// Maximum number of entries of one kind in a profile.
pub const MAX_ENTRIES_PER_KIND: u32 = 32;

/// Every problem found in a profile, in entry order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mapping config validation failed:")?;
        for (i, problem) in self.problems.iter().enumerate() {
            write!(f, "\n{}. {problem}", i + 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Check a profile before it is activated.
pub fn validate_mapping_config(
    config: &MappingConfig,
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();
    let mut counts: AHashMap<&str, u32> = AHashMap::new();

    for entry in &config.mappings {
        let name = entry.type_name();
        let count = counts.entry(name).or_default();
        *count += 1;
        let count = *count;

        if count > MAX_ENTRIES_PER_KIND {
            problems.push(format!(
                "Mapping action '{name}' exceeds the maximum allowed count (current: {count}, max: {MAX_ENTRIES_PER_KIND})"
            ));
        }

        let mut entry_problems = Vec::new();
        check_entry(entry, &mut entry_problems);
        problems.extend(
            entry_problems
                .into_iter()
                .map(|problem| format!("[{name}-{count}] {problem}")),
        );
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { problems })
    }
}

fn check_entry(entry: &MappingEntry, problems: &mut Vec<String>) {
    match entry {
        MappingEntry::Unknown(unknown) => {
            problems.push(format!(
                "unsupported mapping type '{}'",
                unknown.type_name
            ));
            return;
        }
        MappingEntry::DirectionPad(pad) => {
            match &pad.bind {
                DirectionBinding::Button(buttons) => {
                    check_direction_buttons(buttons, problems);
                }
                DirectionBinding::JoyStick(stick) => {
                    for axis in [&stick.x, &stick.y] {
                        if !is_axis_name(axis) {
                            problems.push(format!("unknown gamepad axis '{axis}'"));
                        }
                    }
                }
            }
            check_positive("max_offset_x", pad.max_offset_x, problems);
            check_positive("max_offset_y", pad.max_offset_y, problems);
        }
        MappingEntry::MouseCastSpell(spell) => {
            check_position("center", spell.center, problems);
            check_positive("drag_radius", spell.drag_radius, problems);
            check_positive("cast_radius", spell.cast_radius, problems);
            check_positive(
                "horizontal_scale_factor",
                spell.horizontal_scale_factor,
                problems,
            );
            check_positive(
                "vertical_scale_factor",
                spell.vertical_scale_factor,
                problems,
            );
        }
        MappingEntry::PadCastSpell(spell) => {
            check_direction_buttons(&spell.pad_bind, problems);
            check_positive("drag_radius", spell.drag_radius, problems);
        }
        MappingEntry::Observation(aim)
        | MappingEntry::Fps(aim)
        | MappingEntry::Fire(aim) => {
            check_positive("sensitivity_x", aim.sensitivity_x, problems);
            check_positive("sensitivity_y", aim.sensitivity_y, problems);
        }
        MappingEntry::SingleTap(_)
        | MappingEntry::RepeatTap(_)
        | MappingEntry::MultipleTap(_)
        | MappingEntry::Swipe(_)
        | MappingEntry::CancelCast(_)
        | MappingEntry::RawInput(_) => {}
    }

    if let Some(bind) = entry.bind() {
        check_binding("bind", bind, problems);
    }

    match entry.points() {
        Some(points) if points.is_empty() => {
            problems.push("point list is empty".to_string());
        }
        Some(points) => {
            for (i, point) in points.into_iter().enumerate() {
                check_position(&format!("point {}", i + 1), point, problems);
            }
        }
        None => {
            if let Some(position) = entry.position() {
                check_position("position", position, problems);
            }
        }
    }
}

fn check_binding(field: &str, bind: &ButtonBinding, problems: &mut Vec<String>) {
    if bind.is_empty() {
        problems.push(format!("{field} is empty"));
    }
    for code in bind.iter() {
        if !is_known_key_name(code) {
            problems.push(format!("{field} contains unknown code '{code}'"));
        }
    }
}

fn check_direction_buttons(
    buttons: &DirectionButtonBinding,
    problems: &mut Vec<String>,
) {
    for (direction, bind) in buttons.iter() {
        check_binding(direction, bind, problems);
    }
}

fn check_position(field: &str, position: Position, problems: &mut Vec<String>) {
    if position.is_negative() {
        problems.push(format!(
            "{field} ({}, {}) has a negative coordinate",
            position.x, position.y
        ));
    }
}

fn check_positive(field: &str, value: f32, problems: &mut Vec<String>) {
    if !value.is_finite() || value <= 0.0 {
        problems.push(format!("{field} must be a positive number (got {value})"));
    }
}
