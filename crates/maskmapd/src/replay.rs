//! Scripted editing sessions driven on virtual time.

use std::time::{Duration, Instant};

use maskmap_editor::{BindSlot, Direction, EditorSession, Notice, SessionError, SessionEvent};
use maskmap_input::{EventHub, InputEvent, MouseButton, PRIMARY_BUTTON};
use maskmap_mapping::{EntryKind, MaskViewport};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("invalid replay script: {0}")]
    Script(#[from] serde_json::Error),
    #[error("step {step}: steps must be ordered by time")]
    OutOfOrder { step: usize },
    #[error("step {step}: unknown entry kind {kind:?}")]
    UnknownKind { step: usize, kind: String },
    #[error("step {step}: {source}")]
    Step { step: usize, source: SessionError },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Main,
    Up,
    Down,
    Left,
    Right,
    PadUp,
    PadDown,
    PadLeft,
    PadRight,
}

impl From<Slot> for BindSlot {
    fn from(slot: Slot) -> Self {
        match slot {
            Slot::Main => BindSlot::Main,
            Slot::Up => BindSlot::Direction(Direction::Up),
            Slot::Down => BindSlot::Direction(Direction::Down),
            Slot::Left => BindSlot::Direction(Direction::Left),
            Slot::Right => BindSlot::Direction(Direction::Right),
            Slot::PadUp => BindSlot::PadDirection(Direction::Up),
            Slot::PadDown => BindSlot::PadDirection(Direction::Down),
            Slot::PadLeft => BindSlot::PadDirection(Direction::Left),
            Slot::PadRight => BindSlot::PadDirection(Direction::Right),
        }
    }
}

fn primary() -> MouseButton {
    PRIMARY_BUTTON
}

/// One user action. Pointer coordinates are client pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    SetViewport {
        viewport: MaskViewport,
    },
    PressMarker {
        index: usize,
        #[serde(default = "primary")]
        button: MouseButton,
        x: f64,
        y: f64,
    },
    OpenSettings {
        index: usize,
    },
    CloseSettings,
    EnterPositionEditing,
    ExitPositionEditing,
    PressBackground {
        button: MouseButton,
        x: f64,
        y: f64,
    },
    PressPoint {
        point: usize,
        #[serde(default = "primary")]
        button: MouseButton,
        x: f64,
        y: f64,
    },
    DeletePoint {
        point: usize,
    },
    StartRecording {
        #[serde(default = "default_slot")]
        slot: Slot,
    },
    StopRecording,
    SetNote {
        note: String,
    },
    SetPointerId {
        pointer_id: u32,
    },
    AppendEntry {
        kind: String,
        x: f64,
        y: f64,
    },
    DeleteEntry {
        index: usize,
    },
    Revert,
    /// Raw global input event.
    Input {
        event: InputEvent,
    },
    /// Only advance the clock.
    Wait,
}

fn default_slot() -> Slot {
    Slot::Main
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the replay.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub viewport: Option<MaskViewport>,
    pub steps: Vec<Step>,
}

impl ReplayScript {
    pub fn parse(input: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(input)?)
    }
}

#[derive(Debug, Default)]
pub struct ReplayReport {
    pub events: Vec<SessionEvent>,
    pub notices: Vec<Notice>,
}

/// Runs a script against a session with its own input hub and clock.
pub struct Replayer {
    hub: EventHub,
    start: Instant,
    now: Instant,
}

impl Default for Replayer {
    fn default() -> Self {
        Self::new()
    }
}

impl Replayer {
    pub fn new() -> Self {
        let start = Instant::now();
        Self {
            hub: EventHub::new(),
            start,
            now: start,
        }
    }

    /// Listeners still registered after the run.
    pub fn listener_count(&self) -> usize {
        self.hub.listener_count()
    }

    fn advance(&mut self, session: &mut EditorSession, to: Instant, report: &mut ReplayReport) {
        while let Some(deadline) = session.next_deadline() {
            if deadline > to {
                break;
            }
            self.now = deadline;
            report.events.extend(session.tick(deadline));
        }
        self.now = to;
    }

    pub fn run(
        &mut self,
        session: &mut EditorSession,
        script: &ReplayScript,
    ) -> Result<ReplayReport, ReplayError> {
        let mut report = ReplayReport::default();
        if let Some(viewport) = script.viewport {
            session.set_viewport(viewport);
        }

        let mut last = 0;
        for (step, Step { at_ms, action }) in script.steps.iter().enumerate() {
            if *at_ms < last {
                return Err(ReplayError::OutOfOrder { step });
            }
            last = *at_ms;
            self.advance(session, self.start + Duration::from_millis(*at_ms), &mut report);
            log::debug!("step {step} at {at_ms}ms: {action:?}");
            self.apply(session, step, action, &mut report)?;
            report.notices.extend(session.take_notices());
        }
        Ok(report)
    }

    fn apply(
        &mut self,
        session: &mut EditorSession,
        step: usize,
        action: &Action,
        report: &mut ReplayReport,
    ) -> Result<(), ReplayError> {
        let hub = &mut self.hub;
        let now = self.now;
        let result = match action {
            Action::SetViewport { viewport } => {
                session.set_viewport(*viewport);
                Ok(())
            }
            Action::PressMarker { index, button, x, y } => session
                .press_marker(hub, *index, *button, *x, *y, now)
                .map(drop),
            Action::OpenSettings { index } => session.open_settings(hub, *index),
            Action::CloseSettings => {
                session.close_settings(hub);
                Ok(())
            }
            Action::EnterPositionEditing => session.enter_position_editing(hub),
            Action::ExitPositionEditing => session.exit_position_editing(hub),
            Action::PressBackground { button, x, y } => {
                session.press_background(*button, *x, *y).map(drop)
            }
            Action::PressPoint { point, button, x, y } => session
                .press_point(hub, *point, *button, *x, *y, now)
                .map(drop),
            Action::DeletePoint { point } => session.delete_point(*point).map(drop),
            Action::StartRecording { slot } => {
                session.start_recording(hub, (*slot).into())
            }
            Action::StopRecording => {
                session.stop_recording(hub);
                Ok(())
            }
            Action::SetNote { note } => session.edit_open_entry(|e| e.with_note(note.clone())),
            Action::SetPointerId { pointer_id } => {
                session.edit_open_entry(|e| e.with_pointer_id(*pointer_id))
            }
            Action::AppendEntry { kind, x, y } => {
                let Some(kind) = EntryKind::from_type_name(kind) else {
                    return Err(ReplayError::UnknownKind {
                        step,
                        kind: kind.clone(),
                    });
                };
                session.append_entry(kind, *x, *y);
                Ok(())
            }
            Action::DeleteEntry { index } => session.delete_entry(hub, *index),
            Action::Revert => {
                session.revert(hub);
                Ok(())
            }
            Action::Input { event } => {
                let handled = session.handle_event(hub, event, now);
                report.events.extend(handled.events);
                Ok(())
            }
            Action::Wait => Ok(()),
        };
        result.map_err(|source| ReplayError::Step { step, source })
    }
}

#[cfg(test)]
mod tests {
    use maskmap_mapping::{default_entry, MappingConfig, Position, Size};

    use super::*;

    fn swipe_session() -> EditorSession {
        let original = Size::new(2000, 1000);
        let config = MappingConfig::new("t", original).append_entry(default_entry(
            EntryKind::Swipe,
            Position::new(100, 100),
            original,
        ));
        EditorSession::new("t.json", config)
    }

    #[test]
    fn replays_point_editing_on_virtual_time() {
        let script = ReplayScript::parse(
            r#"{
                "viewport": {"width": 1000, "height": 500, "left": 0, "top": 0},
                "steps": [
                    {"at_ms": 0, "action": "open_settings", "index": 0},
                    {"at_ms": 0, "action": "enter_position_editing"},
                    {"at_ms": 10, "action": "press_background", "button": 2, "x": 300, "y": 200},
                    {"at_ms": 20, "action": "press_point", "point": 1, "x": 300, "y": 200},
                    {"at_ms": 200, "action": "input", "event": {"kind": "mouse_up", "button": 0, "x": 400, "y": 250}},
                    {"at_ms": 210, "action": "delete_point", "point": 0},
                    {"at_ms": 220, "action": "delete_point", "point": 0}
                ]
            }"#,
        )
        .unwrap();

        let mut session = swipe_session();
        let mut replayer = Replayer::new();
        let report = replayer.run(&mut session, &script).unwrap();

        assert_eq!(
            session.config().mappings[0].points(),
            Some(vec![Position::new(800, 500)])
        );
        assert_eq!(report.notices, vec![Notice::KeepLastPoint]);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, SessionEvent::DragStarted(..))));
        assert_eq!(replayer.listener_count(), 0);
    }

    #[test]
    fn rejects_unordered_steps() {
        let script = ReplayScript::parse(
            r#"{"steps": [{"at_ms": 5, "action": "wait"}, {"at_ms": 1, "action": "wait"}]}"#,
        )
        .unwrap();
        let err = Replayer::new().run(&mut swipe_session(), &script);
        assert!(matches!(err, Err(ReplayError::OutOfOrder { step: 1 })));
    }

    #[test]
    fn reports_failing_step() {
        let script = ReplayScript::parse(
            r#"{"steps": [{"at_ms": 0, "action": "enter_position_editing"}]}"#,
        )
        .unwrap();
        let err = Replayer::new().run(&mut swipe_session(), &script);
        assert!(matches!(err, Err(ReplayError::Step { step: 0, .. })));
    }
}
