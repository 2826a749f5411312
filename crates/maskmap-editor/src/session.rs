use std::fmt;
use std::time::Instant;

use maskmap_input::{
    BindingRecorder, ButtonBinding, ElementId, Handled, InputEvent, InputSource,
    MouseButton, RecorderEvent, PRIMARY_BUTTON, SECONDARY_BUTTON,
};
use maskmap_mapping::geometry::to_logical;
use maskmap_mapping::{
    default_entry, DirectionBinding, DirectionButtonBinding, EditError, EntryKind,
    MappingConfig, MappingEntry, MaskViewport, Position,
};
use thiserror::Error;

use crate::drag::{DragController, DragEvent, MARKER_HOLD, POINT_HOLD};

/// Element the host reports as `target` for presses on the binding input
/// of the settings panel.
pub const BIND_INPUT: ElementId = ElementId(1);

/// What the editor is showing for the entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    SettingOpen { index: usize },
    PositionEditing { index: usize },
}

impl Mode {
    /// Entry whose settings are open, in either settings mode.
    pub fn entry(self) -> Option<usize> {
        match self {
            Mode::Normal => None,
            Mode::SettingOpen { index } | Mode::PositionEditing { index } => Some(index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn slot(self, binding: &mut DirectionButtonBinding) -> &mut ButtonBinding {
        match self {
            Direction::Up => &mut binding.up,
            Direction::Down => &mut binding.down,
            Direction::Left => &mut binding.left,
            Direction::Right => &mut binding.right,
        }
    }
}

/// Which binding of the open entry the recorder writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindSlot {
    Main,
    /// One direction of a button-bound `DirectionPad`.
    Direction(Direction),
    /// One direction of a `PadCastSpell` pad binding.
    PadDirection(Direction),
}

/// Handle being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragTarget {
    Marker(usize),
    Point { entry: usize, point: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    DragStarted(DragTarget, maskmap_mapping::ViewportPoint),
    DragMoved(DragTarget, maskmap_mapping::ViewportPoint),
    Clicked(DragTarget),
    EntryChanged(usize),
    RecordingStopped,
}

/// User-facing warnings raised while editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    KeepLastPoint,
    UnknownCode(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::KeepLastPoint => f.write_str("at least one point must be kept"),
            Notice::UnknownCode(code) => write!(f, "unknown key code: {code}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{action} is not available in {mode:?} mode")]
    InvalidMode { action: &'static str, mode: Mode },
    #[error("no entry at index {0}")]
    NoEntry(usize),
    #[error("{0} has no point list")]
    NoPointList(String),
    #[error("binding slot {slot:?} does not exist on {kind}")]
    NoBindSlot { slot: BindSlot, kind: String },
    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Editing state of one loaded mapping profile.
#[derive(Debug)]
pub struct EditorSession {
    name: String,
    original: MappingConfig,
    current: MappingConfig,
    edited: bool,
    viewport: MaskViewport,
    mode: Mode,
    drag: DragController,
    drag_target: Option<DragTarget>,
    recorder: BindingRecorder,
    bind_slot: BindSlot,
    cursor: Option<Position>,
    notices: Vec<Notice>,
}

impl EditorSession {
    pub fn new(name: impl Into<String>, config: MappingConfig) -> Self {
        Self {
            name: name.into(),
            current: config.clone(),
            original: config,
            edited: false,
            viewport: MaskViewport::default(),
            mode: Mode::Normal,
            drag: DragController::default(),
            drag_target: None,
            recorder: BindingRecorder::new(BIND_INPUT),
            bind_slot: BindSlot::Main,
            cursor: None,
            notices: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &MappingConfig {
        &self.current
    }

    /// The profile as it was loaded or last saved.
    pub fn original(&self) -> &MappingConfig {
        &self.original
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn viewport(&self) -> MaskViewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: MaskViewport) {
        self.viewport = viewport;
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_target.is_some()
    }

    /// Logical position under the pointer, kept for the cursor readout.
    pub fn track_cursor(&mut self, client_x: f64, client_y: f64) -> Position {
        let position = to_logical(
            client_x,
            client_y,
            &self.viewport,
            self.current.original_size,
        );
        self.cursor = Some(position);
        position
    }

    pub fn cursor_position(&self) -> Option<Position> {
        self.cursor
    }

    /// Drain warnings raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Record that the current profile was written out.
    pub fn mark_saved(&mut self) {
        self.original = self.current.clone();
        self.edited = false;
    }

    /// Drop every unsaved change and return to normal mode.
    pub fn revert(&mut self, source: &mut dyn InputSource) {
        self.stop_interactions(source);
        self.mode = Mode::Normal;
        self.current = self.original.clone();
        self.edited = false;
    }

    fn stop_interactions(&mut self, source: &mut dyn InputSource) {
        self.drag.cancel(source);
        self.drag_target = None;
        self.recorder.stop(source);
    }

    fn entry(&self, index: usize) -> Result<&MappingEntry, SessionError> {
        self.current.entry(index).ok_or(SessionError::NoEntry(index))
    }

    fn commit(&mut self, index: usize, entry: MappingEntry) -> Result<(), SessionError> {
        self.current = self.current.replace_entry(index, entry)?;
        self.edited = true;
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidMode {
            action,
            mode: self.mode,
        }
    }

    /// Press on an entry marker in normal mode. Holding it drags the marker.
    #[allow(clippy::too_many_arguments)]
    pub fn press_marker(
        &mut self,
        source: &mut dyn InputSource,
        index: usize,
        button: MouseButton,
        client_x: f64,
        client_y: f64,
        now: Instant,
    ) -> Result<bool, SessionError> {
        if self.mode != Mode::Normal {
            return Err(self.invalid("marker press"));
        }
        self.entry(index)?;

        self.drag.set_hold(MARKER_HOLD);
        let pressed = self.drag.press(
            source,
            button,
            client_x,
            client_y,
            self.viewport,
            self.current.original_size,
            now,
        );
        self.drag_target = pressed.then_some(DragTarget::Marker(index));
        Ok(pressed)
    }

    pub fn open_settings(
        &mut self,
        source: &mut dyn InputSource,
        index: usize,
    ) -> Result<(), SessionError> {
        if self.mode != Mode::Normal {
            return Err(self.invalid("open settings"));
        }
        self.entry(index)?;
        self.stop_interactions(source);
        self.mode = Mode::SettingOpen { index };
        Ok(())
    }

    /// Close the settings panel. Position editing only steps back to the
    /// panel of its entry; a second call closes that.
    pub fn close_settings(&mut self, source: &mut dyn InputSource) {
        if let Mode::PositionEditing { index } = self.mode {
            self.drag.cancel(source);
            self.drag_target = None;
            self.mode = Mode::SettingOpen { index };
            return;
        }
        self.stop_interactions(source);
        self.mode = Mode::Normal;
    }

    pub fn enter_position_editing(
        &mut self,
        source: &mut dyn InputSource,
    ) -> Result<(), SessionError> {
        let Mode::SettingOpen { index } = self.mode else {
            return Err(self.invalid("position editing"));
        };
        let entry = self.entry(index)?;
        if !entry.has_point_list() {
            return Err(SessionError::NoPointList(entry.type_name().to_string()));
        }
        self.stop_interactions(source);
        self.mode = Mode::PositionEditing { index };
        Ok(())
    }

    pub fn exit_position_editing(
        &mut self,
        source: &mut dyn InputSource,
    ) -> Result<(), SessionError> {
        let Mode::PositionEditing { index } = self.mode else {
            return Err(self.invalid("exit position editing"));
        };
        self.drag.cancel(source);
        self.drag_target = None;
        self.mode = Mode::SettingOpen { index };
        Ok(())
    }

    /// Press on the empty editor background while editing positions.
    /// A secondary press appends a point there; the new point index is
    /// returned.
    pub fn press_background(
        &mut self,
        button: MouseButton,
        client_x: f64,
        client_y: f64,
    ) -> Result<Option<usize>, SessionError> {
        let Mode::PositionEditing { index } = self.mode else {
            return Err(self.invalid("background press"));
        };
        if button != SECONDARY_BUTTON {
            return Ok(None);
        }

        let position = to_logical(
            client_x,
            client_y,
            &self.viewport,
            self.current.original_size,
        );
        let entry = self.entry(index)?.with_point_appended(position)?;
        let point = entry.points().map_or(0, |p| p.len().saturating_sub(1));
        self.commit(index, entry)?;
        Ok(Some(point))
    }

    /// Press on a point handle while editing positions.
    #[allow(clippy::too_many_arguments)]
    pub fn press_point(
        &mut self,
        source: &mut dyn InputSource,
        point: usize,
        button: MouseButton,
        client_x: f64,
        client_y: f64,
        now: Instant,
    ) -> Result<bool, SessionError> {
        let Mode::PositionEditing { index } = self.mode else {
            return Err(self.invalid("point press"));
        };
        let len = self.entry(index)?.points().map_or(0, |p| p.len());
        if point >= len {
            return Err(EditError::PointOutOfRange { index: point, len }.into());
        }

        self.drag.set_hold(POINT_HOLD);
        let pressed = self.drag.press(
            source,
            button,
            client_x,
            client_y,
            self.viewport,
            self.current.original_size,
            now,
        );
        self.drag_target = pressed.then_some(DragTarget::Point {
            entry: index,
            point,
        });
        Ok(pressed)
    }

    /// Delete a point of the entry being edited. Removing the last point
    /// raises [`Notice::KeepLastPoint`] and leaves the entry unchanged.
    pub fn delete_point(&mut self, point: usize) -> Result<bool, SessionError> {
        let Mode::PositionEditing { index } = self.mode else {
            return Err(self.invalid("delete point"));
        };
        let result = self.entry(index)?.without_point(point);
        match result {
            Ok(entry) => {
                self.commit(index, entry)?;
                Ok(true)
            }
            Err(EditError::LastPoint { .. }) => {
                log::warn!("refusing to delete the last point of entry {index}");
                self.notices.push(Notice::KeepLastPoint);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Start recording into a binding of the open entry.
    pub fn start_recording(
        &mut self,
        source: &mut dyn InputSource,
        slot: BindSlot,
    ) -> Result<(), SessionError> {
        let Mode::SettingOpen { index } = self.mode else {
            return Err(self.invalid("binding recording"));
        };
        let entry = self.entry(index)?;
        let supported = match slot {
            BindSlot::Main => entry.bind().is_some(),
            BindSlot::Direction(_) => matches!(
                entry.direction_bind(),
                Some(DirectionBinding::Button(_))
            ),
            BindSlot::PadDirection(_) => matches!(entry, MappingEntry::PadCastSpell(_)),
        };
        if !supported {
            return Err(SessionError::NoBindSlot {
                slot,
                kind: entry.type_name().to_string(),
            });
        }

        self.recorder.stop(source);
        self.bind_slot = slot;
        self.recorder.start(source);
        Ok(())
    }

    pub fn stop_recording(&mut self, source: &mut dyn InputSource) {
        self.recorder.stop(source);
    }

    /// Apply an edit to the entry whose settings are open.
    pub fn edit_open_entry(
        &mut self,
        edit: impl FnOnce(&MappingEntry) -> Result<MappingEntry, EditError>,
    ) -> Result<(), SessionError> {
        let Some(index) = self.mode.entry() else {
            return Err(self.invalid("entry edit"));
        };
        let entry = edit(self.entry(index)?)?;
        self.commit(index, entry)
    }

    pub fn update_entry(
        &mut self,
        index: usize,
        entry: MappingEntry,
    ) -> Result<(), SessionError> {
        self.commit(index, entry)
    }

    /// Delete an entry. Settings of any entry are closed since indexes
    /// shift.
    pub fn delete_entry(
        &mut self,
        source: &mut dyn InputSource,
        index: usize,
    ) -> Result<(), SessionError> {
        self.current = self.current.delete_entry(index)?;
        self.edited = true;
        if self.mode != Mode::Normal || self.drag_target.is_some() {
            self.stop_interactions(source);
            self.mode = Mode::Normal;
        }
        Ok(())
    }

    /// Add a fresh entry of `kind` under the pointer. Returns its index.
    pub fn append_entry(&mut self, kind: EntryKind, client_x: f64, client_y: f64) -> usize {
        let original = self.current.original_size;
        let position = to_logical(client_x, client_y, &self.viewport, original);
        self.current = self
            .current
            .append_entry(default_entry(kind, position, original));
        self.edited = true;
        self.current.len() - 1
    }

    /// Route a global input event to the active recorder and drag. Timers
    /// already due at `now` fire first and their events lead the result.
    pub fn handle_event(
        &mut self,
        source: &mut dyn InputSource,
        event: &InputEvent,
        now: Instant,
    ) -> Handled<SessionEvent> {
        let fired = self.tick(now);

        if let InputEvent::MouseMove { x, y } = event {
            self.track_cursor(*x, *y);
        }

        let recorded = self.recorder.handle(source, event, now);
        let dragged = self.drag.handle(source, event, now);
        let suppress_default = recorded.suppress_default || dragged.suppress_default;

        let mut events = fired;
        for e in recorded.events {
            events.extend(self.apply_recorder_event(e));
        }
        for e in dragged.events {
            events.extend(self.apply_drag_event(e));
        }
        Handled {
            suppress_default,
            events,
        }
    }

    /// Fire due timers.
    pub fn tick(&mut self, now: Instant) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if let Some(e) = self.recorder.tick(now) {
            events.extend(self.apply_recorder_event(e));
        }
        if let Some(e) = self.drag.tick(now) {
            events.extend(self.apply_drag_event(e));
        }
        events
    }

    /// Earliest pending timer.
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.recorder.next_deadline(), self.drag.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn apply_recorder_event(&mut self, event: RecorderEvent) -> Option<SessionEvent> {
        match event {
            RecorderEvent::Changed(binding) => {
                let index = self.mode.entry()?;
                match self.write_binding(index, binding) {
                    Ok(()) => Some(SessionEvent::EntryChanged(index)),
                    Err(e) => {
                        log::warn!("recorded binding not applied: {e}");
                        None
                    }
                }
            }
            RecorderEvent::Stopped => Some(SessionEvent::RecordingStopped),
            RecorderEvent::UnknownCode(code) => {
                self.notices.push(Notice::UnknownCode(code));
                None
            }
        }
    }

    fn write_binding(
        &mut self,
        index: usize,
        binding: ButtonBinding,
    ) -> Result<(), SessionError> {
        let entry = self.entry(index)?;
        let next = match self.bind_slot {
            BindSlot::Main => entry.with_bind(binding)?,
            BindSlot::Direction(direction) => {
                let Some(DirectionBinding::Button(buttons)) = entry.direction_bind() else {
                    return Err(EditError::NoDirectionBinding(entry.type_name().into()).into());
                };
                let mut buttons = buttons.clone();
                *direction.slot(&mut buttons) = binding;
                entry.with_direction_bind(DirectionBinding::Button(buttons))?
            }
            BindSlot::PadDirection(direction) => {
                let MappingEntry::PadCastSpell(spell) = entry else {
                    return Err(EditError::NoDirectionBinding(entry.type_name().into()).into());
                };
                let mut buttons = spell.pad_bind.clone();
                *direction.slot(&mut buttons) = binding;
                entry.with_pad_bind(buttons)?
            }
        };
        self.commit(index, next)
    }

    fn apply_drag_event(&mut self, event: DragEvent) -> Option<SessionEvent> {
        let target = self.drag_target?;
        match event {
            DragEvent::Started(point) => Some(SessionEvent::DragStarted(target, point)),
            DragEvent::Moved(point) => Some(SessionEvent::DragMoved(target, point)),
            DragEvent::Click => {
                self.drag_target = None;
                Some(SessionEvent::Clicked(target))
            }
            DragEvent::Committed(position) => {
                self.drag_target = None;
                let result = match target {
                    DragTarget::Marker(index) => self
                        .entry(index)
                        .and_then(|e| Ok(e.with_position(position)?))
                        .and_then(|e| self.commit(index, e))
                        .map(|()| index),
                    DragTarget::Point { entry, point } => self
                        .entry(entry)
                        .and_then(|e| Ok(e.with_point(point, position)?))
                        .and_then(|e| self.commit(entry, e))
                        .map(|()| entry),
                };
                match result {
                    Ok(index) => Some(SessionEvent::EntryChanged(index)),
                    Err(e) => {
                        log::warn!("drag result not applied: {e}");
                        None
                    }
                }
            }
        }
    }
}
