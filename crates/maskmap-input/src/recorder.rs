use std::time::{Duration, Instant};

use crate::binding::ButtonBinding;
use crate::event::{ElementId, EventKind, EventMask, Handled, InputEvent, PRIMARY_BUTTON};
use crate::key_code::{key_name_for_code, mouse_button_name, wheel_name};
use crate::source::{InputSource, ListenerId};
use crate::timer::Timer;

/// Wheel events closer together than this collapse into one.
pub const WHEEL_DEBOUNCE: Duration = Duration::from_millis(50);

const RECORDER_EVENTS: EventMask = EventMask::new(&[
    EventKind::KeyDown,
    EventKind::KeyUp,
    EventKind::MouseDown,
    EventKind::MouseUp,
    EventKind::Wheel,
    EventKind::Blur,
    EventKind::ContextMenu,
]);

#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// Snapshot of every code held right now. Replaces the stored binding.
    Changed(ButtonBinding),
    /// Recording ended because of a primary press outside the input.
    Stopped,
    /// A key code with no symbolic name was pressed and dropped.
    UnknownCode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Captures a binding from the combination of inputs held at once.
#[derive(Debug)]
pub struct BindingRecorder {
    input: ElementId,
    listener: Option<ListenerId>,
    pressed: ButtonBinding,
    wheel: Timer<f64>,
}

impl BindingRecorder {
    /// `input` is the element showing the binding; primary presses on it
    /// are recorded instead of ending the session.
    pub fn new(input: ElementId) -> Self {
        Self {
            input,
            listener: None,
            pressed: ButtonBinding::empty(),
            wheel: Timer::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        if self.listener.is_some() {
            RecorderState::Recording
        } else {
            RecorderState::Idle
        }
    }

    pub fn is_recording(&self) -> bool {
        self.listener.is_some()
    }

    /// Currently held codes.
    pub fn pressed(&self) -> &ButtonBinding {
        &self.pressed
    }

    pub fn start(&mut self, source: &mut dyn InputSource) {
        if self.listener.is_some() {
            return;
        }
        self.pressed.clear();
        self.listener = Some(source.listen(RECORDER_EVENTS));
        log::debug!("binding recording started");
    }

    pub fn stop(&mut self, source: &mut dyn InputSource) {
        self.wheel.cancel();
        self.pressed.clear();
        if let Some(id) = self.listener.take() {
            source.unlisten(id);
            log::debug!("binding recording stopped");
        }
    }

    /// Feed one event. A wheel press that was already due at `now` is
    /// reported before the event itself.
    pub fn handle(
        &mut self,
        source: &mut dyn InputSource,
        event: &InputEvent,
        now: Instant,
    ) -> Handled<RecorderEvent> {
        if self.listener.is_none() {
            return Handled::ignored();
        }
        let fired = self.tick(now);
        self.route(source, event, now).after(fired)
    }

    fn route(
        &mut self,
        source: &mut dyn InputSource,
        event: &InputEvent,
        now: Instant,
    ) -> Handled<RecorderEvent> {
        match event {
            InputEvent::KeyDown { code } => {
                let Some(name) = key_name_for_code(code) else {
                    log::warn!("unknown key code: {code}");
                    return Handled::suppressed(Some(RecorderEvent::UnknownCode(
                        code.clone(),
                    )));
                };
                if self.pressed.insert(name) {
                    Handled::suppressed(Some(self.snapshot()))
                } else {
                    Handled::suppressed(None)
                }
            }
            InputEvent::KeyUp { code } => {
                if let Some(name) = key_name_for_code(code) {
                    self.pressed.remove(name);
                }
                Handled::suppressed(None)
            }
            InputEvent::MouseDown { button, target, .. } => {
                if *button == PRIMARY_BUTTON && *target != Some(self.input) {
                    self.stop(source);
                    return Handled::passed(Some(RecorderEvent::Stopped));
                }
                self.pressed.insert(&mouse_button_name(*button));
                Handled::suppressed(Some(self.snapshot()))
            }
            InputEvent::MouseUp { button, .. } => {
                self.pressed.remove(&mouse_button_name(*button));
                Handled::suppressed(None)
            }
            InputEvent::Wheel { delta_y } => {
                if *delta_y != 0.0 {
                    self.wheel.schedule(now, WHEEL_DEBOUNCE, *delta_y);
                }
                Handled::suppressed(None)
            }
            InputEvent::Blur => {
                self.pressed.clear();
                Handled::ignored()
            }
            InputEvent::ContextMenu { .. } => Handled::suppressed(None),
            InputEvent::MouseMove { .. } => Handled::ignored(),
        }
    }

    /// Fire the debounced wheel press if due.
    pub fn tick(&mut self, now: Instant) -> Option<RecorderEvent> {
        let delta_y = self.wheel.fire_due(now)?;
        let name = wheel_name(delta_y)?;
        // Wheel has no release: report it held, then drop it.
        self.pressed.insert(name);
        let event = self.snapshot();
        self.pressed.remove(name);
        Some(event)
    }

    /// When the pending wheel press will fire, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.wheel.due_at()
    }

    fn snapshot(&self) -> RecorderEvent {
        RecorderEvent::Changed(self.pressed.clone())
    }
}
