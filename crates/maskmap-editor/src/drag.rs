use std::time::{Duration, Instant};

use maskmap_input::{
    EventKind, EventMask, Handled, InputEvent, InputSource, ListenerId, MouseButton,
    Timer, PRIMARY_BUTTON,
};
use maskmap_mapping::geometry::{clamp_to_viewport, viewport_to_logical};
use maskmap_mapping::{MaskViewport, Position, Size, ViewportPoint};

/// Hold time before a marker press turns into a drag.
pub const MARKER_HOLD: Duration = Duration::from_millis(500);
/// Hold time for points in the position editor.
pub const POINT_HOLD: Duration = Duration::from_millis(100);

const DRAG_EVENTS: EventMask = EventMask::new(&[EventKind::MouseMove, EventKind::MouseUp]);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragEvent {
    /// The hold elapsed; the marker should follow the pointer from here.
    Started(ViewportPoint),
    Moved(ViewportPoint),
    /// Released after dragging, in logical space. Emitted once per press.
    Committed(Position),
    /// Released before the hold elapsed.
    Click,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// Pressed, waiting for the hold timer.
    Pending,
    Dragging,
}

#[derive(Debug)]
struct Press {
    listener: ListenerId,
    viewport: MaskViewport,
    original: Size,
    point: ViewportPoint,
    active: bool,
}

/// Press-and-hold drag of one on-screen handle.
#[derive(Debug)]
pub struct DragController {
    hold: Duration,
    timer: Timer<()>,
    press: Option<Press>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(MARKER_HOLD)
    }
}

impl DragController {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            timer: Timer::new(),
            press: None,
        }
    }

    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub fn set_hold(&mut self, hold: Duration) {
        self.hold = hold;
    }

    pub fn state(&self) -> DragState {
        match &self.press {
            None => DragState::Idle,
            Some(press) if press.active => DragState::Dragging,
            Some(_) => DragState::Pending,
        }
    }

    /// Latest clamped pointer position of the current press.
    pub fn point(&self) -> Option<ViewportPoint> {
        self.press.as_ref().map(|p| p.point)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.due_at()
    }

    /// Begin a press. Only the primary button starts one; an unfinished
    /// previous press is cancelled first. Returns whether a press began.
    #[allow(clippy::too_many_arguments)]
    pub fn press(
        &mut self,
        source: &mut dyn InputSource,
        button: MouseButton,
        client_x: f64,
        client_y: f64,
        viewport: MaskViewport,
        original: Size,
        now: Instant,
    ) -> bool {
        if button != PRIMARY_BUTTON {
            return false;
        }
        self.cancel(source);

        let listener = source.listen(DRAG_EVENTS);
        self.press = Some(Press {
            listener,
            viewport,
            original,
            point: clamp_to_viewport(client_x, client_y, &viewport),
            active: false,
        });
        self.timer.schedule(now, self.hold, ());
        true
    }

    /// Fire the hold timer if due.
    pub fn tick(&mut self, now: Instant) -> Option<DragEvent> {
        self.timer.fire_due(now)?;
        let press = self.press.as_mut()?;
        press.active = true;
        log::trace!("drag started at {:?}", press.point);
        Some(DragEvent::Started(press.point))
    }

    /// Feed one pointer event. A hold that elapsed before `now` starts the
    /// drag first, so a late release still commits.
    pub fn handle(
        &mut self,
        source: &mut dyn InputSource,
        event: &InputEvent,
        now: Instant,
    ) -> Handled<DragEvent> {
        if self.press.is_none() {
            return Handled::ignored();
        }
        let fired = self.tick(now);
        self.route(source, event).after(fired)
    }

    fn route(
        &mut self,
        source: &mut dyn InputSource,
        event: &InputEvent,
    ) -> Handled<DragEvent> {
        let Some(press) = self.press.as_mut() else {
            return Handled::ignored();
        };

        match event {
            InputEvent::MouseMove { x, y } => {
                press.point = clamp_to_viewport(*x, *y, &press.viewport);
                if press.active {
                    Handled::passed(Some(DragEvent::Moved(press.point)))
                } else {
                    Handled::ignored()
                }
            }
            InputEvent::MouseUp { x, y, .. } => {
                press.point = clamp_to_viewport(*x, *y, &press.viewport);
                let event = if press.active {
                    DragEvent::Committed(viewport_to_logical(
                        press.point,
                        &press.viewport,
                        press.original,
                    ))
                } else {
                    DragEvent::Click
                };
                self.cancel(source);
                Handled::passed(Some(event))
            }
            _ => Handled::ignored(),
        }
    }

    /// Abandon the current press without emitting anything.
    pub fn cancel(&mut self, source: &mut dyn InputSource) {
        self.timer.cancel();
        if let Some(press) = self.press.take() {
            source.unlisten(press.listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use maskmap_input::{EventHub, SECONDARY_BUTTON};

    use super::*;

    const VIEWPORT: MaskViewport = MaskViewport::new(1000.0, 500.0, 0.0, 0.0);
    const ORIGINAL: Size = Size::new(2000, 1000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn mouse_move(x: f64, y: f64) -> InputEvent {
        InputEvent::MouseMove { x, y }
    }

    fn mouse_up(x: f64, y: f64) -> InputEvent {
        InputEvent::MouseUp {
            button: PRIMARY_BUTTON,
            x,
            y,
        }
    }

    #[test]
    fn release_after_hold_commits_logical_position() {
        let mut hub = EventHub::new();
        let mut drag = DragController::default();
        let t0 = Instant::now();

        assert!(drag.press(&mut hub, PRIMARY_BUTTON, 100.0, 100.0, VIEWPORT, ORIGINAL, t0));
        assert_eq!(drag.tick(t0 + ms(499)), None);
        assert_eq!(
            drag.tick(t0 + ms(600)),
            Some(DragEvent::Started(ViewportPoint::new(100.0, 100.0)))
        );
        assert_eq!(
            drag.handle(&mut hub, &mouse_move(250.0, 150.0), t0 + ms(650)).events,
            [DragEvent::Moved(ViewportPoint::new(250.0, 150.0))]
        );
        assert_eq!(
            drag.handle(&mut hub, &mouse_up(300.0, 200.0), t0 + ms(700)).events,
            [DragEvent::Committed(Position::new(600, 400))]
        );
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn late_release_without_tick_commits() {
        let mut hub = EventHub::new();
        let mut drag = DragController::default();
        let t0 = Instant::now();

        drag.press(&mut hub, PRIMARY_BUTTON, 100.0, 100.0, VIEWPORT, ORIGINAL, t0);
        let out = drag.handle(&mut hub, &mouse_up(300.0, 200.0), t0 + ms(800));
        assert_eq!(
            out.events,
            [
                DragEvent::Started(ViewportPoint::new(100.0, 100.0)),
                DragEvent::Committed(Position::new(600, 400)),
            ]
        );
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn late_move_without_tick_starts_then_moves() {
        let mut hub = EventHub::new();
        let mut drag = DragController::new(POINT_HOLD);
        let t0 = Instant::now();

        drag.press(&mut hub, PRIMARY_BUTTON, 10.0, 10.0, VIEWPORT, ORIGINAL, t0);
        let out = drag.handle(&mut hub, &mouse_move(20.0, 30.0), t0 + ms(150));
        assert_eq!(
            out.events,
            [
                DragEvent::Started(ViewportPoint::new(10.0, 10.0)),
                DragEvent::Moved(ViewportPoint::new(20.0, 30.0)),
            ]
        );
        assert_eq!(drag.state(), DragState::Dragging);
    }

    #[test]
    fn quick_release_is_a_click() {
        let mut hub = EventHub::new();
        let mut drag = DragController::default();
        let t0 = Instant::now();

        drag.press(&mut hub, PRIMARY_BUTTON, 10.0, 10.0, VIEWPORT, ORIGINAL, t0);
        let moved = drag.handle(&mut hub, &mouse_move(50.0, 50.0), t0 + ms(100));
        assert!(moved.events.is_empty());
        assert_eq!(
            drag.handle(&mut hub, &mouse_up(50.0, 50.0), t0 + ms(499)).events,
            [DragEvent::Click]
        );
        assert_eq!(drag.tick(t0 + ms(1000)), None);
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn moves_before_hold_are_tracked_silently() {
        let mut hub = EventHub::new();
        let mut drag = DragController::new(POINT_HOLD);
        let t0 = Instant::now();

        drag.press(&mut hub, PRIMARY_BUTTON, 10.0, 10.0, VIEWPORT, ORIGINAL, t0);
        drag.handle(&mut hub, &mouse_move(2000.0, -40.0), t0 + ms(50));
        assert_eq!(
            drag.tick(t0 + ms(100)),
            Some(DragEvent::Started(ViewportPoint::new(1000.0, 0.0)))
        );
    }

    #[test]
    fn secondary_button_does_not_press() {
        let mut hub = EventHub::new();
        let mut drag = DragController::default();
        assert!(!drag.press(
            &mut hub,
            SECONDARY_BUTTON,
            1.0,
            1.0,
            VIEWPORT,
            ORIGINAL,
            Instant::now()
        ));
        assert_eq!(hub.listener_count(), 0);
    }

    #[test]
    fn cancel_drops_listeners_and_timer() {
        let mut hub = EventHub::new();
        let mut drag = DragController::default();
        let t0 = Instant::now();

        drag.press(&mut hub, PRIMARY_BUTTON, 1.0, 1.0, VIEWPORT, ORIGINAL, t0);
        drag.cancel(&mut hub);
        assert_eq!(hub.listener_count(), 0);
        assert_eq!(drag.tick(t0 + ms(1000)), None);
        assert_eq!(
            drag.handle(&mut hub, &mouse_up(1.0, 1.0), t0 + ms(1000)),
            Handled::ignored()
        );
    }

    #[test]
    fn second_press_replaces_first() {
        let mut hub = EventHub::new();
        let mut drag = DragController::default();
        let t0 = Instant::now();

        drag.press(&mut hub, PRIMARY_BUTTON, 1.0, 1.0, VIEWPORT, ORIGINAL, t0);
        drag.press(&mut hub, PRIMARY_BUTTON, 2.0, 2.0, VIEWPORT, ORIGINAL, t0 + ms(10));
        assert_eq!(hub.listener_count(), 1);
        assert_eq!(drag.tick(t0 + ms(500)), None);
        assert!(drag.tick(t0 + ms(510)).is_some());
    }
}
