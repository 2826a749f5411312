use serde::{Deserialize, Serialize};

/// Mouse button index as reported by the platform (0 = primary).
pub type MouseButton = u16;

/// Primary (usually left) mouse button.
pub const PRIMARY_BUTTON: MouseButton = 0;
/// Secondary (usually right) mouse button.
pub const SECONDARY_BUTTON: MouseButton = 2;

/// Opaque identifier of an on-screen element a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Raw platform input event. Pointer coordinates are client pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    KeyDown {
        code: String,
    },
    KeyUp {
        code: String,
    },
    MouseDown {
        button: MouseButton,
        x: f64,
        y: f64,
        #[serde(default)]
        target: Option<ElementId>,
    },
    MouseUp {
        button: MouseButton,
        x: f64,
        y: f64,
    },
    MouseMove {
        x: f64,
        y: f64,
    },
    Wheel {
        delta_y: f64,
    },
    Blur,
    ContextMenu {
        x: f64,
        y: f64,
    },
}

impl InputEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            InputEvent::KeyDown { .. } => EventKind::KeyDown,
            InputEvent::KeyUp { .. } => EventKind::KeyUp,
            InputEvent::MouseDown { .. } => EventKind::MouseDown,
            InputEvent::MouseUp { .. } => EventKind::MouseUp,
            InputEvent::MouseMove { .. } => EventKind::MouseMove,
            InputEvent::Wheel { .. } => EventKind::Wheel,
            InputEvent::Blur => EventKind::Blur,
            InputEvent::ContextMenu { .. } => EventKind::ContextMenu,
        }
    }
}

/// Kind of an input event, used for listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    KeyDown = 0,
    KeyUp = 1,
    MouseDown = 2,
    MouseUp = 3,
    MouseMove = 4,
    Wheel = 5,
    Blur = 6,
    ContextMenu = 7,
}

impl EventKind {
    #[inline]
    const fn bit(self) -> u16 {
        1u16 << (self as u16)
    }
}

/// Set of event kinds a listener is interested in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EventMask(u16);

impl EventMask {
    /// Create a mask from a slice of kinds.
    pub const fn new(kinds: &[EventKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Create an empty mask.
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub fn contains(&self, kind: EventKind) -> bool {
        (self.0 & kind.bit()) != 0
    }

    #[inline]
    pub fn insert(&mut self, kind: EventKind) {
        self.0 |= kind.bit();
    }

    #[inline]
    pub fn remove(&mut self, kind: EventKind) {
        self.0 &= !kind.bit();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Result of feeding an event to an interaction primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct Handled<E> {
    /// The platform default action (context menu, scrolling, text input)
    /// must be suppressed.
    pub suppress_default: bool,
    /// Emissions in the order they happened. Timers that were already due
    /// when the event arrived come first.
    pub events: Vec<E>,
}

impl<E> Handled<E> {
    pub fn ignored() -> Self {
        Self {
            suppress_default: false,
            events: Vec::new(),
        }
    }

    pub fn suppressed(event: Option<E>) -> Self {
        Self {
            suppress_default: true,
            events: event.into_iter().collect(),
        }
    }

    pub fn passed(event: Option<E>) -> Self {
        Self {
            suppress_default: false,
            events: event.into_iter().collect(),
        }
    }

    /// Put emissions of timers that fired before the event in front.
    #[must_use]
    pub fn after(mut self, fired: impl IntoIterator<Item = E>) -> Self {
        let mut events: Vec<E> = fired.into_iter().collect();
        events.append(&mut self.events);
        self.events = events;
        self
    }

    /// The most recent emission.
    pub fn last(&self) -> Option<&E> {
        self.events.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fired_emissions_come_first() {
        let handled = Handled::suppressed(Some(2)).after(Some(1));
        assert_eq!(handled.events, [1, 2]);
        assert_eq!(handled.last(), Some(&2));
        assert!(handled.suppress_default);
        assert!(Handled::<u8>::ignored().after(None).events.is_empty());
    }

    #[test]
    fn mask_tracks_inserted_kinds() {
        let mut mask = EventMask::new(&[EventKind::KeyDown, EventKind::Wheel]);
        assert!(mask.contains(EventKind::KeyDown));
        assert!(mask.contains(EventKind::Wheel));
        assert!(!mask.contains(EventKind::Blur));

        mask.remove(EventKind::KeyDown);
        mask.insert(EventKind::Blur);
        assert!(!mask.contains(EventKind::KeyDown));
        assert!(mask.contains(EventKind::Blur));
    }

    #[test]
    fn empty_mask_contains_nothing() {
        let mask = EventMask::empty();
        assert!(mask.is_empty());
        assert!(!mask.contains(EventKind::MouseMove));
    }

    #[test]
    fn event_deserializes_from_tagged_json() {
        let raw = r#"{"kind":"mouse_down","button":2,"x":10.5,"y":4}"#;
        let event: InputEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(
            event,
            InputEvent::MouseDown {
                button: SECONDARY_BUTTON,
                x: 10.5,
                y: 4.0,
                target: None
            }
        );
        assert_eq!(event.kind(), EventKind::MouseDown);
    }
}
