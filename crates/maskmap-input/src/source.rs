use crate::event::{EventKind, EventMask};

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Capability to subscribe to global input events.
///
/// Interaction primitives receive this instead of registering ambient
/// window-level listeners, so hosts and tests decide where events come from.
pub trait InputSource {
    /// Register interest in the given event kinds.
    fn listen(&mut self, kinds: EventMask) -> ListenerId;
    /// Drop a registration. Unknown ids are ignored.
    fn unlisten(&mut self, id: ListenerId);
}

/// In-process listener registry.
#[derive(Debug, Default)]
pub struct EventHub {
    next_id: u64,
    listeners: Vec<(ListenerId, EventMask)>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_listening(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|(l, _)| *l == id)
    }

    /// Whether anyone is registered for `kind`.
    pub fn wants(&self, kind: EventKind) -> bool {
        self.listeners.iter().any(|(_, mask)| mask.contains(kind))
    }
}

impl InputSource for EventHub {
    fn listen(&mut self, kinds: EventMask) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.push((id, kinds));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }
}
