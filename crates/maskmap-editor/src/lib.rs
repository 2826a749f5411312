//! Interaction layer of the mapping editor: press-and-hold dragging and
//! the per-profile editing session.

mod drag;
mod session;

pub use drag::{DragController, DragEvent, DragState, MARKER_HOLD, POINT_HOLD};
pub use session::{
    BindSlot, Direction, DragTarget, EditorSession, Mode, Notice, SessionError,
    SessionEvent, BIND_INPUT,
};
