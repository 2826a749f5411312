//! Raw input plumbing for the mapping editor: events, listener
//! registration, cancellable timers, symbolic key names and the binding
//! recorder.

mod binding;
mod event;
pub mod key_code;
mod recorder;
mod source;
mod timer;

pub use binding::{BindingError, ButtonBinding};
pub use event::{
    ElementId, EventKind, EventMask, Handled, InputEvent, MouseButton, PRIMARY_BUTTON,
    SECONDARY_BUTTON,
};
pub use recorder::{BindingRecorder, RecorderEvent, RecorderState, WHEEL_DEBOUNCE};
pub use source::{EventHub, InputSource, ListenerId};
pub use timer::Timer;
