//! Page events and the component contract.

use crate::selection::FileRef;
use crate::surface::ModalId;
use crate::timer::{Scheduler, Task};

/// Elements that can be the target of a click or key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    UploadButton,
    ViewFileButton,
    HashInput,
    CopyButton(usize),
    CloseX,
    ClosePopupButton,
    /// The overlay itself, outside its content box.
    ModalBackdrop(ModalId),
    ModalContent(ModalId),
    DropZone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// `persisted` is set when the page came back from the back/forward cache.
    PageShow { persisted: bool },
    /// The file picker's selection changed; the new value is in the form's `FileInput`.
    FileInputChanged,
    DragEnter,
    DragOver,
    DragLeave,
    Drop { files: Vec<FileRef> },
    Submit,
    Click(Target),
    KeyPress { target: Target, key: String },
    /// Document-level key press.
    KeyDown { key: String },
}

impl PageEvent {
    pub fn key_press(target: Target, key: &str) -> Self {
        PageEvent::KeyPress {
            target,
            key: key.to_string(),
        }
    }

    pub fn key_down(key: &str) -> Self {
        PageEvent::KeyDown {
            key: key.to_string(),
        }
    }
}

/// What the handlers asked the host to do with the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl EventResponse {
    pub const IGNORED: EventResponse = EventResponse {
        default_prevented: false,
        propagation_stopped: false,
    };

    pub fn prevent_default() -> Self {
        EventResponse {
            default_prevented: true,
            propagation_stopped: false,
        }
    }

    /// Both `preventDefault` and `stopPropagation`.
    pub fn consume() -> Self {
        EventResponse {
            default_prevented: true,
            propagation_stopped: true,
        }
    }

    pub fn merge(self, other: EventResponse) -> Self {
        EventResponse {
            default_prevented: self.default_prevented || other.default_prevented,
            propagation_stopped: self.propagation_stopped || other.propagation_stopped,
        }
    }
}

/// A unit of page behavior attached to its anchors on page ready.
pub trait Component {
    fn name(&self) -> &'static str;

    /// Attach to anchors and start listening. Returns false when the anchors
    /// are absent, in which case the component stays inert.
    fn init(&mut self, timers: &mut Scheduler) -> bool;

    fn handle(&mut self, event: &PageEvent, timers: &mut Scheduler) -> EventResponse;

    /// A timer scheduled by this component fired. Returns false if the task
    /// belongs to someone else.
    fn on_timer(&mut self, _task: Task, _timers: &mut Scheduler) -> bool {
        false
    }

    /// Detach and cancel any pending timers.
    fn dispose(&mut self, timers: &mut Scheduler);
}
