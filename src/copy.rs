//! Copy-to-clipboard buttons with transient feedback.

use std::rc::Rc;
use std::time::Duration;

use tracing::warn;

use crate::dom::Element;
use crate::event::{Component, EventResponse, PageEvent, Target};
use crate::surface::Clipboard;
use crate::timer::{Scheduler, Task, TimerId};

pub const COPIED_LABEL: &str = "Copied!";
pub const COPY_FAILED_LABEL: &str = "Failed";
const COPIED_CLASS: &str = "copied";

/// How long the confirmation or failure label stays up.
pub const FEEDBACK_WINDOW: Duration = Duration::from_secs(2);

/// A copy button bound to the hash it copies.
#[derive(Debug, Clone)]
pub struct CopyButton {
    pub element: Element,
    pub hash: String,
}

impl CopyButton {
    pub fn new(element: Element, hash: impl Into<String>) -> Self {
        Self {
            element,
            hash: hash.into(),
        }
    }
}

#[derive(Debug)]
struct Feedback {
    original: String,
    timer: TimerId,
}

#[derive(Debug)]
struct Control {
    button: CopyButton,
    feedback: Option<Feedback>,
}

pub struct CopyControls {
    controls: Vec<Control>,
    clipboard: Rc<dyn Clipboard>,
    attached: bool,
}

impl CopyControls {
    pub fn new(buttons: Vec<CopyButton>, clipboard: Rc<dyn Clipboard>) -> Self {
        let controls = buttons
            .into_iter()
            .map(|button| Control {
                button,
                feedback: None,
            })
            .collect();
        Self {
            controls,
            clipboard,
            attached: false,
        }
    }

    /// Copy the hash bound to control `index` and show feedback on it.
    ///
    /// Returns whether the clipboard accepted the text. A repeat activation
    /// inside the window restarts it and keeps the first captured content.
    pub fn copy(&mut self, index: usize, timers: &mut Scheduler) -> bool {
        let Some(control) = self.controls.get_mut(index) else {
            return false;
        };

        let original = match control.feedback.take() {
            Some(feedback) => {
                timers.clear(feedback.timer);
                feedback.original
            }
            None => control.button.element.content(),
        };

        let element = &control.button.element;
        let copied = match self.clipboard.write_text(&control.button.hash) {
            Ok(()) => {
                element.set_content(COPIED_LABEL);
                element.add_class(COPIED_CLASS);
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to copy hash");
                element.set_content(COPY_FAILED_LABEL);
                element.remove_class(COPIED_CLASS);
                false
            }
        };

        let timer = timers.set_timeout(FEEDBACK_WINDOW, Task::RestoreCopyControl(index));
        control.feedback = Some(Feedback { original, timer });
        copied
    }

    fn restore(&mut self, index: usize) {
        let Some(control) = self.controls.get_mut(index) else {
            return;
        };
        if let Some(feedback) = control.feedback.take() {
            control.button.element.set_content(feedback.original);
            control.button.element.remove_class(COPIED_CLASS);
        }
    }
}

impl Component for CopyControls {
    fn name(&self) -> &'static str {
        "copy-controls"
    }

    fn init(&mut self, _timers: &mut Scheduler) -> bool {
        self.attached = !self.controls.is_empty();
        self.attached
    }

    fn handle(&mut self, event: &PageEvent, timers: &mut Scheduler) -> EventResponse {
        if let (true, PageEvent::Click(Target::CopyButton(index))) = (self.attached, event) {
            self.copy(*index, timers);
        }
        EventResponse::IGNORED
    }

    fn on_timer(&mut self, task: Task, _timers: &mut Scheduler) -> bool {
        match task {
            Task::RestoreCopyControl(index) => {
                self.restore(index);
                true
            }
            _ => false,
        }
    }

    fn dispose(&mut self, timers: &mut Scheduler) {
        for index in 0..self.controls.len() {
            if let Some(feedback) = &self.controls[index].feedback {
                timers.clear(feedback.timer);
            }
            self.restore(index);
        }
        self.attached = false;
    }
}
