//! Dismissal of the upload result overlay.
//!
//! The close "x", the close button, a click on the backdrop and Escape all
//! end in the same `hide`.

use std::rc::Rc;

use crate::dom::Element;
use crate::event::{Component, EventResponse, PageEvent, Target};
use crate::surface::{ModalId, ModalSurface};
use crate::timer::Scheduler;

pub const ESCAPE_KEY: &str = "Escape";

/// Close controls present in the markup. Missing ones are simply not wired.
#[derive(Debug, Clone, Default)]
pub struct ModalAnchors {
    pub close_x: Option<Element>,
    pub close_button: Option<Element>,
    pub overlay: Option<Element>,
}

impl ModalAnchors {
    pub fn complete() -> Self {
        Self {
            close_x: Some(Element::new()),
            close_button: Some(Element::new()),
            overlay: Some(Element::new()),
        }
    }
}

pub struct ModalDismissal {
    anchors: ModalAnchors,
    modals: Rc<dyn ModalSurface>,
    attached: bool,
}

impl ModalDismissal {
    pub fn new(anchors: ModalAnchors, modals: Rc<dyn ModalSurface>) -> Self {
        Self {
            anchors,
            modals,
            attached: false,
        }
    }

    fn dismisses(&self, event: &PageEvent) -> bool {
        match event {
            PageEvent::Click(Target::CloseX) => self.anchors.close_x.is_some(),
            PageEvent::Click(Target::ClosePopupButton) => self.anchors.close_button.is_some(),
            PageEvent::Click(Target::ModalBackdrop(ModalId::UploadResult)) => {
                self.anchors.overlay.is_some()
            }
            PageEvent::KeyDown { key } => key == ESCAPE_KEY,
            _ => false,
        }
    }
}

impl Component for ModalDismissal {
    fn name(&self) -> &'static str {
        "modal-dismissal"
    }

    // The Escape listener sits on the document, so this always attaches.
    fn init(&mut self, _timers: &mut Scheduler) -> bool {
        self.attached = true;
        true
    }

    fn handle(&mut self, event: &PageEvent, _timers: &mut Scheduler) -> EventResponse {
        if self.attached && self.dismisses(event) {
            self.modals.hide(ModalId::UploadResult);
        }
        EventResponse::IGNORED
    }

    fn dispose(&mut self, _timers: &mut Scheduler) {
        self.attached = false;
    }
}
