//! The page: components, their anchors and the timer queue driving them.

use std::time::Duration;

use tracing::{debug, info};

use crate::copy::{CopyButton, CopyControls};
use crate::dom::UploadForm;
use crate::event::{Component, EventResponse, PageEvent};
use crate::lookup::{HashLookup, LookupAnchors};
use crate::modal::{ModalAnchors, ModalDismissal};
use crate::selection::FileSelection;
use crate::surface::Services;
use crate::timer::Scheduler;
use crate::upload::UploadController;
use crate::watchdog::{POLL_INTERVAL, SessionWatchdog};

/// Elements present in the markup. Absent sections leave their component
/// detached.
#[derive(Debug, Clone, Default)]
pub struct PageAnchors {
    pub upload: Option<UploadForm>,
    pub lookup: Option<LookupAnchors>,
    pub copy_buttons: Vec<CopyButton>,
    pub modal: ModalAnchors,
}

#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub poll_interval: Duration,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }
}

struct Mounted {
    component: Box<dyn Component>,
    attached: bool,
}

pub struct Page {
    timers: Scheduler,
    components: Vec<Mounted>,
    ready: bool,
}

impl Page {
    /// A page with the standard component set wired to `anchors`.
    pub fn new(anchors: PageAnchors, services: Services, options: PageOptions) -> Self {
        let mut page = Self::empty();
        page.mount(SessionWatchdog::with_period(
            services.clone(),
            options.poll_interval,
        ));
        page.mount(FileSelection::new(
            anchors.upload.clone(),
            services.notifier.clone(),
        ));
        page.mount(UploadController::new(anchors.upload, services.clone()));
        page.mount(HashLookup::new(
            anchors.lookup,
            services.notifier.clone(),
            services.navigator.clone(),
        ));
        page.mount(CopyControls::new(
            anchors.copy_buttons,
            services.clipboard.clone(),
        ));
        page.mount(ModalDismissal::new(anchors.modal, services.modals));
        page
    }

    pub fn empty() -> Self {
        Self {
            timers: Scheduler::new(),
            components: Vec::new(),
            ready: false,
        }
    }

    pub fn mount(&mut self, component: impl Component + 'static) {
        self.components.push(Mounted {
            component: Box::new(component),
            attached: false,
        });
    }

    /// DOM ready: attach every component. Runs once.
    pub fn ready(&mut self) {
        if self.ready {
            return;
        }
        self.ready = true;
        for mounted in &mut self.components {
            mounted.attached = mounted.component.init(&mut self.timers);
            debug!(
                component = mounted.component.name(),
                attached = mounted.attached,
                "component init"
            );
        }
        info!(
            attached = self.attached().len(),
            "cloudsend page initialized"
        );
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Names of the components that found their anchors.
    pub fn attached(&self) -> Vec<&'static str> {
        self.components
            .iter()
            .filter(|m| m.attached)
            .map(|m| m.component.name())
            .collect()
    }

    /// Deliver an event to every attached component in mount order.
    pub fn dispatch(&mut self, event: &PageEvent) -> EventResponse {
        let mut response = EventResponse::IGNORED;
        for mounted in self.components.iter_mut().filter(|m| m.attached) {
            response = response.merge(mounted.component.handle(event, &mut self.timers));
        }
        response
    }

    /// Move virtual time forward by `by`, firing every timer that falls due.
    pub fn advance(&mut self, by: Duration) {
        let target = self.timers.now() + by;
        while let Some((id, task)) = self.timers.pop_due(target) {
            let handled = self
                .components
                .iter_mut()
                .filter(|m| m.attached)
                .any(|m| m.component.on_timer(task, &mut self.timers));
            if !handled {
                debug!(?id, ?task, "timer fired with no owner");
            }
        }
        self.timers.advance_to(target);
    }

    pub fn now(&self) -> Duration {
        self.timers.now()
    }

    /// Time until the next timer is due, if any is pending.
    pub fn until_next_timer(&self) -> Option<Duration> {
        self.timers.until_next()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Detach everything and cancel every timer the components own.
    pub fn dispose(&mut self) {
        for mounted in self.components.iter_mut().filter(|m| m.attached) {
            mounted.component.dispose(&mut self.timers);
            mounted.attached = false;
        }
        self.ready = false;
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        if self.ready {
            self.dispose();
        }
    }
}
