//! Upload lifecycle: Idle → Submitting → (Succeeded | Failed) → Idle.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::backend::{UploadReceipt, UploadReply};
use crate::dom::{Element, UploadForm};
use crate::event::{Component, EventResponse, PageEvent};
use crate::surface::{Modal, Services};
use crate::timer::{Scheduler, Task, TimerId};

pub const IDLE_LABEL: &str = "Upload to IPFS";
pub const BUSY_LABEL: &str = "Uploading...";
const LOADING_CLASS: &str = "loading";

pub const DEFAULT_SUCCESS_MESSAGE: &str = "Your file has been uploaded to IPFS";
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error occurred";

/// Delay between a successful upload and the page reload.
pub const RELOAD_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Succeeded { ipfs_hash: String },
    Failed { message: String },
}

/// Puts the trigger in its busy look and restores it on every exit path,
/// unwinding included.
struct BusyGuard {
    trigger: Element,
    state: Rc<Cell<UploadState>>,
}

impl BusyGuard {
    fn engage(trigger: &Element, state: &Rc<Cell<UploadState>>) -> Self {
        trigger.set_enabled(false);
        trigger.set_content(BUSY_LABEL);
        trigger.add_class(LOADING_CLASS);
        state.set(UploadState::Submitting);
        Self {
            trigger: trigger.clone(),
            state: state.clone(),
        }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.trigger.set_enabled(true);
        self.trigger.set_content(IDLE_LABEL);
        self.trigger.remove_class(LOADING_CLASS);
        self.state.set(UploadState::Idle);
    }
}

pub struct UploadController {
    form: Option<UploadForm>,
    services: Services,
    state: Rc<Cell<UploadState>>,
    last_outcome: Option<UploadOutcome>,
    reload_timer: Option<TimerId>,
    attached: bool,
}

impl UploadController {
    pub fn new(form: Option<UploadForm>, services: Services) -> Self {
        Self {
            form,
            services,
            state: Rc::new(Cell::new(UploadState::Idle)),
            last_outcome: None,
            reload_timer: None,
            attached: false,
        }
    }

    pub fn state(&self) -> UploadState {
        self.state.get()
    }

    pub fn last_outcome(&self) -> Option<&UploadOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn reload_pending(&self, timers: &Scheduler) -> bool {
        self.reload_timer.is_some_and(|id| timers.is_pending(id))
    }

    /// Run one upload attempt for the form's pending file.
    ///
    /// Returns `None` when nothing was sent: detached, trigger disabled, or
    /// no file selected.
    pub fn submit(&mut self, timers: &mut Scheduler) -> Option<UploadOutcome> {
        let form = self.form.clone().filter(|_| self.attached)?;
        if !form.trigger.is_enabled() {
            debug!("submit ignored while an upload is in flight");
            return None;
        }
        let Some(file) = form.file_input.file() else {
            self.services
                .notifier
                .notify("No file selected", "Please select a file to upload");
            return None;
        };

        let _busy = BusyGuard::engage(&form.trigger, &self.state);
        let outcome = match self.services.backend.upload(&file) {
            Ok(UploadReply::Accepted(receipt)) => self.succeed(&form, receipt, timers),
            Ok(UploadReply::Rejected { status, message }) => {
                debug!(status, "upload rejected by server");
                self.fail(message.unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string()))
            }
            Err(err) => {
                warn!(error = %err, "upload request failed");
                self.fail(NETWORK_ERROR_MESSAGE.to_string())
            }
        };
        self.last_outcome = Some(outcome.clone());
        Some(outcome)
    }

    fn succeed(
        &mut self,
        form: &UploadForm,
        receipt: UploadReceipt,
        timers: &mut Scheduler,
    ) -> UploadOutcome {
        self.state.set(UploadState::Succeeded);
        info!(ipfs_hash = %receipt.ipfs_hash, "upload stored");
        let ipfs_hash = receipt.ipfs_hash;
        self.services.modals.show(Modal::UploadSucceeded {
            message: receipt
                .message
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string()),
            ipfs_hash: ipfs_hash.clone(),
        });
        form.reset();
        if let Some(previous) = self.reload_timer.take() {
            timers.clear(previous);
        }
        self.reload_timer = Some(timers.set_timeout(RELOAD_DELAY, Task::ReloadPage));
        UploadOutcome::Succeeded { ipfs_hash }
    }

    fn fail(&mut self, message: String) -> UploadOutcome {
        self.state.set(UploadState::Failed);
        self.services.modals.show(Modal::UploadFailed {
            message: message.clone(),
        });
        UploadOutcome::Failed { message }
    }
}

impl Component for UploadController {
    fn name(&self) -> &'static str {
        "upload"
    }

    fn init(&mut self, _timers: &mut Scheduler) -> bool {
        self.attached = self.form.is_some();
        self.attached
    }

    fn handle(&mut self, event: &PageEvent, timers: &mut Scheduler) -> EventResponse {
        if !self.attached || *event != PageEvent::Submit {
            return EventResponse::IGNORED;
        }
        self.submit(timers);
        EventResponse::prevent_default()
    }

    fn on_timer(&mut self, task: Task, _timers: &mut Scheduler) -> bool {
        if task != Task::ReloadPage {
            return false;
        }
        self.reload_timer = None;
        self.services.navigator.reload();
        true
    }

    fn dispose(&mut self, timers: &mut Scheduler) {
        if let Some(id) = self.reload_timer.take() {
            timers.clear(id);
        }
        self.attached = false;
    }
}
