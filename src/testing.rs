//! Recording doubles for the host capabilities.
//!
//! Available behind the `test-util` feature or in `#[cfg(test)]`. Every double
//! records what it was asked to do so tests can assert on it afterwards.

use std::cell::{Cell, RefCell};
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use crate::backend::{Backend, BackendError, SessionStatus, UploadReceipt, UploadReply};
use crate::dom::Element;
use crate::selection::FileRef;
use crate::surface::{
    Clipboard, ClipboardError, Modal, ModalId, ModalSurface, Navigator, Notifier, Services,
};

/// Initialise a tracing subscriber for tests. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
pub struct RecordingModals {
    visible: RefCell<HashSet<ModalId>>,
    shown: RefCell<Vec<Modal>>,
    hides: Cell<usize>,
    panic_on_show: Cell<bool>,
}

impl RecordingModals {
    pub fn is_visible(&self, id: ModalId) -> bool {
        self.visible.borrow().contains(&id)
    }

    pub fn shown(&self) -> Vec<Modal> {
        self.shown.borrow().clone()
    }

    pub fn last_shown(&self) -> Option<Modal> {
        self.shown.borrow().last().cloned()
    }

    pub fn hides(&self) -> usize {
        self.hides.get()
    }

    /// Make the next `show` calls panic, to exercise unwinding cleanup.
    pub fn panic_on_show(&self) {
        self.panic_on_show.set(true);
    }
}

impl ModalSurface for RecordingModals {
    fn show(&self, modal: Modal) {
        if self.panic_on_show.get() {
            panic!("modal surface failed to render {:?}", modal.id());
        }
        self.visible.borrow_mut().insert(modal.id());
        self.shown.borrow_mut().push(modal);
    }

    fn hide(&self, id: ModalId) {
        self.hides.set(self.hides.get() + 1);
        self.visible.borrow_mut().remove(&id);
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notes: RefCell<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn notes(&self) -> Vec<(String, String)> {
        self.notes.borrow().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notes.borrow().iter().map(|(t, _)| t.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.notes
            .borrow_mut()
            .push((title.to_string(), message.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Navigate(String),
    Reload,
    OpenNewContext(String),
}

#[derive(Default)]
pub struct RecordingNavigator {
    log: RefCell<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn log(&self) -> Vec<Navigation> {
        self.log.borrow().clone()
    }

    pub fn reloads(&self) -> usize {
        self.log
            .borrow()
            .iter()
            .filter(|n| **n == Navigation::Reload)
            .count()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.log
            .borrow_mut()
            .push(Navigation::Navigate(path.to_string()));
    }

    fn reload(&self) {
        self.log.borrow_mut().push(Navigation::Reload);
    }

    fn open_new_context(&self, path: &str) {
        self.log
            .borrow_mut()
            .push(Navigation::OpenNewContext(path.to_string()));
    }
}

#[derive(Default)]
pub struct ScriptedClipboard {
    writes: RefCell<Vec<String>>,
    deny: Cell<bool>,
}

impl ScriptedClipboard {
    pub fn deny(&self, deny: bool) {
        self.deny.set(deny);
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }
}

impl Clipboard for ScriptedClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.deny.get() {
            return Err(ClipboardError::Denied("permission refused".into()));
        }
        self.writes.borrow_mut().push(text.to_string());
        Ok(())
    }
}

pub enum ScriptedSession {
    Authenticated(bool),
    Error(BackendError),
}

pub enum ScriptedUpload {
    Accepted {
        message: Option<String>,
        ipfs_hash: String,
    },
    Rejected {
        status: u16,
        message: Option<String>,
    },
    Error(BackendError),
}

/// Backend answering from queued scripts. An empty session queue answers
/// "authenticated", an empty upload queue answers with a transport error.
#[derive(Default)]
pub struct ScriptedBackend {
    sessions: RefCell<VecDeque<ScriptedSession>>,
    uploads: RefCell<VecDeque<ScriptedUpload>>,
    session_calls: Cell<usize>,
    uploaded: RefCell<Vec<FileRef>>,
    watched_trigger: RefCell<Option<Element>>,
    trigger_seen: RefCell<Option<(bool, String, bool)>>,
}

impl ScriptedBackend {
    pub fn script_session(&self, reply: ScriptedSession) {
        self.sessions.borrow_mut().push_back(reply);
    }

    pub fn script_upload(&self, reply: ScriptedUpload) {
        self.uploads.borrow_mut().push_back(reply);
    }

    pub fn session_calls(&self) -> usize {
        self.session_calls.get()
    }

    pub fn upload_calls(&self) -> usize {
        self.uploaded.borrow().len()
    }

    pub fn uploaded(&self) -> Vec<FileRef> {
        self.uploaded.borrow().clone()
    }

    /// Record the trigger's (enabled, content, loading) while a request is in flight.
    pub fn watch_trigger(&self, trigger: Element) {
        *self.watched_trigger.borrow_mut() = Some(trigger);
    }

    pub fn trigger_during_upload(&self) -> Option<(bool, String, bool)> {
        self.trigger_seen.borrow().clone()
    }
}

impl Backend for ScriptedBackend {
    fn session_status(&self) -> Result<SessionStatus, BackendError> {
        self.session_calls.set(self.session_calls.get() + 1);
        match self.sessions.borrow_mut().pop_front() {
            None | Some(ScriptedSession::Authenticated(true)) => {
                Ok(SessionStatus { authenticated: true })
            }
            Some(ScriptedSession::Authenticated(false)) => Ok(SessionStatus {
                authenticated: false,
            }),
            Some(ScriptedSession::Error(err)) => Err(err),
        }
    }

    fn upload(&self, file: &FileRef) -> Result<UploadReply, BackendError> {
        self.uploaded.borrow_mut().push(file.clone());
        if let Some(trigger) = self.watched_trigger.borrow().as_ref() {
            *self.trigger_seen.borrow_mut() = Some((
                trigger.is_enabled(),
                trigger.content(),
                trigger.has_class("loading"),
            ));
        }
        match self.uploads.borrow_mut().pop_front() {
            Some(ScriptedUpload::Accepted { message, ipfs_hash }) => {
                Ok(UploadReply::Accepted(UploadReceipt { message, ipfs_hash }))
            }
            Some(ScriptedUpload::Rejected { status, message }) => {
                Ok(UploadReply::Rejected { status, message })
            }
            Some(ScriptedUpload::Error(err)) => Err(err),
            None => Err(BackendError::Transport("no scripted upload reply".into())),
        }
    }
}

/// One of each double, shareable as [`Services`].
pub struct Doubles {
    pub backend: Rc<ScriptedBackend>,
    pub modals: Rc<RecordingModals>,
    pub notifier: Rc<RecordingNotifier>,
    pub navigator: Rc<RecordingNavigator>,
    pub clipboard: Rc<ScriptedClipboard>,
}

impl Doubles {
    pub fn new() -> Self {
        Self {
            backend: Rc::default(),
            modals: Rc::default(),
            notifier: Rc::default(),
            navigator: Rc::default(),
            clipboard: Rc::default(),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            backend: self.backend.clone(),
            modals: self.modals.clone(),
            notifier: self.notifier.clone(),
            navigator: self.navigator.clone(),
            clipboard: self.clipboard.clone(),
        }
    }
}

impl Default for Doubles {
    fn default() -> Self {
        Self::new()
    }
}
