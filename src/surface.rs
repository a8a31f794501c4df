//! Host capabilities injected into components: modal overlay, blocking
//! notifications, navigation and the clipboard.

use std::rc::Rc;

use thiserror::Error;

use crate::backend::Backend;

pub const UPLOAD_SUCCEEDED_TITLE: &str = "Upload Successful!";
pub const UPLOAD_FAILED_TITLE: &str = "Upload Failed";
pub const SESSION_EXPIRED_TITLE: &str = "Session Expired";
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Redirecting to login...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalId {
    UploadResult,
    SessionExpired,
}

/// Visual variant of the overlay icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
    Warning,
}

/// Content of a modal overlay at the time it is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    UploadSucceeded { message: String, ipfs_hash: String },
    UploadFailed { message: String },
    SessionExpired,
}

impl Modal {
    pub fn id(&self) -> ModalId {
        match self {
            Modal::UploadSucceeded { .. } | Modal::UploadFailed { .. } => ModalId::UploadResult,
            Modal::SessionExpired => ModalId::SessionExpired,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Modal::UploadSucceeded { .. } => UPLOAD_SUCCEEDED_TITLE,
            Modal::UploadFailed { .. } => UPLOAD_FAILED_TITLE,
            Modal::SessionExpired => SESSION_EXPIRED_TITLE,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Modal::UploadSucceeded { message, .. } | Modal::UploadFailed { message } => message,
            Modal::SessionExpired => SESSION_EXPIRED_MESSAGE,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Modal::UploadSucceeded { .. } => Tone::Success,
            Modal::UploadFailed { .. } => Tone::Error,
            Modal::SessionExpired => Tone::Warning,
        }
    }
}

/// Named overlays toggled visible and hidden.
pub trait ModalSurface {
    fn show(&self, modal: Modal);
    fn hide(&self, id: ModalId);
}

/// Blocking title + message presentation (an `alert`).
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

/// Page-level navigation. Paths are relative to the service root.
pub trait Navigator {
    fn navigate(&self, path: &str);
    fn reload(&self);
    fn open_new_context(&self, path: &str);
}

#[derive(Debug, Clone, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write denied: {0}")]
    Denied(String),
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Everything a page's components need from the host.
#[derive(Clone)]
pub struct Services {
    pub backend: Rc<dyn Backend>,
    pub modals: Rc<dyn ModalSurface>,
    pub notifier: Rc<dyn Notifier>,
    pub navigator: Rc<dyn Navigator>,
    pub clipboard: Rc<dyn Clipboard>,
}
