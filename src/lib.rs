//! Client for an IPFS-backed file drop.
//!
//! A [`Page`] hosts the components a browser page would run: the session
//! watchdog, file selection, the upload lifecycle, fetch-by-hash and the copy
//! buttons. Host capabilities come in through [`Services`], the two HTTP
//! endpoints through [`Backend`].

pub mod backend;
pub mod cid;
pub mod config;
pub mod copy;
pub mod dom;
pub mod event;
pub mod lookup;
pub mod modal;
pub mod page;
pub mod selection;
pub mod size;
pub mod surface;
pub mod terminal;
pub mod timer;
pub mod upload;
pub mod watchdog;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

#[cfg(test)]
mod test_utils;

pub use backend::{Backend, BackendError, HttpBackend, SessionStatus, UploadReceipt, UploadReply};
pub use cid::{Cid, CidVersion, is_valid_cid};
pub use config::Config;
pub use dom::{Element, FileInput, UploadForm};
pub use event::{Component, EventResponse, PageEvent, Target};
pub use page::{Page, PageAnchors, PageOptions};
pub use selection::{FileRef, MAX_UPLOAD_BYTES};
pub use size::format_size;
pub use surface::{Clipboard, Modal, ModalId, ModalSurface, Navigator, Notifier, Services};
pub use upload::{UploadOutcome, UploadState};

pub const APP_NAME: &str = "cloudsend";
