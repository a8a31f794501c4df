//! File selection: size ceiling, label rendering and the drop zone.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use crate::dom::UploadForm;
use crate::event::{Component, EventResponse, PageEvent};
use crate::size::format_size;
use crate::surface::Notifier;
use crate::timer::Scheduler;

/// Largest file accepted for upload: 100 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

const DRAG_OVER_CLASS: &str = "drag-over";

/// A file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    pub path: PathBuf,
}

impl FileRef {
    pub fn new(name: impl Into<String>, size: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }

    /// Describe a file on disk by its name and current length.
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", path.display()))?;
        Ok(Self::new(name, metadata.len(), path))
    }

    /// `"<name> (<human size>)"`
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, format_size(self.size))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("file is {size} bytes, above the {limit} byte limit", limit = MAX_UPLOAD_BYTES)]
    TooLarge { size: u64 },
}

impl SelectionError {
    pub fn title(&self) -> &'static str {
        match self {
            SelectionError::TooLarge { .. } => "File too large",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            SelectionError::TooLarge { .. } => "Maximum file size is 100MB",
        }
    }
}

pub fn check_size(file: &FileRef) -> Result<(), SelectionError> {
    if file.size > MAX_UPLOAD_BYTES {
        return Err(SelectionError::TooLarge { size: file.size });
    }
    Ok(())
}

/// Validates picked or dropped files and reflects them in the form label.
pub struct FileSelection {
    form: Option<UploadForm>,
    notifier: Rc<dyn Notifier>,
    attached: bool,
}

impl FileSelection {
    pub fn new(form: Option<UploadForm>, notifier: Rc<dyn Notifier>) -> Self {
        Self {
            form,
            notifier,
            attached: false,
        }
    }

    /// Apply a candidate file. `None` clears the label.
    ///
    /// An oversized file clears both the pending selection and the label and
    /// raises a notification.
    pub fn select(&self, file: Option<&FileRef>) -> Result<(), SelectionError> {
        let Some(form) = &self.form else {
            return Ok(());
        };
        let Some(file) = file else {
            form.file_label.clear();
            return Ok(());
        };

        if let Err(err) = check_size(file) {
            debug!(name = %file.name, size = file.size, "rejected file selection");
            self.notifier.notify(err.title(), err.message());
            form.file_input.clear();
            form.file_label.clear();
            return Err(err);
        }

        form.file_label.set_content(file.label());
        Ok(())
    }

    fn on_drop(&self, form: &UploadForm, files: &[FileRef]) {
        form.drop_zone.remove_class(DRAG_OVER_CLASS);
        if let Some(first) = files.first() {
            form.file_input.set(Some(first.clone()));
            let _ = self.select(Some(first));
        }
    }
}

impl Component for FileSelection {
    fn name(&self) -> &'static str {
        "file-selection"
    }

    fn init(&mut self, _timers: &mut Scheduler) -> bool {
        self.attached = self.form.is_some();
        self.attached
    }

    fn handle(&mut self, event: &PageEvent, _timers: &mut Scheduler) -> EventResponse {
        let Some(form) = self.form.clone().filter(|_| self.attached) else {
            return EventResponse::IGNORED;
        };

        match event {
            PageEvent::FileInputChanged => {
                let _ = self.select(form.file_input.file().as_ref());
                EventResponse::IGNORED
            }
            PageEvent::DragEnter | PageEvent::DragOver => {
                form.drop_zone.add_class(DRAG_OVER_CLASS);
                EventResponse::consume()
            }
            PageEvent::DragLeave => {
                form.drop_zone.remove_class(DRAG_OVER_CLASS);
                EventResponse::consume()
            }
            PageEvent::Drop { files } => {
                self.on_drop(&form, files);
                EventResponse::consume()
            }
            _ => EventResponse::IGNORED,
        }
    }

    fn dispose(&mut self, _timers: &mut Scheduler) {
        self.attached = false;
    }
}
