//! Shared handles to the page elements components attach to.
//!
//! Handles are cheap `Rc` clones: the host and every component holding the
//! same element observe the same state, like references to one DOM node.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::selection::FileRef;

#[derive(Debug)]
struct ElementState {
    content: String,
    enabled: bool,
    classes: BTreeSet<String>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            content: String::new(),
            enabled: true,
            classes: BTreeSet::new(),
        }
    }
}

/// A control, label or text field: presented content, an enabled flag and a
/// class list.
#[derive(Debug, Clone, Default)]
pub struct Element(Rc<RefCell<ElementState>>);

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(content: impl Into<String>) -> Self {
        let element = Self::new();
        element.set_content(content);
        element
    }

    pub fn content(&self) -> String {
        self.0.borrow().content.clone()
    }

    pub fn set_content(&self, content: impl Into<String>) {
        self.0.borrow_mut().content = content.into();
    }

    pub fn clear(&self) {
        self.0.borrow_mut().content.clear();
    }

    pub fn is_enabled(&self) -> bool {
        self.0.borrow().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.0.borrow_mut().enabled = enabled;
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.contains(class)
    }

    pub fn add_class(&self, class: &str) {
        self.0.borrow_mut().classes.insert(class.to_string());
    }

    pub fn remove_class(&self, class: &str) {
        self.0.borrow_mut().classes.remove(class);
    }

    /// True when both handles point at the same element.
    pub fn same_as(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A single-file picker. Holds at most one pending selection.
#[derive(Debug, Clone, Default)]
pub struct FileInput(Rc<RefCell<Option<FileRef>>>);

impl FileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self) -> Option<FileRef> {
        self.0.borrow().clone()
    }

    pub fn set(&self, file: Option<FileRef>) {
        *self.0.borrow_mut() = file;
    }

    pub fn clear(&self) {
        self.set(None);
    }
}

/// Anchors of the upload form, shared by file selection and the upload
/// controller.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub file_input: FileInput,
    pub file_label: Element,
    pub drop_zone: Element,
    pub trigger: Element,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form reset: drops the pending file and blanks the label.
    pub fn reset(&self) {
        self.file_input.clear();
        self.file_label.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let a = Element::with_content("Upload to IPFS");
        let b = a.clone();
        b.set_enabled(false);
        b.add_class("loading");
        assert!(!a.is_enabled());
        assert!(a.has_class("loading"));
        assert!(a.same_as(&b));
        assert!(!a.same_as(&Element::new()));
    }

    #[test]
    fn new_elements_start_enabled_and_empty() {
        let element = Element::new();
        assert!(element.is_enabled());
        assert_eq!(element.content(), "");
    }

    #[test]
    fn form_reset_clears_file_and_label() {
        let form = UploadForm::new();
        form.file_input
            .set(Some(FileRef::new("a.txt", 3, "/tmp/a.txt")));
        form.file_label.set_content("a.txt (3 Bytes)");

        form.reset();

        assert!(form.file_input.file().is_none());
        assert_eq!(form.file_label.content(), "");
    }
}
