//! Fetch-by-hash trigger: validates the hash field and opens the download.

use std::rc::Rc;

use thiserror::Error;
use tracing::debug;
use url::form_urlencoded;

use crate::backend::DOWNLOAD_PATH;
use crate::cid::Cid;
use crate::dom::Element;
use crate::event::{Component, EventResponse, PageEvent, Target};
use crate::surface::{Navigator, Notifier};
use crate::timer::Scheduler;

pub const ENTER_KEY: &str = "Enter";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no IPFS hash entered")]
    Empty,
    #[error("malformed IPFS hash: {0}")]
    InvalidFormat(String),
}

impl LookupError {
    pub fn title(&self) -> &'static str {
        match self {
            LookupError::Empty => "Invalid Hash",
            LookupError::InvalidFormat(_) => "Invalid Hash Format",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            LookupError::Empty => "Please enter an IPFS hash",
            LookupError::InvalidFormat(_) => "Please enter a valid IPFS hash (starts with Qm)",
        }
    }
}

/// Trim and validate raw input from the hash field.
pub fn parse_hash_input(raw: &str) -> Result<Cid, LookupError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LookupError::Empty);
    }
    Cid::parse(trimmed).map_err(|_| LookupError::InvalidFormat(trimmed.to_string()))
}

/// `/download?ipfs_hash=<percent-encoded hash>`
pub fn download_path(cid: &Cid) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("ipfs_hash", cid.as_str())
        .finish();
    format!("/{DOWNLOAD_PATH}?{query}")
}

#[derive(Debug, Clone, Default)]
pub struct LookupAnchors {
    pub view_button: Element,
    pub hash_input: Element,
}

pub struct HashLookup {
    anchors: Option<LookupAnchors>,
    notifier: Rc<dyn Notifier>,
    navigator: Rc<dyn Navigator>,
    attached: bool,
}

impl HashLookup {
    pub fn new(
        anchors: Option<LookupAnchors>,
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self {
            anchors,
            notifier,
            navigator,
            attached: false,
        }
    }

    /// Read the field and either open the download or explain what is wrong.
    pub fn view(&self) -> Result<Cid, LookupError> {
        let Some(anchors) = &self.anchors else {
            return Err(LookupError::Empty);
        };

        match parse_hash_input(&anchors.hash_input.content()) {
            Ok(cid) => {
                debug!(%cid, version = %cid.version(), "opening download");
                self.navigator.open_new_context(&download_path(&cid));
                anchors.hash_input.clear();
                Ok(cid)
            }
            Err(err) => {
                self.notifier.notify(err.title(), err.message());
                Err(err)
            }
        }
    }
}

impl Component for HashLookup {
    fn name(&self) -> &'static str {
        "hash-lookup"
    }

    fn init(&mut self, _timers: &mut Scheduler) -> bool {
        self.attached = self.anchors.is_some();
        self.attached
    }

    fn handle(&mut self, event: &PageEvent, _timers: &mut Scheduler) -> EventResponse {
        if !self.attached {
            return EventResponse::IGNORED;
        }
        let triggered = match event {
            PageEvent::Click(Target::ViewFileButton) => true,
            PageEvent::KeyPress {
                target: Target::HashInput,
                key,
            } => key == ENTER_KEY,
            _ => false,
        };
        if triggered {
            let _ = self.view();
        }
        EventResponse::IGNORED
    }

    fn dispose(&mut self, _timers: &mut Scheduler) {
        self.attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Navigation, RecordingNavigator, RecordingNotifier};

    const V0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

    struct Fixture {
        lookup: HashLookup,
        anchors: LookupAnchors,
        notifier: Rc<RecordingNotifier>,
        navigator: Rc<RecordingNavigator>,
        timers: Scheduler,
    }

    fn fixture() -> Fixture {
        let anchors = LookupAnchors::default();
        let notifier = Rc::new(RecordingNotifier::default());
        let navigator = Rc::new(RecordingNavigator::default());
        let mut timers = Scheduler::new();
        let mut lookup = HashLookup::new(Some(anchors.clone()), notifier.clone(), navigator.clone());
        assert!(lookup.init(&mut timers));
        Fixture {
            lookup,
            anchors,
            notifier,
            navigator,
            timers,
        }
    }

    #[test]
    fn valid_hash_opens_download_and_clears_field() {
        let mut f = fixture();
        f.anchors.hash_input.set_content(format!("  {V0}\n"));

        f.lookup
            .handle(&PageEvent::Click(Target::ViewFileButton), &mut f.timers);

        assert_eq!(
            f.navigator.log(),
            vec![Navigation::OpenNewContext(format!("/download?ipfs_hash={V0}"))]
        );
        assert_eq!(f.anchors.hash_input.content(), "");
        assert!(f.notifier.notes().is_empty());
    }

    #[test]
    fn enter_in_the_field_triggers_lookup() {
        let mut f = fixture();
        f.anchors.hash_input.set_content(V0);

        f.lookup
            .handle(&PageEvent::key_press(Target::HashInput, "a"), &mut f.timers);
        assert!(f.navigator.log().is_empty());

        f.lookup
            .handle(&PageEvent::key_press(Target::HashInput, "Enter"), &mut f.timers);
        assert_eq!(f.navigator.log().len(), 1);
    }

    #[test]
    fn empty_field_reports_missing_hash() {
        let mut f = fixture();
        f.anchors.hash_input.set_content("   ");

        f.lookup
            .handle(&PageEvent::Click(Target::ViewFileButton), &mut f.timers);

        assert_eq!(f.notifier.titles(), vec!["Invalid Hash".to_string()]);
        assert!(f.navigator.log().is_empty());
    }

    #[test]
    fn malformed_hash_reports_format_and_keeps_field() {
        let f = fixture();
        f.anchors.hash_input.set_content("x123");

        let err = f.lookup.view().unwrap_err();

        assert_eq!(err, LookupError::InvalidFormat("x123".into()));
        assert_eq!(f.notifier.titles(), vec!["Invalid Hash Format".to_string()]);
        assert!(f.navigator.log().is_empty());
        assert_eq!(f.anchors.hash_input.content(), "x123");
    }

    #[test]
    fn download_path_encodes_the_query_value() {
        let cid = Cid::parse(V0).unwrap();
        assert_eq!(download_path(&cid), format!("/download?ipfs_hash={V0}"));
    }

    #[test]
    fn parse_hash_input_trims() {
        assert_eq!(parse_hash_input(&format!("\t{V0} ")).unwrap().as_str(), V0);
        assert_eq!(parse_hash_input(""), Err(LookupError::Empty));
    }
}
