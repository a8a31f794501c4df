//! Whole-page flows: components wired together on one timer queue.

use std::time::Duration;

use cloudsend::backend::BackendError;
use cloudsend::copy::CopyButton;
use cloudsend::lookup::LookupAnchors;
use cloudsend::modal::ModalAnchors;
use cloudsend::testing::{Doubles, Navigation, ScriptedSession, ScriptedUpload, init_test_tracing};
use cloudsend::upload::{IDLE_LABEL, NETWORK_ERROR_MESSAGE};
use cloudsend::watchdog::{EXPIRY_GRACE, POLL_INTERVAL};
use cloudsend::{
    Element, FileRef, MAX_UPLOAD_BYTES, Modal, ModalId, Page, PageAnchors, PageEvent,
    PageOptions, Target, UploadForm,
};

const HASH: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

struct Harness {
    page: Page,
    doubles: Doubles,
    form: UploadForm,
    lookup: LookupAnchors,
    copy_button: Element,
}

fn harness() -> Harness {
    init_test_tracing();
    let doubles = Doubles::new();
    let form = UploadForm::new();
    form.trigger.set_content(IDLE_LABEL);
    let lookup = LookupAnchors::default();
    let copy_button = Element::with_content("Copy");
    let anchors = PageAnchors {
        upload: Some(form.clone()),
        lookup: Some(lookup.clone()),
        copy_buttons: vec![CopyButton::new(copy_button.clone(), HASH)],
        modal: ModalAnchors::complete(),
    };
    let mut page = Page::new(anchors, doubles.services(), PageOptions::default());
    page.ready();
    Harness {
        page,
        doubles,
        form,
        lookup,
        copy_button,
    }
}

#[test]
fn dropped_file_uploads_and_page_reloads_after_two_seconds() {
    let mut h = harness();
    h.doubles.backend.script_upload(ScriptedUpload::Accepted {
        message: Some("File uploaded successfully!".into()),
        ipfs_hash: "QmAbc".into(),
    });
    let file = FileRef::new("photo.jpg", 1_048_576, "/tmp/photo.jpg");

    let response = h.page.dispatch(&PageEvent::Drop {
        files: vec![file.clone()],
    });
    assert!(response.default_prevented);
    assert_eq!(h.form.file_label.content(), "photo.jpg (1 MB)");

    let response = h.page.dispatch(&PageEvent::Submit);
    assert!(response.default_prevented);

    assert_eq!(h.doubles.backend.uploaded(), vec![file]);
    assert_eq!(
        h.doubles.modals.last_shown(),
        Some(Modal::UploadSucceeded {
            message: "File uploaded successfully!".into(),
            ipfs_hash: "QmAbc".into(),
        })
    );
    assert_eq!(h.form.file_label.content(), "");
    assert!(h.form.trigger.is_enabled());

    h.page.advance(Duration::from_millis(1999));
    assert_eq!(h.doubles.navigator.reloads(), 0);
    h.page.advance(Duration::from_millis(1));
    assert_eq!(h.doubles.navigator.reloads(), 1);
}

#[test]
fn oversized_pick_never_reaches_the_server() {
    let mut h = harness();
    h.form
        .file_input
        .set(Some(FileRef::new("disk.img", MAX_UPLOAD_BYTES + 1, "/tmp/disk.img")));

    h.page.dispatch(&PageEvent::FileInputChanged);
    h.page.dispatch(&PageEvent::Submit);

    assert_eq!(h.doubles.backend.upload_calls(), 0);
    assert_eq!(
        h.doubles.notifier.titles(),
        vec!["File too large".to_string(), "No file selected".to_string()]
    );
}

#[test]
fn network_failure_shows_generic_error_and_dismisses_with_escape() {
    let mut h = harness();
    h.doubles
        .backend
        .script_upload(ScriptedUpload::Error(BackendError::Transport(
            "dns lookup failed for drop.example.com".into(),
        )));
    h.form
        .file_input
        .set(Some(FileRef::new("a.txt", 10, "/tmp/a.txt")));
    h.page.dispatch(&PageEvent::FileInputChanged);

    h.page.dispatch(&PageEvent::Submit);

    assert_eq!(
        h.doubles.modals.last_shown(),
        Some(Modal::UploadFailed {
            message: NETWORK_ERROR_MESSAGE.into()
        })
    );
    assert!(h.form.trigger.is_enabled());
    assert_eq!(h.form.trigger.content(), IDLE_LABEL);
    assert_eq!(h.page.pending_timers(), 1, "only the watchdog poll remains");

    h.page.dispatch(&PageEvent::key_down("Escape"));
    assert!(!h.doubles.modals.is_visible(ModalId::UploadResult));
}

#[test]
fn session_expiry_redirects_and_polling_stops() {
    let mut h = harness();
    h.doubles
        .backend
        .script_session(ScriptedSession::Authenticated(true));
    h.doubles
        .backend
        .script_session(ScriptedSession::Authenticated(false));

    h.page.advance(POLL_INTERVAL * 2);
    assert_eq!(h.doubles.backend.session_calls(), 2);
    assert!(h.doubles.modals.is_visible(ModalId::SessionExpired));

    h.page.advance(EXPIRY_GRACE);
    assert_eq!(
        h.doubles.navigator.log(),
        vec![Navigation::Navigate("/login".into())]
    );

    h.page.advance(POLL_INTERVAL * 5);
    assert_eq!(h.doubles.backend.session_calls(), 2);
}

#[test]
fn back_forward_restore_reloads_immediately() {
    let mut h = harness();

    h.page.dispatch(&PageEvent::PageShow { persisted: true });

    assert_eq!(h.doubles.navigator.log(), vec![Navigation::Reload]);
}

#[test]
fn hash_lookup_and_copy_work_side_by_side() {
    let mut h = harness();
    h.lookup.hash_input.set_content(HASH);

    h.page
        .dispatch(&PageEvent::key_press(Target::HashInput, "Enter"));
    h.page.dispatch(&PageEvent::Click(Target::CopyButton(0)));

    assert_eq!(
        h.doubles.navigator.log(),
        vec![Navigation::OpenNewContext(format!(
            "/download?ipfs_hash={HASH}"
        ))]
    );
    assert_eq!(h.doubles.clipboard.writes(), vec![HASH.to_string()]);
    assert_eq!(h.copy_button.content(), "Copied!");

    h.page.advance(Duration::from_secs(2));
    assert_eq!(h.copy_button.content(), "Copy");
}

#[test]
fn dispose_tears_down_every_timer() {
    let mut h = harness();
    h.doubles.backend.script_upload(ScriptedUpload::Accepted {
        message: None,
        ipfs_hash: "QmAbc".into(),
    });
    h.form
        .file_input
        .set(Some(FileRef::new("a.txt", 10, "/tmp/a.txt")));
    h.page.dispatch(&PageEvent::Submit);
    h.page.dispatch(&PageEvent::Click(Target::CopyButton(0)));
    assert_eq!(h.page.pending_timers(), 3);

    h.page.dispose();

    assert_eq!(h.page.pending_timers(), 0);
    assert_eq!(h.copy_button.content(), "Copy");
    h.page.advance(POLL_INTERVAL);
    assert!(h.doubles.navigator.log().is_empty());
    assert_eq!(h.doubles.backend.session_calls(), 0);
}
