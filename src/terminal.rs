//! Terminal host: renders overlays and notifications on stderr, turns
//! navigation into URLs and uses the desktop clipboard.

use std::cell::RefCell;
use std::io::Write;
use std::time::Duration;
#[cfg(target_os = "linux")]
use std::time::Instant;

use tracing::debug;
use url::Url;

use crate::surface::{
    Clipboard, ClipboardError, Modal, ModalId, ModalSurface, Navigator, Notifier, Tone,
};

/// Renders modals as a framed block on stderr and remembers the last one.
#[derive(Default)]
pub struct TerminalModal {
    last: RefCell<Option<Modal>>,
}

impl TerminalModal {
    pub fn last_shown(&self) -> Option<Modal> {
        self.last.borrow().clone()
    }
}

/// Lines of the framed block for `modal`.
pub fn render_modal(modal: &Modal) -> Vec<String> {
    let marker = match modal.tone() {
        Tone::Success => "✔",
        Tone::Error => "✖",
        Tone::Warning => "!",
    };
    let mut body = vec![format!("{marker} {}", modal.title()), modal.message().to_string()];
    if let Modal::UploadSucceeded { ipfs_hash, .. } = modal {
        body.push(format!("IPFS Hash: {ipfs_hash}"));
    }

    let width = body.iter().map(|line| line.chars().count()).max().unwrap_or(0);
    let mut lines = Vec::with_capacity(body.len() + 2);
    lines.push(format!("┌{}┐", "─".repeat(width + 2)));
    for line in body {
        let pad = width - line.chars().count();
        lines.push(format!("│ {line}{} │", " ".repeat(pad)));
    }
    lines.push(format!("└{}┘", "─".repeat(width + 2)));
    lines
}

impl ModalSurface for TerminalModal {
    fn show(&self, modal: Modal) {
        let mut stderr = std::io::stderr().lock();
        for line in render_modal(&modal) {
            let _ = writeln!(stderr, "{line}");
        }
        *self.last.borrow_mut() = Some(modal);
    }

    fn hide(&self, id: ModalId) {
        debug!(?id, "modal hidden");
    }
}

pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, title: &str, message: &str) {
        eprintln!("{title}\n\n{message}");
    }
}

/// Where the page asked to go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Redirect(Url),
    Reload,
    Opened(Url),
}

/// Resolves navigation against the service root. Opened contexts are printed
/// to stdout and, when enabled, launched in the desktop browser.
pub struct TerminalNavigator {
    base_url: Url,
    launch_browser: bool,
    pending: RefCell<Vec<Navigation>>,
}

impl TerminalNavigator {
    pub fn new(base_url: Url, launch_browser: bool) -> Self {
        Self {
            base_url,
            launch_browser,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Drain navigations requested since the last call.
    pub fn take(&self) -> Vec<Navigation> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    fn resolve(&self, path: &str) -> Option<Url> {
        match self.base_url.join(path.trim_start_matches('/')) {
            Ok(url) => Some(url),
            Err(err) => {
                tracing::warn!(path, error = %err, "cannot resolve navigation target");
                None
            }
        }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, path: &str) {
        if let Some(url) = self.resolve(path) {
            self.pending.borrow_mut().push(Navigation::Redirect(url));
        }
    }

    fn reload(&self) {
        self.pending.borrow_mut().push(Navigation::Reload);
    }

    fn open_new_context(&self, path: &str) {
        let Some(url) = self.resolve(path) else {
            return;
        };
        println!("{url}");
        if self.launch_browser {
            if let Err(err) = open::that(url.as_str()) {
                tracing::warn!(error = %err, "failed to launch browser");
            }
        }
        self.pending.borrow_mut().push(Navigation::Opened(url));
    }
}

/// The desktop clipboard through `arboard`.
///
/// On Linux the writing process owns the selection and the text is gone once
/// it exits. A short-lived process should use [`SystemClipboard::holding`] so
/// the write blocks until another program takes the selection or the window
/// runs out.
#[derive(Debug, Default)]
pub struct SystemClipboard {
    hold: Option<Duration>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep serving the selection for up to `hold` after a write. Zero means
    /// return right away.
    pub fn holding(hold: Duration) -> Self {
        Self {
            hold: Some(hold).filter(|hold| !hold.is_zero()),
        }
    }

    pub fn hold(&self) -> Option<Duration> {
        self.hold
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
        set_text(&mut clipboard, text, self.hold)
            .map_err(|e| ClipboardError::Denied(e.to_string()))
    }
}

#[cfg(target_os = "linux")]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    hold: Option<Duration>,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    match hold {
        Some(hold) => {
            debug!(hold_secs = hold.as_secs(), "serving clipboard selection");
            clipboard
                .set()
                .wait_until(Instant::now() + hold)
                .text(text.to_string())
        }
        None => clipboard.set_text(text.to_string()),
    }
}

#[cfg(not(target_os = "linux"))]
fn set_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _hold: Option<Duration>,
) -> Result<(), arboard::Error> {
    clipboard.set_text(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_modal_frames_hash() {
        let lines = render_modal(&Modal::UploadSucceeded {
            message: "ok".into(),
            ipfs_hash: "QmAbc".into(),
        });
        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("✔ Upload Successful!"));
        assert!(lines[3].contains("IPFS Hash: QmAbc"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]), "{lines:?}");
    }

    #[test]
    fn failure_modal_has_no_hash_line() {
        let lines = render_modal(&Modal::UploadFailed {
            message: "Network error occurred".into(),
        });
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("✖ Upload Failed"));
    }

    #[test]
    fn navigator_resolves_against_base() {
        let base = Url::parse("https://drop.example.com/app/").unwrap();
        let navigator = TerminalNavigator::new(base, false);

        navigator.navigate("/login");
        navigator.reload();
        navigator.open_new_context("/download?ipfs_hash=QmAbc");

        assert_eq!(
            navigator.take(),
            vec![
                Navigation::Redirect(Url::parse("https://drop.example.com/app/login").unwrap()),
                Navigation::Reload,
                Navigation::Opened(
                    Url::parse("https://drop.example.com/app/download?ipfs_hash=QmAbc").unwrap()
                ),
            ]
        );
        assert!(navigator.take().is_empty());
    }

    #[test]
    fn zero_hold_writes_without_serving() {
        assert_eq!(SystemClipboard::holding(Duration::ZERO).hold(), None);
        assert_eq!(SystemClipboard::new().hold(), None);
        assert_eq!(
            SystemClipboard::holding(Duration::from_secs(30)).hold(),
            Some(Duration::from_secs(30))
        );
    }

    #[test]
    fn terminal_modal_remembers_last() {
        let modal = TerminalModal::default();
        modal.show(Modal::SessionExpired);
        assert_eq!(modal.last_shown(), Some(Modal::SessionExpired));
    }
}
