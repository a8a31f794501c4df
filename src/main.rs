use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cloudsend::backend::normalize_base_url;
use cloudsend::copy::{COPIED_LABEL, CopyButton};
use cloudsend::lookup::{ENTER_KEY, LookupAnchors, parse_hash_input};
use cloudsend::modal::ModalAnchors;
use cloudsend::terminal::{
    Navigation, SystemClipboard, TerminalModal, TerminalNavigator, TerminalNotifier,
};
use cloudsend::upload::IDLE_LABEL;
use cloudsend::{
    Config, Element, FileRef, HttpBackend, Modal, Page, PageAnchors, PageEvent,
    PageOptions, Services, Target, UploadForm,
};

const LOG_ENV: &str = "CLOUDSEND_LOG";

#[derive(Parser)]
#[command(name = "cloudsend", version, about = "Upload to and fetch from an IPFS file drop")]
struct Cli {
    /// Service root (default from ~/.cloudsend/config.toml)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file (max 100MB) and print its IPFS hash
    Upload {
        path: PathBuf,
        /// Validate and show the file label without uploading
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the download URL for a hash (prompts when omitted)
    Fetch {
        hash: Option<String>,
        /// Also open the download in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Check that a string looks like an IPFS hash
    Check { hash: String },

    /// Copy a hash to the clipboard
    Copy {
        hash: String,
        /// Seconds to keep serving the clipboard on Linux (0 to return at once)
        #[arg(long, default_value_t = 30)]
        hold: u64,
    },

    /// Poll the session until it expires
    Watch {
        /// Seconds between checks (default from config, 300)
        #[arg(long)]
        interval: Option<u64>,
        /// Check once and report instead of polling
        #[arg(long)]
        once: bool,
    },

    /// View or modify config (~/.cloudsend/config.toml)
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current config
    Show,
    /// Set a config value
    Set {
        /// Key to set (base_url, session_cookie, poll_interval_secs, connect_timeout_secs)
        key: String,
        /// Value to set
        value: String,
    },
    /// Reset config to defaults
    Reset,
}

/// Terminal implementations of the page services plus handles the commands
/// inspect afterwards.
struct Host {
    services: Services,
    modal: Rc<TerminalModal>,
    navigator: Rc<TerminalNavigator>,
    options: PageOptions,
}

impl Host {
    fn new(config: &Config, launch_browser: bool) -> Result<Self> {
        let backend = HttpBackend::from_config(config)
            .with_context(|| format!("cannot use base URL {}", config.base_url))?;
        let base_url = normalize_base_url(&config.base_url)?;
        let modal = Rc::new(TerminalModal::default());
        let navigator = Rc::new(TerminalNavigator::new(base_url, launch_browser));
        let services = Services {
            backend: Rc::new(backend),
            modals: modal.clone(),
            notifier: Rc::new(TerminalNotifier),
            navigator: navigator.clone(),
            clipboard: Rc::new(SystemClipboard::new()),
        };
        Ok(Self {
            services,
            modal,
            navigator,
            options: PageOptions {
                poll_interval: config.poll_interval(),
            },
        })
    }

    fn page(&self, anchors: PageAnchors) -> Page {
        let mut page = Page::new(anchors, self.services.clone(), self.options);
        page.ready();
        page
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut config = Config::load().unwrap_or_default();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    match cli.command {
        Commands::Upload { path, dry_run } => upload(&Host::new(&config, false)?, &path, dry_run),
        Commands::Fetch { hash, open } => fetch(&Host::new(&config, open)?, hash),
        Commands::Check { hash } => Ok(check(&hash)),
        Commands::Copy { hash, hold } => {
            let mut host = Host::new(&config, false)?;
            let hold = Duration::from_secs(hold);
            if cfg!(target_os = "linux") && !hold.is_zero() {
                eprintln!(
                    "keeping the clipboard for up to {}s or until something else is copied",
                    hold.as_secs()
                );
            }
            host.services.clipboard = Rc::new(SystemClipboard::holding(hold));
            copy(&host, &hash)
        }
        Commands::Watch { interval, once } => {
            if let Some(secs) = interval {
                config.set("poll_interval_secs", &secs.to_string())?;
            }
            let host = Host::new(&config, false)?;
            if once {
                watch_once(&host)
            } else {
                watch(&host, &config)
            }
        }
        Commands::Config { action } => {
            handle_config(action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn upload(host: &Host, path: &Path, dry_run: bool) -> Result<ExitCode> {
    let file = FileRef::from_path(path)?;
    let form = UploadForm::new();
    form.trigger.set_content(IDLE_LABEL);
    let mut page = host.page(PageAnchors {
        upload: Some(form.clone()),
        modal: ModalAnchors::complete(),
        ..PageAnchors::default()
    });

    form.file_input.set(Some(file));
    page.dispatch(&PageEvent::FileInputChanged);
    if form.file_input.file().is_none() {
        return Ok(ExitCode::FAILURE);
    }
    eprintln!("{}", form.file_label.content());
    if dry_run {
        return Ok(ExitCode::SUCCESS);
    }

    page.dispatch(&PageEvent::Submit);
    // The page would reload to list the new file; a one-shot command just ends.
    page.dispose();

    match host.modal.last_shown() {
        Some(Modal::UploadSucceeded { ipfs_hash, .. }) => {
            println!("{ipfs_hash}");
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(ExitCode::FAILURE),
    }
}

fn fetch(host: &Host, hash: Option<String>) -> Result<ExitCode> {
    let raw = match hash {
        Some(hash) => hash,
        None => {
            use dialoguer::{Input, theme::ColorfulTheme};
            Input::<String>::with_theme(&ColorfulTheme::default())
                .with_prompt("IPFS hash")
                .allow_empty(true)
                .interact_text()?
        }
    };

    let anchors = LookupAnchors::default();
    anchors.hash_input.set_content(raw);
    let mut page = host.page(PageAnchors {
        lookup: Some(anchors),
        ..PageAnchors::default()
    });
    page.dispatch(&PageEvent::key_press(Target::HashInput, ENTER_KEY));

    let opened = host
        .navigator
        .take()
        .into_iter()
        .any(|nav| matches!(nav, Navigation::Opened(_)));
    Ok(if opened {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn check(hash: &str) -> ExitCode {
    match parse_hash_input(hash) {
        Ok(cid) => {
            println!("{} ({})", cid, cid.version());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {}", err.title(), err.message());
            ExitCode::FAILURE
        }
    }
}

fn copy(host: &Host, hash: &str) -> Result<ExitCode> {
    let button = Element::with_content("Copy");
    let mut page = host.page(PageAnchors {
        copy_buttons: vec![CopyButton::new(button.clone(), hash)],
        ..PageAnchors::default()
    });
    page.dispatch(&PageEvent::Click(Target::CopyButton(0)));

    let label = button.content();
    eprintln!("{label}");
    Ok(if label == COPIED_LABEL {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn watch_once(host: &Host) -> Result<ExitCode> {
    let status = host.services.backend.session_status()?;
    if status.authenticated {
        println!("authenticated");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("expired");
        Ok(ExitCode::FAILURE)
    }
}

/// Run the watchdog against the wall clock until it redirects to login.
fn watch(host: &Host, config: &Config) -> Result<ExitCode> {
    let session_page = || {
        host.page(PageAnchors {
            modal: ModalAnchors::complete(),
            ..PageAnchors::default()
        })
    };
    let mut page = session_page();
    eprintln!(
        "watching session at {} every {}s",
        config.base_url,
        config.poll_interval().as_secs()
    );

    loop {
        let Some(wait) = page.until_next_timer() else {
            return Ok(ExitCode::SUCCESS);
        };
        std::thread::sleep(wait.max(Duration::from_millis(1)));
        page.advance(wait);

        for navigation in host.navigator.take() {
            match navigation {
                Navigation::Redirect(url) => {
                    println!("{url}");
                    return Ok(ExitCode::FAILURE);
                }
                Navigation::Reload => {
                    page.dispose();
                    page = session_page();
                }
                Navigation::Opened(_) => {}
            }
        }
    }
}

fn handle_config(action: Option<ConfigAction>) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show) => {
            let config = Config::load().unwrap_or_default();
            println!("base_url = \"{}\"", config.base_url);
            println!(
                "session_cookie = {}",
                if config.session_cookie().is_some() {
                    "(set)"
                } else {
                    "(unset)"
                }
            );
            println!("poll_interval_secs = {}", config.poll_interval_secs);
            println!("connect_timeout_secs = {}", config.connect_timeout_secs);
        }
        Some(ConfigAction::Set { key, value }) => {
            let mut config = Config::load().unwrap_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!("saved to {}", path.display());
        }
        Some(ConfigAction::Reset) => {
            let config = Config::default();
            let path = config.save()?;
            println!("reset to defaults at {}", path.display());
        }
    }
    Ok(())
}
