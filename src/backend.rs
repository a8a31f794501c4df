//! HTTP side of the client: session status and multipart uploads.

use std::fs::File;
use std::io::{Cursor, Read};
use std::time::Duration;

use rand::RngCore;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::selection::FileRef;

pub const SESSION_STATUS_PATH: &str = "api/session-status";
pub const UPLOAD_PATH: &str = "upload";
pub const DOWNLOAD_PATH: &str = "download";
/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "file";
const SESSION_COOKIE_NAME: &str = "session";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("could not decode response: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A missing or null `authenticated` reads as logged out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SessionStatus {
    #[serde(default, deserialize_with = "null_as_false")]
    pub authenticated: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: Option<String>,
    pub ipfs_hash: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReply {
    Accepted(UploadReceipt),
    Rejected { status: u16, message: Option<String> },
}

/// The two endpoints the page talks to.
pub trait Backend {
    fn session_status(&self) -> Result<SessionStatus, BackendError>;
    fn upload(&self, file: &FileRef) -> Result<UploadReply, BackendError>;
}

/// Blocking `ureq` client rooted at the service base URL.
pub struct HttpBackend {
    base_url: Url,
    agent: ureq::Agent,
    session_cookie: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .build();
        Self::with_agent(base_url, agent)
    }

    pub fn from_config(config: &Config) -> Result<Self, BackendError> {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(config.connect_timeout_secs))
            .build();
        Ok(Self::with_agent(&config.base_url, agent)?.with_session_cookie(config.session_cookie()))
    }

    pub fn with_agent(base_url: &str, agent: ureq::Agent) -> Result<Self, BackendError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            agent,
            session_cookie: None,
        })
    }

    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie.filter(|value| !value.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, BackendError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: &str, url: &Url) -> ureq::Request {
        let request = self.agent.request(method, url.as_str());
        match &self.session_cookie {
            Some(value) => request.set("Cookie", &format!("{SESSION_COOKIE_NAME}={value}")),
            None => request,
        }
    }
}

impl Backend for HttpBackend {
    fn session_status(&self) -> Result<SessionStatus, BackendError> {
        let url = self.endpoint(SESSION_STATUS_PATH)?;
        // The body decides, not the status: a 401 carrying
        // `{"authenticated": false}` is an expiry, not a transport miss.
        let response = status_as_response(self.request("GET", &url).call())?;
        response
            .into_json::<SessionStatus>()
            .map_err(|err| BackendError::Decode(err.to_string()))
    }

    fn upload(&self, file: &FileRef) -> Result<UploadReply, BackendError> {
        let url = self.endpoint(UPLOAD_PATH)?;
        let handle = File::open(&file.path)?;
        let file_len = handle.metadata()?.len();
        let body = MultipartBody::new(UPLOAD_FIELD, &file.name);

        debug!(name = %file.name, bytes = file_len, "uploading file");
        let response = status_as_response(
            self.request("POST", &url)
                .set("Content-Type", &body.content_type())
                .set("Content-Length", &body.content_length(file_len).to_string())
                .send(body.into_reader(handle)),
        )?;

        let status = response.status();
        if (200..300).contains(&status) {
            let receipt = response
                .into_json::<UploadReceipt>()
                .map_err(|err| BackendError::Decode(err.to_string()))?;
            Ok(UploadReply::Accepted(receipt))
        } else {
            let body = response
                .into_json::<ErrorBody>()
                .map_err(|err| BackendError::Decode(err.to_string()))?;
            Ok(UploadReply::Rejected {
                status,
                message: body.message,
            })
        }
    }
}

/// Non-2xx responses still carry a body worth reading.
fn status_as_response(
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, BackendError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(_, response)) => Ok(response),
        Err(ureq::Error::Transport(err)) => Err(BackendError::Transport(err.to_string())),
    }
}

/// Parse a base URL and make sure it ends with `/` so relative joins keep
/// any path prefix.
pub fn normalize_base_url(base_url: &str) -> Result<Url, BackendError> {
    let mut url =
        Url::parse(base_url).map_err(|_| BackendError::InvalidBaseUrl(base_url.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(BackendError::InvalidBaseUrl(base_url.to_string()));
    }
    if !url.path().ends_with('/') {
        let mut path = url.path().trim_end_matches('/').to_owned();
        path.push('/');
        url.set_path(&path);
    }
    Ok(url)
}

/// A single-file `multipart/form-data` body streamed around the file reader.
pub(crate) struct MultipartBody {
    boundary: String,
    head: Vec<u8>,
    tail: Vec<u8>,
}

impl MultipartBody {
    pub(crate) fn new(field: &str, file_name: &str) -> Self {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self::with_boundary(field, file_name, format!("----cloudsend{}", hex::encode(nonce)))
    }

    fn with_boundary(field: &str, file_name: &str, boundary: String) -> Self {
        let head = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n",
            escape_quoted(field),
            escape_quoted(file_name),
        )
        .into_bytes();
        let tail = format!("\r\n--{boundary}--\r\n").into_bytes();
        Self {
            boundary,
            head,
            tail,
        }
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub(crate) fn content_length(&self, file_len: u64) -> u64 {
        self.head.len() as u64 + file_len + self.tail.len() as u64
    }

    pub(crate) fn into_reader<R: Read>(self, file: R) -> impl Read {
        Cursor::new(self.head).chain(file).chain(Cursor::new(self.tail))
    }
}

/// Quoted-string escaping used by browsers for multipart names.
fn escape_quoted(value: &str) -> String {
    value
        .replace('\r', "%0D")
        .replace('\n', "%0A")
        .replace('"', "%22")
}
