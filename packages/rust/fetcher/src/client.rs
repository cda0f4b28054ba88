//! Sequential fetch-and-verify executor.
//!
//! Tries candidate URLs in order until one yields a verified PDF, then writes
//! it to the destination. Per-URL failures are logged and swallowed.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, info, instrument, warn};
use url::Url;

use stdpdf_shared::{FetchConfig, Result, StdpdfError, write_atomic};

use crate::verify::{is_pdf_content_type, sha256_hex, verify_pdf};

/// Maximum number of redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// Accept header sent with every request.
const ACCEPT_PDF: &str = "application/pdf,*/*";

/// How a whole candidate sequence ended.
#[derive(Debug)]
pub enum FetchOutcome {
    /// `url` produced a verified PDF, now written to the destination.
    Downloaded {
        url: String,
        bytes: u64,
        sha256: String,
    },
    /// No candidate produced a verified PDF.
    Exhausted {
        /// Number of URLs attempted.
        tried: usize,
    },
    /// `url` produced a verified PDF but writing it failed.
    WriteFailed { url: String, error: StdpdfError },
}

/// HTTP client pair for fetching PDFs: one validating TLS certificates and,
/// when any hosts are configured as insecure, one that does not.
pub struct PdfFetcher {
    config: FetchConfig,
    client: Client,
    insecure_client: Option<Client>,
    /// Insecure hosts already announced at `warn` level.
    warned_hosts: Mutex<HashSet<String>>,
}

impl PdfFetcher {
    /// Build the HTTP clients for `config`.
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = build_client(&config, false)?;
        let insecure_client = if config.insecure_hosts.is_empty() {
            None
        } else {
            Some(build_client(&config, true)?)
        };

        Ok(Self {
            config,
            client,
            insecure_client,
            warned_hosts: Mutex::new(HashSet::new()),
        })
    }

    /// Try `urls` in order and write the first verified PDF to `dest`.
    ///
    /// Remaining URLs are not tried once one succeeds.
    #[instrument(skip_all, fields(dest = %dest.display(), candidates = urls.len()))]
    pub async fn fetch_first(&self, urls: &[String], dest: &Path) -> FetchOutcome {
        for url in urls {
            let body = match self.fetch_pdf(url).await {
                Ok(body) => body,
                Err(e) => {
                    debug!(%url, error = %e, "candidate rejected");
                    continue;
                }
            };

            let bytes = body.len() as u64;
            let sha256 = sha256_hex(&body);

            if let Err(error) = write_atomic(dest, &body) {
                warn!(%url, error = %error, "verified PDF could not be written");
                return FetchOutcome::WriteFailed {
                    url: url.clone(),
                    error,
                };
            }

            info!(%url, bytes, "PDF downloaded");
            return FetchOutcome::Downloaded {
                url: url.clone(),
                bytes,
                sha256,
            };
        }

        FetchOutcome::Exhausted { tried: urls.len() }
    }

    /// Fetch one URL and return its body if it is a verified PDF.
    ///
    /// Network failures and non-2xx statuses are [`StdpdfError::Transport`];
    /// bodies failing the size or signature gate are [`StdpdfError::Validation`].
    pub async fn fetch_pdf(&self, url: &str) -> Result<Vec<u8>> {
        let parsed =
            Url::parse(url).map_err(|e| StdpdfError::Transport(format!("{url}: invalid URL: {e}")))?;

        let response = self
            .client_for(&parsed)
            .get(parsed.as_str())
            .header(ACCEPT, ACCEPT_PDF)
            .send()
            .await
            .map_err(|e| StdpdfError::Transport(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StdpdfError::Transport(format!("{url}: HTTP {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        debug!(
            %url,
            %status,
            content_type = content_type.as_deref().unwrap_or(""),
            pdf_type = is_pdf_content_type(content_type.as_deref()),
            "response received"
        );

        if let Some(len) = response.content_length() {
            if len > self.config.max_bytes {
                return Err(StdpdfError::validation(format!(
                    "{url}: response too large ({len} bytes, max {})",
                    self.config.max_bytes
                )));
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| StdpdfError::Transport(format!("{url}: body read failed: {e}")))?;

        if body.len() as u64 > self.config.max_bytes {
            return Err(StdpdfError::validation(format!(
                "{url}: response too large ({} bytes, max {})",
                body.len(),
                self.config.max_bytes
            )));
        }

        verify_pdf(&body, self.config.min_bytes)
            .map_err(|e| StdpdfError::validation(format!("{url}: {e}")))?;

        Ok(body.to_vec())
    }

    /// Pick the client for `url`. The first insecure fetch per host is logged
    /// at `warn`, later ones at `debug`.
    fn client_for(&self, url: &Url) -> &Client {
        match &self.insecure_client {
            Some(insecure) if is_insecure_host(url, &self.config.insecure_hosts) => {
                let host = url.host_str().unwrap_or_default();
                if self.first_insecure_use(host) {
                    warn!(host, "fetching without TLS certificate validation");
                } else {
                    debug!(%url, "fetching without TLS certificate validation");
                }
                insecure
            }
            _ => &self.client,
        }
    }

    /// Record an insecure fetch from `host`; true only the first time.
    fn first_insecure_use(&self, host: &str) -> bool {
        let mut warned = self
            .warned_hosts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        warned.insert(host.to_ascii_lowercase())
    }
}

/// Whether `url` targets one of the configured insecure hosts.
fn is_insecure_host(url: &Url, insecure_hosts: &[String]) -> bool {
    match url.host_str() {
        Some(host) => insecure_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)),
        None => false,
    }
}

/// Build a reqwest client with the configured timeouts and identification.
///
/// The timeout bounds connecting and each individual read, not the whole
/// transfer: a large PDF trickling in steadily is still accepted.
fn build_client(config: &FetchConfig, accept_invalid_certs: bool) -> Result<Client> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .read_timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(accept_invalid_certs)
        .build()
        .map_err(|e| StdpdfError::Transport(format!("failed to build HTTP client: {e}")))
}
