//! Redirect-chain resolution for download URLs.
//!
//! Vendor download links are routinely fronted by several redirect hops.
//! This module follows the `Location` chain manually, with the HTTP
//! client's own redirect handling disabled, so the terminal URL can be
//! reported and the chain depth bounded.

use crate::error::{ProvisionError, Result};
use std::sync::OnceLock;
use std::time::Duration;

/// Maximum number of redirect hops followed before giving up.
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Network timeout for resolution probes.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// The status and `Location` header of a single probe response.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    /// The HTTP status code of the response.
    pub status: u16,
    /// The `Location` header value, if present.
    pub location: Option<String>,
}

/// Trait for issuing lightweight HEAD-style probes, enabling test mocking.
#[cfg_attr(test, mockall::automock)]
pub trait RedirectProbe {
    /// Issues a single probe without following redirects.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::Network`] on transport failure.
    fn head(&self, url: &str) -> Result<ProbeResponse>;
}

/// Production probe using `ureq` with redirect-following disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpProbe;

impl RedirectProbe for HttpProbe {
    fn head(&self, url: &str) -> Result<ProbeResponse> {
        let response =
            probe_agent()
                .head(url)
                .call()
                .map_err(|e| ProvisionError::Network {
                    url: url.to_owned(),
                    reason: e.to_string(),
                })?;
        let location = response
            .headers()
            .get("location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Ok(ProbeResponse {
            status: response.status().as_u16(),
            location,
        })
    }
}

/// Shared `ureq` agent configured to surface redirect responses as-is.
fn probe_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(PROBE_TIMEOUT))
            .max_redirects(0)
            .max_redirects_will_error(false)
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Follows the redirect chain from `url` to its terminal resource.
///
/// Each redirect's `Location` is absolutized against the URL that produced
/// it, so relative and scheme-relative targets resolve correctly.
///
/// # Errors
///
/// - [`ProvisionError::TooManyRedirects`] when the chain exceeds
///   [`MAX_REDIRECT_HOPS`].
/// - [`ProvisionError::ResolutionFailed`] on a terminal non-success status
///   or a redirect lacking a `Location` header.
/// - [`ProvisionError::Network`] on transport failure, immediately and
///   without retry.
pub fn resolve(probe: &dyn RedirectProbe, url: &str) -> Result<String> {
    let mut current = url.to_owned();
    let mut hops = 0usize;

    loop {
        let response = probe.head(&current)?;

        if is_success(response.status) {
            log::trace!("{url} resolved to {current} after {hops} hop(s)");
            return Ok(current);
        }

        if !is_redirect(response.status) {
            return Err(ProvisionError::ResolutionFailed {
                url: url.to_owned(),
                status: response.status,
            });
        }

        hops += 1;
        if hops > MAX_REDIRECT_HOPS {
            return Err(ProvisionError::TooManyRedirects {
                url: url.to_owned(),
                limit: MAX_REDIRECT_HOPS,
            });
        }

        let Some(location) = response.location else {
            return Err(ProvisionError::ResolutionFailed {
                url: url.to_owned(),
                status: response.status,
            });
        };
        current = absolutize(&current, &location);
    }
}

const fn is_success(status: u16) -> bool {
    status >= 200 && status < 300
}

const fn is_redirect(status: u16) -> bool {
    status >= 300 && status < 400
}

/// Resolves a `Location` header value against the URL that produced it.
///
/// Handles the four forms seen in practice: full URLs, scheme-relative
/// (`//host/path`), absolute-path (`/path`), and relative (`path`).
fn absolutize(base: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        return location.to_owned();
    }
    if let Some(rest) = location.strip_prefix("//") {
        let scheme = base.split("://").next().unwrap_or("https");
        return format!("{scheme}://{rest}");
    }
    if location.starts_with('/') {
        return format!("{}{location}", origin(base));
    }
    // Relative: replace everything after the last path separator.
    let trimmed = base.rsplit_once('/').map_or(base, |(head, _)| head);
    // Never truncate into the authority ("http:/" prefix).
    if trimmed.ends_with(':') || trimmed.ends_with("//") || !trimmed.contains("://") {
        format!("{}/{location}", origin(base))
    } else {
        format!("{trimmed}/{location}")
    }
}

/// Returns the scheme and authority of a URL, without any path.
fn origin(url: &str) -> &str {
    let Some(scheme_end) = url.find("://") else {
        return url;
    };
    let after_scheme = scheme_end + 3;
    match url[after_scheme..].find('/') {
        Some(path_start) => &url[..after_scheme + path_start],
        None => url,
    }
}
