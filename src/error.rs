//! Error types for the deployment-kit provisioner.
//!
//! This module defines semantic error variants carrying enough context
//! (original URL, observed status, offending path, exit code) for the caller
//! to log a precise message. Two variants are hard stops: the binary maps
//! them to a distinct exit code rather than the generic failure code.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while provisioning a deployment kit.
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// A redirect chain exceeded the maximum permitted depth.
    #[error("redirect chain for {url} exceeded {limit} hops")]
    TooManyRedirects {
        /// The original URL whose chain was being followed.
        url: String,
        /// The maximum number of redirect hops permitted.
        limit: usize,
    },

    /// URL resolution terminated on a non-success, non-redirect response.
    #[error("could not resolve {url}: terminal status {status}")]
    ResolutionFailed {
        /// The original URL that failed to resolve.
        url: String,
        /// The offending HTTP status code.
        status: u16,
    },

    /// A network-level failure occurred before any usable response arrived.
    #[error("network error for {url}: {reason}")]
    Network {
        /// The URL being requested when the failure occurred.
        url: String,
        /// Description of the transport failure.
        reason: String,
    },

    /// A file expected on disk was not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path where the file was expected.
        path: Utf8PathBuf,
    },

    /// Publisher signature verification did not report a valid signature.
    #[error("signature verification failed for {path}: {status}")]
    SignatureInvalid {
        /// Path to the file that failed verification (deleted by the time
        /// this error is observed).
        path: Utf8PathBuf,
        /// The verification status reported by the checker.
        status: String,
    },

    /// The archive's file-type marker matched no supported format.
    ///
    /// Hard stop: the binary terminates with a distinct non-zero exit code.
    #[error("unsupported archive type {extension:?} for {path}")]
    UnsupportedArchiveType {
        /// Path to the unrecognized archive.
        path: Utf8PathBuf,
        /// The file extension that failed to dispatch.
        extension: String,
    },

    /// A native command's exit code was rejected by the success predicate.
    ///
    /// Hard stop: the binary terminates with a distinct non-zero exit code.
    #[error("command `{command}` failed: expected {expectation}, got exit code {code}")]
    CommandFailed {
        /// The command line that was executed.
        command: String,
        /// Description of the success predicate that rejected the code.
        expectation: String,
        /// The exit code actually observed (-1 when terminated by signal).
        code: i32,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// Returns `true` for errors the binary must treat as hard stops.
    ///
    /// Unsupported archive types and rejected native-command exit codes
    /// terminate the process with a distinct non-zero exit code; every
    /// other error propagates as an ordinary failure.
    #[must_use]
    pub const fn is_hard_stop(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedArchiveType { .. } | Self::CommandFailed { .. }
        )
    }
}

impl Clone for ProvisionError {
    fn clone(&self) -> Self {
        match self {
            Self::TooManyRedirects { url, limit } => Self::TooManyRedirects {
                url: url.clone(),
                limit: *limit,
            },
            Self::ResolutionFailed { url, status } => Self::ResolutionFailed {
                url: url.clone(),
                status: *status,
            },
            Self::Network { url, reason } => Self::Network {
                url: url.clone(),
                reason: reason.clone(),
            },
            Self::FileNotFound { path } => Self::FileNotFound { path: path.clone() },
            Self::SignatureInvalid { path, status } => Self::SignatureInvalid {
                path: path.clone(),
                status: status.clone(),
            },
            Self::UnsupportedArchiveType { path, extension } => Self::UnsupportedArchiveType {
                path: path.clone(),
                extension: extension.clone(),
            },
            Self::CommandFailed {
                command,
                expectation,
                code,
            } => Self::CommandFailed {
                command: command.clone(),
                expectation: expectation.clone(),
                code: *code,
            },
            // Lossy: only ErrorKind and formatted message are preserved
            // because std::io::Error cannot be cloned directly.
            Self::Io(source) => Self::Io(std::io::Error::new(source.kind(), source.to_string())),
        }
    }
}

/// Result type alias using [`ProvisionError`].
pub type Result<T> = std::result::Result<T, ProvisionError>;
