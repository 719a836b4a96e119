//! Deployment-kit provisioner library.
//!
//! This crate provides the core functionality for resolving, fetching,
//! verifying, extracting, and installing a deployment kit. It is used by
//! the `depkit-installer` CLI binary and can be consumed programmatically
//! for testing or custom provisioning workflows.
//!
//! # Modules
//!
//! - [`archive`] - Kit archive extraction, dispatched on a closed format tag
//! - [`cli`] - Command-line argument definitions
//! - [`dirs`] - Platform base-directory resolution
//! - [`download`] - Idempotent, crash-safe kit download
//! - [`error`] - Semantic error types with hard-stop classification
//! - [`install`] - External package-installer collaborator
//! - [`output`] - Progress message formatting and the stderr observer
//! - [`provision`] - Top-level pipeline orchestration and completion log
//! - [`remover`] - Robust recursive directory removal via mirroring
//! - [`resolver`] - Redirect-chain URL resolution
//! - [`runner`] - Native command execution with exit-code predicates
//! - [`signature`] - Publisher signature verification
//! - `test_utils` - Stub command runners (behind the `test-support` feature)

pub mod archive;
pub mod cli;
pub mod dirs;
pub mod download;
pub mod error;
pub mod install;
pub mod output;
pub mod provision;
pub mod remover;
pub mod resolver;
pub mod runner;
pub mod signature;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
