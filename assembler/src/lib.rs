//! Docs assembler library.
//!
//! This crate packages a project's documentation directories into a
//! `<artifactId>-<version>-docs.jar` archive, optionally token-filtering the
//! sources first, attaches the archive to the build, and can install it into
//! a local artifact repository. It is used by the `docs-assembler` CLI binary
//! and can be consumed programmatically for testing or custom build flows.
//!
//! # Modules
//!
//! - [`archive`] - Zip archive creation from source directories
//! - [`assembler`] - The resolve, filter, archive and attach pipeline
//! - [`attach`] - Recording the archive as a build output
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `docs.toml` descriptor loading
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types
//! - [`failure`] - Per-file fault records
//! - [`filter`] - Token filtering into a staging directory
//! - [`goals`] - The `assemble` and `install` goals
//! - [`install`] - Local repository installation
//! - [`naming`] - Archive naming policy
//! - [`project`] - Project coordinates and layout
//! - [`resolver`] - Source directory resolution and validation
//! - [`test_runner`] - Running a named test before installation

pub mod archive;
pub mod assembler;
pub mod attach;
pub mod cli;
pub mod config;
pub mod dirs;
pub mod error;
pub mod failure;
pub mod filter;
pub mod goals;
pub mod install;
pub mod naming;
pub mod project;
pub mod resolver;
pub mod test_runner;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
