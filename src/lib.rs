//! lintkit - static-analysis checks that emit SARIF.
//!
//! - [`wikifmt`] - wiki-link, frontmatter, and tag checks for markdown
//! - [`report`] - append-only finding container shared by every check
//! - [`sarif`] - SARIF 2.1.0 log types and encoder
//! - [`config`] - optional `.lintkit.toml` settings
#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod report;
pub mod sarif;
pub mod wikifmt;

pub use config::Config;
pub use error::{Error, Result};
pub use report::{Finding, Level, Report, Rule};
