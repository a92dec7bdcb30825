//! Checker for keepalived-style VRRP configuration files
//!
//! Loads a configuration with [`vrrp_config`], links sync groups and renders
//! the resulting object model with its diagnostics.

pub mod report;
pub mod settings;

use std::path::Path;

use tracing::info;
use vrrp_config::Build;

pub use report::{ReportFormat, render};
pub use settings::{Settings, SettingsError};

/// Outcome of checking one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    /// Only informational diagnostics
    Warnings,
    Errors,
}

impl Verdict {
    pub fn of(build: &Build) -> Self {
        if build.diagnostics.errors().next().is_some() {
            Verdict::Errors
        } else if build.diagnostics.is_empty() {
            Verdict::Clean
        } else {
            Verdict::Warnings
        }
    }
}

/// Load and link the configuration at `path`.
pub fn check_file(settings: &Settings, path: impl AsRef<Path>) -> common::Result<Build> {
    let path = path.as_ref();
    let mut build = settings.config_builder().load_file(path)?;
    build.link_sync_groups();

    info!(
        path = %path.display(),
        instances = build.config.instances.len(),
        verdict = ?Verdict::of(&build),
        "Configuration checked"
    );
    Ok(build)
}
