//! Object model builder.
//!
//! A [`ConfigBuilder`] owns the aggregate under construction and an explicit
//! [`BuildContext`] naming the instance, sync group or script that nested
//! keywords apply to. Keyword handlers live in the submodules, one per kind
//! of block; the [`keywords`](crate::keywords) table routes lines to them.
//!
//! # Preconditions
//!
//! The builder does not track braces itself. It relies on the
//! [`BlockSource`] delivering lines in file order with well-formed nesting.
//! A nested keyword that arrives with no entity in context is reported and
//! ignored.

mod instance;
mod script;
mod statics;
mod sync_group;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use crate::configuration::Configuration;
use crate::diagnostics::Diagnostics;
use crate::keywords;
use crate::source::{BOB, BlockSource, EOB, TextSource, tokenize};
use crate::types::VRRP_MAX_VIP;

/// Source of "now" for timestamps derived while loading
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock based on [`Instant::now`]
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Answers whether a network interface exists
#[cfg_attr(test, mockall::automock)]
pub trait InterfaceResolver {
    fn exists(&self, name: &str) -> bool;
}

/// Accepts every interface name
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyInterface;

impl InterfaceResolver for AnyInterface {
    fn exists(&self, _name: &str) -> bool {
        true
    }
}

/// Looks interfaces up in sysfs
#[derive(Debug, Clone)]
pub struct SystemInterfaces {
    root: PathBuf,
}

impl SystemInterfaces {
    pub fn new() -> Self {
        Self::with_root("/sys/class/net")
    }

    /// Use another directory laid out like `/sys/class/net`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SystemInterfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl InterfaceResolver for SystemInterfaces {
    fn exists(&self, name: &str) -> bool {
        !name.is_empty() && !name.contains('/') && self.root.join(name).exists()
    }
}

impl InterfaceResolver for HashSet<String> {
    fn exists(&self, name: &str) -> bool {
        self.contains(name)
    }
}

/// What the dispatcher does after a handler returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    /// Discard the block opened by the current line
    SkipBlock,
}

/// Entities nested keywords currently apply to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BuildContext {
    pub instance: Option<usize>,
    pub sync_group: Option<usize>,
    pub script: Option<usize>,
}

/// Result of one load
#[derive(Debug, Clone, Default)]
pub struct Build {
    pub config: Configuration,
    pub diagnostics: Diagnostics,
}

impl Build {
    /// Resolve sync-group members, appending any problems to the diagnostics.
    pub fn link_sync_groups(&mut self) {
        self.config.link_sync_groups(&mut self.diagnostics);
    }
}

/// Builds one [`Configuration`] from a [`BlockSource`].
///
/// The builder is consumed by [`load`](Self::load); a reload starts from a
/// fresh builder.
pub struct ConfigBuilder {
    config: Configuration,
    diagnostics: Diagnostics,
    context: BuildContext,
    clock: Box<dyn Clock>,
    interfaces: Box<dyn InterfaceResolver>,
    max_vips: usize,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Configuration::new(),
            diagnostics: Diagnostics::new(),
            context: BuildContext::default(),
            clock: Box::new(MonotonicClock),
            interfaces: Box::new(AnyInterface),
            max_vips: VRRP_MAX_VIP,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_interfaces(mut self, interfaces: impl InterfaceResolver + 'static) -> Self {
        self.interfaces = Box::new(interfaces);
        self
    }

    /// Capacity of each instance's virtual address list (at least 1)
    pub fn with_max_virtual_addresses(mut self, max: usize) -> Self {
        self.max_vips = max.max(1);
        self
    }

    /// Run the keyword dispatcher over `source` and return what was built.
    pub fn load(mut self, source: &mut dyn BlockSource) -> Build {
        keywords::dispatch(&mut self, source);

        info!(
            instances = self.config.instances.len(),
            sync_groups = self.config.sync_groups.len(),
            scripts = self.config.scripts.len(),
            diagnostics = self.diagnostics.len(),
            "Configuration loaded"
        );

        Build {
            config: self.config,
            diagnostics: self.diagnostics,
        }
    }

    pub fn load_str(self, text: &str) -> Build {
        self.load(&mut TextSource::new(text))
    }

    pub fn load_file(self, path: impl AsRef<Path>) -> common::Result<Build> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| common::Error::config_file(path, e))?;
        debug!(path = %path.display(), "Reading configuration");
        Ok(self.load_str(&text))
    }

    pub(crate) fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Called by the dispatcher when a top-level block closes.
    pub(crate) fn leave_root_block(&mut self) {
        self.context = BuildContext::default();
    }

    fn outside_of(&mut self, fields: &[String], block: &str) {
        self.diagnostics.error(
            None,
            format!("{} outside of a {block} block, ignoring", keyword(fields)),
        );
    }

    /// Position of the instance in context, reporting its absence.
    fn instance_in_scope(&mut self, fields: &[String]) -> Option<usize> {
        if self.context.instance.is_none() {
            self.outside_of(fields, "vrrp_instance");
        }
        self.context.instance
    }

    fn sync_group_in_scope(&mut self, fields: &[String]) -> Option<usize> {
        if self.context.sync_group.is_none() {
            self.outside_of(fields, "vrrp_sync_group");
        }
        self.context.sync_group
    }

    fn script_in_scope(&mut self, fields: &[String]) -> Option<usize> {
        if self.context.script.is_none() {
            self.outside_of(fields, "vrrp_script");
        }
        self.context.script
    }

    /// Read a free-form block up to its closing `}`.
    ///
    /// Each non-empty line comes back as its own field list.
    fn read_value_block(&mut self, source: &mut dyn BlockSource) -> Vec<Vec<String>> {
        let mut lines = Vec::new();

        while let Some(raw) = source.pull_raw_line() {
            let mut fields = tokenize(&raw);
            if fields.first().map(String::as_str) == Some(BOB) {
                fields.remove(0);
            }
            let closes = fields.last().map(String::as_str) == Some(EOB);
            if closes {
                fields.pop();
            }
            if !fields.is_empty() {
                lines.push(fields);
            }
            if closes {
                return lines;
            }
        }

        self.diagnostics
            .error(None, "unexpected end of configuration inside a value block");
        lines
    }
}

/// Keyword of a line
fn keyword(fields: &[String]) -> &str {
    fields.first().map(String::as_str).unwrap_or_default()
}

/// First argument of a line
fn arg(fields: &[String]) -> Option<&str> {
    fields.get(1).map(String::as_str)
}

/// All arguments joined by a space, for commands and other free text
fn joined_value(fields: &[String]) -> Option<String> {
    match fields.get(1..) {
        Some(rest) if !rest.is_empty() => Some(rest.join(" ")),
        _ => None,
    }
}

/// A line with exactly one name argument
fn block_name(fields: &[String]) -> Option<&str> {
    match fields {
        [_, name] => Some(name.as_str()),
        _ => None,
    }
}
