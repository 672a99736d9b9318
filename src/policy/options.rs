//! Resolution options and source collection metadata.
//!
//! ## Environment
//!
//! Host tools may configure a run through environment variables:
//! - `COMPONENT_SELECTOR`: `*` or comma-separated component names
//! - `IGNORE_CONFLICTS`: `true`/`1` lets the source claim unmapped consumer files
//! - `IGNORE_OVERRIDES`: `true`/`1` lets the source take files owned by others
//! - `COLLECTION_NAME` / `COLLECTION_VERSION`: override discovered package metadata

use serde::{Deserialize, Serialize};

/// Wildcard selector meaning "every component".
pub const SELECT_ALL: &str = "*";

/// Which source components an install is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComponentSelector {
    /// Every component in the source collection.
    All,
    /// Only the named components and their dependencies.
    Named(Vec<String>),
}

impl ComponentSelector {
    /// Parse a selector string.
    ///
    /// Absent, empty and `*` all select everything. Names are trimmed and
    /// empty segments dropped.
    pub fn parse(selector: Option<&str>) -> Self {
        match selector.map(str::trim) {
            None | Some("") | Some(SELECT_ALL) => Self::All,
            Some(list) => Self::Named(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
        }
    }

    /// Whether a selector narrows the install.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Named(_))
    }
}

impl Default for ComponentSelector {
    fn default() -> Self {
        Self::All
    }
}

impl std::fmt::Display for ComponentSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(SELECT_ALL),
            Self::Named(names) => f.write_str(&names.join(",")),
        }
    }
}

/// Options controlling conflict and override policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOptions {
    /// `*` or comma-separated component names. `None` selects everything.
    #[serde(default)]
    pub component_selector: Option<String>,
    /// Let the source claim consumer files that have no recorded owner.
    #[serde(default)]
    pub ignore_conflicts: bool,
    /// Let the source take files already owned by another collection.
    #[serde(default)]
    pub ignore_overrides: bool,
}

impl ResolutionOptions {
    /// Options with default policy and no selector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the install to a selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.component_selector = Some(selector.into());
        self
    }

    /// Set the conflict policy.
    pub fn ignore_conflicts(mut self, ignore: bool) -> Self {
        self.ignore_conflicts = ignore;
        self
    }

    /// Set the override policy.
    pub fn ignore_overrides(mut self, ignore: bool) -> Self {
        self.ignore_overrides = ignore;
        self
    }

    /// Parsed form of the selector.
    pub fn selector(&self) -> ComponentSelector {
        ComponentSelector::parse(self.component_selector.as_deref())
    }

    /// Read options from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read options from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            component_selector: lookup("COMPONENT_SELECTOR"),
            ignore_conflicts: lookup("IGNORE_CONFLICTS").map_or(false, |v| parse_flag(&v)),
            ignore_overrides: lookup("IGNORE_OVERRIDES").map_or(false, |v| parse_flag(&v)),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Identity of the collection being installed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Package name; becomes the owner name in the manifest.
    pub name: Option<String>,
    /// Package version.
    pub version: Option<String>,
    /// Last commit hash, if the collection is under version control.
    pub commit: Option<String>,
}

impl CollectionInfo {
    /// Create collection info from discovered metadata.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            version: Some(version.into()),
            commit: None,
        }
    }

    /// Attach a commit hash.
    pub fn with_commit(mut self, commit: impl Into<String>) -> Self {
        self.commit = Some(commit.into());
        self
    }

    /// Apply `COLLECTION_NAME` / `COLLECTION_VERSION` from the environment.
    pub fn from_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply name and version overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("COLLECTION_NAME").filter(|v| !v.is_empty()) {
            self.name = Some(name);
        }
        if let Some(version) = lookup("COLLECTION_VERSION").filter(|v| !v.is_empty()) {
            self.version = Some(version);
        }
        self
    }
}
