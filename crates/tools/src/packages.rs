//! Role-based capability packages and the gate that applies them.

use crate::registry::{ToolRegistry, LIST_TOOL_PACKAGES};
use now_mcp_core::ConfigError;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

/// Reserved package exposing every registered tool.
pub const FULL_PACKAGE: &str = "full";
/// Reserved package exposing only the introspection tool.
pub const NONE_PACKAGE: &str = "none";

/// Declarative package name → tool names mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageCatalog {
    packages: BTreeMap<String, BTreeSet<String>>,
}

impl PackageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a package, replacing and returning any earlier definition
    /// under the same trimmed name. Reserved names are ignored.
    pub fn define<I, S>(&mut self, name: &str, tools: I) -> Option<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.trim();
        if is_reserved(name) {
            warn!("Ignoring declaration of reserved package '{}'", name);
            return None;
        }
        let previous = self
            .packages
            .insert(name.to_string(), tools.into_iter().map(Into::into).collect());
        if previous.is_some() {
            warn!("Package '{}' is declared more than once; keeping the last", name);
        }
        previous
    }

    /// Loads a YAML catalog. A missing file yields an empty catalog.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!(
                "Package config {} not found; only '{}' and '{}' are available",
                path.display(),
                FULL_PACKAGE,
                NONE_PACKAGE
            );
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_yaml(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Loaded {} tool packages from {}",
            catalog.packages.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parses `package: [tool, ...]` YAML. A package with no list is empty.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        let raw: BTreeMap<String, Option<Vec<String>>> = serde_yaml::from_str(content)?;
        let mut catalog = Self::new();
        for (name, tools) in raw {
            catalog.define(&name, tools.unwrap_or_default());
        }
        Ok(catalog)
    }

    pub fn get(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.packages.get(name)
    }

    /// Every selectable package name, reserved ones included, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.packages.keys().cloned().collect();
        names.insert(FULL_PACKAGE.to_string());
        names.insert(NONE_PACKAGE.to_string());
        names.into_iter().collect()
    }

    /// Computes the exposed tool set for a package selector.
    ///
    /// Unset or empty selects `full`; an unknown name falls back to `none`.
    /// Declared tools with no implementation are dropped with a warning.
    pub fn resolve(&self, selector: Option<&str>, registry: &ToolRegistry) -> ExposedToolSet {
        let requested = selector.map(str::trim).filter(|s| !s.is_empty());

        let (package, names) = match requested {
            None | Some(FULL_PACKAGE) => (FULL_PACKAGE, registry.names().into_iter().collect()),
            Some(NONE_PACKAGE) => (NONE_PACKAGE, introspection_only()),
            Some(name) => match self.packages.get(name) {
                Some(declared) => {
                    let mut names = introspection_only();
                    for tool in declared {
                        if registry.contains(tool) {
                            names.insert(tool.clone());
                        } else {
                            warn!(
                                "Package '{}' lists unknown tool '{}'; dropping it",
                                name, tool
                            );
                        }
                    }
                    (name, names)
                }
                None => {
                    warn!(
                        "Unknown tool package '{}'; exposing only {}",
                        name, LIST_TOOL_PACKAGES
                    );
                    (NONE_PACKAGE, introspection_only())
                }
            },
        };

        info!("Package '{}' exposes {} tools", package, names.len());
        ExposedToolSet {
            package: package.to_string(),
            requested: requested.map(str::to_string),
            names,
        }
    }
}

fn is_reserved(name: &str) -> bool {
    name == FULL_PACKAGE || name == NONE_PACKAGE
}

fn introspection_only() -> BTreeSet<String> {
    BTreeSet::from([LIST_TOOL_PACKAGES.to_string()])
}

/// Tool names reachable in this process. Computed once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposedToolSet {
    package: String,
    requested: Option<String>,
    names: BTreeSet<String>,
}

impl ExposedToolSet {
    /// The package actually in effect (`none` after an unknown selector).
    pub fn package(&self) -> &str {
        &self.package
    }

    /// The selector as configured, if any.
    pub fn requested(&self) -> Option<&str> {
        self.requested.as_deref()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml() {
        let catalog = PackageCatalog::from_yaml(
            "reporting:\n  - list_incidents\n  - get_article\nempty:\n",
        )
        .unwrap();

        assert_eq!(catalog.get("reporting").unwrap().len(), 2);
        assert!(catalog.get("empty").unwrap().is_empty());
        assert_eq!(catalog.names(), ["empty", "full", "none", "reporting"]);
    }

    #[test]
    fn test_reserved_declarations_ignored() {
        let catalog =
            PackageCatalog::from_yaml("full:\n  - list_incidents\nnone:\n  - get_article\n")
                .unwrap();
        assert!(catalog.get(FULL_PACKAGE).is_none());
        assert!(catalog.get(NONE_PACKAGE).is_none());
    }

    #[test]
    fn test_redefinition_returns_previous() {
        let mut catalog = PackageCatalog::new();
        assert!(catalog.define("reporting", ["list_incidents"]).is_none());

        let previous = catalog.define(" reporting ", ["get_article"]).unwrap();
        assert!(previous.contains("list_incidents"));
        assert_eq!(
            catalog.get("reporting").unwrap(),
            &BTreeSet::from(["get_article".to_string()])
        );
        assert_eq!(catalog.names(), ["full", "none", "reporting"]);
    }

    #[test]
    fn test_yaml_keys_colliding_after_trim() {
        // " reporting" sorts first, so the bare key is applied last.
        let yaml = "\" reporting\":\n  - get_article\nreporting:\n  - list_incidents\n";
        let catalog = PackageCatalog::from_yaml(yaml).unwrap();
        assert_eq!(
            catalog.get("reporting").unwrap(),
            &BTreeSet::from(["list_incidents".to_string()])
        );
    }

    #[test]
    fn test_invalid_yaml_shape() {
        assert!(PackageCatalog::from_yaml("- just\n- a list\n").is_err());
        assert!(PackageCatalog::from_yaml("reporting: 3\n").is_err());
    }

    #[test]
    fn test_empty_document_is_empty_catalog() {
        assert_eq!(PackageCatalog::from_yaml("  \n").unwrap(), PackageCatalog::new());
    }
}
