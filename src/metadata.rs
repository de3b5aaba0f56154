//! Project metadata: `pyproject.toml` descriptor plus caller overrides

use std::collections::BTreeMap;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{DocError, Result};

pub const DESCRIPTOR_FILE: &str = "pyproject.toml";

/// Caller-supplied metadata; each set field replaces the descriptor value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataOverrides {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Entry script files, relative to the project root
    pub scripts: Option<Vec<String>>,
    /// Directory holding the packages, relative to the project root
    pub package_dir: Option<String>,
    /// Dotted package names to document
    pub packages: Option<Vec<String>>,
}

/// Values read from `pyproject.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub entry_points: BTreeMap<String, String>,
    pub scripts: Option<Vec<String>>,
    pub package_dir: Option<String>,
    pub packages: Option<Vec<String>>,
}

impl Descriptor {
    /// Reads the descriptor from the project root; `None` when absent.
    pub fn read(root: &Path) -> Result<Option<Self>> {
        let path = root.join(DESCRIPTOR_FILE);
        if !path.is_file() {
            debug!("No {} in {}", DESCRIPTOR_FILE, root.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))?;
        Self::parse(&content).map(Some)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let toml: toml::Value = content.parse().map_err(|e: toml::de::Error| {
            DocError::config_with_detail(format!("invalid {}", DESCRIPTOR_FILE), e.to_string())
        })?;

        let mut descriptor = Descriptor::default();

        for section in [&["project"][..], &["tool", "poetry"][..]] {
            let Some(table) = lookup(&toml, section) else {
                continue;
            };
            let prefix = section.join(".");
            descriptor.name = descriptor.name.or(string_at(table, &prefix, "name")?);
            descriptor.version = descriptor.version.or(string_at(table, &prefix, "version")?);
            descriptor.description = descriptor
                .description
                .or(string_at(table, &prefix, "description")?);
            if descriptor.entry_points.is_empty() {
                descriptor.entry_points = string_table_at(table, &prefix, "scripts")?;
            }
        }

        if let Some(setuptools) = lookup(&toml, &["tool", "setuptools"]) {
            let prefix = "tool.setuptools";
            descriptor.scripts = string_list_at(setuptools, prefix, "script-files")?;
            descriptor.packages = match setuptools.get("packages") {
                // `packages = { find = { ... } }` asks for auto-discovery
                Some(toml::Value::Table(_)) => None,
                _ => string_list_at(setuptools, prefix, "packages")?,
            };
            descriptor.package_dir = string_table_at(setuptools, prefix, "package-dir")?
                .remove("");
        }

        if let Some(poetry) = lookup(&toml, &["tool", "poetry"]) {
            let (packages, package_dir) = poetry_packages(poetry)?;
            descriptor.packages = descriptor.packages.or(packages);
            descriptor.package_dir = descriptor.package_dir.or(package_dir);
        }

        Ok(descriptor)
    }
}

/// Metadata after applying overrides to the descriptor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub entry_points: BTreeMap<String, String>,
    pub scripts: Vec<String>,
    pub package_dir: Option<String>,
    pub packages: Option<Vec<String>>,
}

impl Metadata {
    pub fn resolve(descriptor: Option<Descriptor>, overrides: &MetadataOverrides) -> Self {
        let descriptor = descriptor.unwrap_or_default();
        Self {
            name: overrides.name.clone().or(descriptor.name),
            version: overrides.version.clone().or(descriptor.version),
            description: descriptor.description,
            entry_points: descriptor.entry_points,
            scripts: overrides
                .scripts
                .clone()
                .or(descriptor.scripts)
                .unwrap_or_default(),
            package_dir: overrides.package_dir.clone().or(descriptor.package_dir),
            packages: overrides.packages.clone().or(descriptor.packages),
        }
    }

    /// Rejects layouts that cannot be built: empty names, scripts that are
    /// not Python files or that live inside a selected package, and package
    /// directories escaping the project root.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [("name", &self.name), ("version", &self.version)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(DocError::config(format!("`{}` must not be empty", key)));
            }
        }

        if let Some(package_dir) = &self.package_dir {
            let path = Path::new(package_dir);
            if path.is_absolute()
                || path.components().any(|c| matches!(c, Component::ParentDir))
            {
                return Err(DocError::config_with_detail(
                    "`package_dir` must be a relative path inside the project",
                    package_dir.clone(),
                ));
            }
        }

        if let Some(packages) = &self.packages {
            if packages.iter().any(|p| p.split('.').any(|part| part.trim().is_empty())) {
                return Err(DocError::config_with_detail(
                    "`packages` contains an empty package name",
                    packages.join(", "),
                ));
            }
        }

        for script in &self.scripts {
            if script.trim().is_empty() {
                return Err(DocError::config("`scripts` contains an empty entry"));
            }
            if !script.ends_with(".py") {
                return Err(DocError::config_with_detail(
                    "entry scripts must be Python source files",
                    script.clone(),
                ));
            }
            if let Some(package) = self.owning_package(script) {
                return Err(DocError::config_with_detail(
                    format!("script is inside package `{}`", package),
                    script.clone(),
                ));
            }
        }

        Ok(())
    }

    /// Distinct top-level names of the selected packages, in listing order.
    pub fn top_level_packages(&self) -> Option<Vec<String>> {
        let packages = self.packages.as_ref()?;
        let mut tops: Vec<String> = Vec::new();
        for package in packages {
            let top = package.split('.').next().unwrap_or(package).trim();
            if !tops.iter().any(|t| t == top) {
                tops.push(top.to_string());
            }
        }
        Some(tops)
    }

    fn owning_package(&self, script: &str) -> Option<String> {
        let script = Path::new(script);
        let base = Path::new(self.package_dir.as_deref().unwrap_or(""));
        self.top_level_packages()?
            .into_iter()
            .find(|top| script.starts_with(base.join(top)))
    }

    /// Opaque key/value form attached to the project.
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        let strings = [
            ("name", &self.name),
            ("version", &self.version),
            ("description", &self.description),
            ("package_dir", &self.package_dir),
        ];
        for (key, value) in strings {
            if let Some(value) = value {
                map.insert(key.to_string(), Value::String(value.clone()));
            }
        }

        if !self.entry_points.is_empty() {
            let entries = self
                .entry_points
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            map.insert("entry_points".to_string(), Value::Object(entries));
        }
        if !self.scripts.is_empty() {
            map.insert("scripts".to_string(), string_array(&self.scripts));
        }
        if let Some(packages) = &self.packages {
            map.insert("packages".to_string(), string_array(packages));
        }
        map
    }
}

fn string_array(values: &[String]) -> Value {
    Value::Array(values.iter().cloned().map(Value::String).collect())
}

fn lookup<'v>(value: &'v toml::Value, path: &[&str]) -> Option<&'v toml::Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

fn type_error(prefix: &str, key: &str, expected: &str) -> DocError {
    DocError::config(format!("`{}.{}` must be {}", prefix, key, expected))
}

fn string_at(table: &toml::Value, prefix: &str, key: &str) -> Result<Option<String>> {
    match table.get(key) {
        None => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(type_error(prefix, key, "a string")),
    }
}

fn string_list_at(table: &toml::Value, prefix: &str, key: &str) -> Result<Option<Vec<String>>> {
    let Some(value) = table.get(key) else {
        return Ok(None);
    };
    let items = value
        .as_array()
        .ok_or_else(|| type_error(prefix, key, "an array of strings"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| type_error(prefix, key, "an array of strings"))
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

fn string_table_at(table: &toml::Value, prefix: &str, key: &str) -> Result<BTreeMap<String, String>> {
    let Some(value) = table.get(key) else {
        return Ok(BTreeMap::new());
    };
    let entries = value
        .as_table()
        .ok_or_else(|| type_error(prefix, key, "a table of strings"))?;

    entries
        .iter()
        .map(|(name, item)| {
            item.as_str()
                .map(|s| (name.clone(), s.to_string()))
                .ok_or_else(|| type_error(prefix, key, "a table of strings"))
        })
        .collect()
}

/// `[tool.poetry] packages = [{ include = "pkg", from = "src" }]`
fn poetry_packages(poetry: &toml::Value) -> Result<(Option<Vec<String>>, Option<String>)> {
    let Some(value) = poetry.get("packages") else {
        return Ok((None, None));
    };
    let entries = value
        .as_array()
        .ok_or_else(|| type_error("tool.poetry", "packages", "an array of tables"))?;

    let mut packages = Vec::new();
    let mut package_dir = None;
    for entry in entries {
        let include = entry
            .get("include")
            .and_then(toml::Value::as_str)
            .ok_or_else(|| type_error("tool.poetry", "packages", "tables with an `include` string"))?;
        packages.push(include.trim_matches('/').replace('/', "."));

        if package_dir.is_none() {
            package_dir = string_at(entry, "tool.poetry.packages", "from")?;
        }
    }

    Ok((Some(packages), package_dir))
}
