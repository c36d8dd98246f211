//! The host collaborators the options resolver reads from: a hierarchical configuration source
//! and the environment that relative paths are resolved against.
use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::Context;
use dyn_clone::DynClone;
use serde_json::{Map, Value};
use tracing::instrument;

use crate::RavenError;

/// Separator between nested keys in environment variable names, e.g.
/// `RavenSettings__DatabaseName`.
pub const ENVIRONMENT_KEY_SEPARATOR: &str = "__";

/// A hierarchical configuration the RavenDB settings section is bound from.
pub trait ConfigurationSource: DynClone + fmt::Debug + Send + Sync {
    /// Returns the section at `key`, or `None` if it doesn't exist.
    ///
    /// Nested sections are addressed with `:`, e.g. `Database:RavenSettings`. Keys are
    /// matched case-insensitively.
    fn section(&self, key: &str) -> Option<Value>;
}
dyn_clone::clone_trait_object!(ConfigurationSource);

/// The environment the application runs in.
pub trait HostEnvironment: DynClone + fmt::Debug + Send + Sync {
    /// The directory relative paths in configuration, like the certificate path, are resolved
    /// against.
    fn content_root_path(&self) -> &Path;
}
dyn_clone::clone_trait_object!(HostEnvironment);

/// A [`HostEnvironment`] rooted at a fixed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentRoot {
    path: PathBuf,
}

impl ContentRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_current_dir() -> Result<Self, RavenError> {
        let path = std::env::current_dir().context("Unable to determine the current directory")?;
        Ok(Self::new(path))
    }
}

impl HostEnvironment for ContentRoot {
    fn content_root_path(&self) -> &Path {
        &self.path
    }
}

/// Configuration backed by a JSON document, optionally overlaid with environment variables.
///
/// ```rust
/// use ravendb_dependency_injection::{ConfigurationSource, JsonConfiguration};
///
/// let configuration = JsonConfiguration::from_json_str(
///     r#"{ "RavenSettings": { "Urls": ["http://localhost:8080"], "DatabaseName": "Orders" } }"#,
/// )
/// .unwrap();
/// let section = configuration.section("ravensettings").unwrap();
/// assert_eq!(section["DatabaseName"], "Orders");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct JsonConfiguration {
    root: Value,
}

impl JsonConfiguration {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RavenError> {
        let root = serde_json::from_str(json).context("Configuration is not valid JSON")?;
        Ok(Self::from_value(root))
    }

    #[instrument(level = "debug", name = "Load JSON Configuration")]
    pub fn from_json_file(path: impl AsRef<Path> + fmt::Debug) -> Result<Self, RavenError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            tracing::error!("Unable to read configuration file. Caused by: {}", e);
            RavenError::ConfigurationFile {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })?;
        let root = serde_json::from_str(&contents).map_err(|e| {
            tracing::error!("Configuration file is not valid JSON. Caused by: {}", e);
            RavenError::ConfigurationFile {
                path: path.to_path_buf(),
                source: Box::new(e),
            }
        })?;
        Ok(Self::from_value(root))
    }

    /// Overlays every environment variable starting with `prefix`.
    ///
    /// The prefix is stripped and the rest of the name is split on `__` into a key path, so
    /// `APP_RavenSettings__DatabaseName` with prefix `APP_` sets `RavenSettings.DatabaseName`.
    /// Numeric segments index into arrays: `RavenSettings__Urls__0`.
    pub fn add_environment_variables(self, prefix: &str) -> Self {
        let variables = std::env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)));
        self.add_variables(prefix, variables)
    }

    fn add_variables(mut self, prefix: &str, variables: impl Iterator<Item = (String, String)>) -> Self {
        let mut overrides = variables
            .filter_map(|(key, value)| {
                let key = key.strip_prefix(prefix)?.to_string();
                Some((key, value))
            })
            .collect::<Vec<_>>();
        // Array elements can only be appended in order, so `Urls__2` has to follow `Urls__1`.
        overrides.sort_by_cached_key(|(key, _)| override_sort_key(key));

        for (key, value) in overrides {
            let segments = key
                .split(ENVIRONMENT_KEY_SEPARATOR)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>();
            if segments.is_empty() {
                continue;
            }
            tracing::trace!("Overriding configuration key `{}` from environment", key);
            set_path(&mut self.root, &segments, Value::String(value));
        }
        self
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

impl ConfigurationSource for JsonConfiguration {
    fn section(&self, key: &str) -> Option<Value> {
        key.split(':')
            .filter(|s| !s.is_empty())
            .try_fold(&self.root, |node, segment| get_child(node, segment))
            .cloned()
    }
}

/// Orders numeric segments by value and the rest case-insensitively.
fn override_sort_key(key: &str) -> Vec<(Option<u128>, String)> {
    key.split(ENVIRONMENT_KEY_SEPARATOR)
        .map(|segment| (segment.parse::<u128>().ok(), segment.to_ascii_lowercase()))
        .collect()
}

fn get_child<'a>(node: &'a Value, segment: &str) -> Option<&'a Value> {
    match node {
        Value::Object(map) => map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(segment))
            .map(|(_, v)| v),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Writes `value` at `segments`, creating objects and arrays along the way. Existing object
/// keys are matched case-insensitively so overrides replace, rather than shadow, file values.
fn set_path(node: &mut Value, segments: &[&str], value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if segment.bytes().all(|b| b.is_ascii_digit()) {
        let Ok(index) = segment.parse::<usize>() else {
            tracing::warn!("Ignoring configuration override at index {}.", segment);
            return;
        };
        if !node.is_array() {
            *node = Value::Array(Vec::new());
        }
        if let Value::Array(items) = node {
            // Only replace an element or append right after the last one.
            if index > items.len() {
                tracing::warn!(
                    "Ignoring configuration override at index {}. Array has {} elements.",
                    segment,
                    items.len()
                );
                return;
            }
            if index == items.len() {
                items.push(Value::Null);
            }
            set_path(&mut items[index], rest, value);
        }
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let key = map
            .keys()
            .find(|k| k.eq_ignore_ascii_case(segment))
            .cloned()
            .unwrap_or_else(|| segment.to_string());
        set_path(map.entry(key).or_insert(Value::Null), rest, value);
    }
}
