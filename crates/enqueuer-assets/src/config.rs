//! Validated configuration for assets and packages.
//!
//! Configuration arrives either through the typed builders below or as a loosely
//! typed `serde_json` map (for example, a package catalog read by the caller).
//! Both end up as an [`AssetConfig`] / [`PackageConfig`], which entities apply
//! through [`Configurable`].

use std::fmt;
use std::sync::Arc;

use enqueuer_core::alloc::IndexMap;
use serde_json::{Map, Value};

use crate::area::{Area, Position};
use crate::error::{AssetError, AssetResult};
use crate::settings::UnknownKeys;

/// Extra HTML attributes for a style tag, in application order.
pub type Attributes = IndexMap<String, String>;

/// Build an [`Attributes`] map from key/value pairs.
pub fn attributes<I, K, V>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Split a comma-delimited dependency list.
pub fn split_dependencies(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|dep| !dep.is_empty())
        .map(String::from)
        .collect()
}

/// A value given either literally or as a zero-argument producer.
///
/// Producers run where the value is received (the setter or `configure` call),
/// never later.
#[derive(Clone)]
pub enum Deferred<T> {
    Literal(T),
    Producer(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Deferred<T> {
    /// Wrap a producer.
    pub fn from_fn(producer: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Deferred::Producer(Arc::new(producer))
    }

    /// Produce the value.
    pub fn resolve(&self) -> T {
        match self {
            Deferred::Literal(value) => value.clone(),
            Deferred::Producer(producer) => producer(),
        }
    }
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Deferred::Literal(value)
    }
}

impl From<&str> for Deferred<String> {
    fn from(value: &str) -> Self {
        Deferred::Literal(value.to_string())
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deferred::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Deferred::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl<T: PartialEq> PartialEq for Deferred<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Deferred::Literal(a), Deferred::Literal(b)) => a == b,
            (Deferred::Producer(a), Deferred::Producer(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Entities that accept an [`AssetConfig`].
pub trait Configurable {
    /// Apply every option relevant to this entity. Options that belong to a
    /// different asset kind are ignored.
    fn configure(&mut self, config: &AssetConfig);
}

/// Every recognized asset option. Unset fields keep the entity's defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetConfig {
    pub path: Option<String>,
    pub base: Option<String>,
    pub version: Option<String>,
    /// Area name. Kept raw so that an unrecognized name surfaces when the asset is
    /// scheduled rather than disappearing here.
    pub area: Option<String>,
    pub dependency: Option<Vec<String>>,
    pub position: Option<Position>,
    pub inline: Option<Deferred<String>>,
    pub footer: Option<bool>,
    pub is_async: Option<bool>,
    pub defer: Option<bool>,
    pub localize: Option<IndexMap<String, Deferred<Value>>>,
    pub media: Option<String>,
    pub attribute: Option<Deferred<Attributes>>,
}

impl AssetConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.area = Some(area.name().to_string());
        self
    }

    pub fn dependency<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency = Some(deps.into_iter().map(Into::into).collect());
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    pub fn inline(mut self, inline: impl Into<Deferred<String>>) -> Self {
        self.inline = Some(inline.into());
        self
    }

    pub fn footer(mut self, footer: bool) -> Self {
        self.footer = Some(footer);
        self
    }

    pub fn is_async(mut self, is_async: bool) -> Self {
        self.is_async = Some(is_async);
        self
    }

    pub fn defer(mut self, defer: bool) -> Self {
        self.defer = Some(defer);
        self
    }

    /// Add localized data under `object`. Later calls with the same object overwrite.
    pub fn localize(mut self, object: impl Into<String>, data: impl Into<Deferred<Value>>) -> Self {
        self.localize
            .get_or_insert_with(IndexMap::default)
            .insert(object.into(), data.into());
        self
    }

    pub fn media(mut self, media: impl Into<String>) -> Self {
        self.media = Some(media.into());
        self
    }

    pub fn attribute(mut self, attribute: impl Into<Deferred<Attributes>>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Fill every unset field from `defaults`. Values already set win.
    pub fn with_defaults(mut self, defaults: &AssetConfig) -> Self {
        fn fill<T: Clone>(slot: &mut Option<T>, default: &Option<T>) {
            if slot.is_none() {
                slot.clone_from(default);
            }
        }

        fill(&mut self.path, &defaults.path);
        fill(&mut self.base, &defaults.base);
        fill(&mut self.version, &defaults.version);
        fill(&mut self.area, &defaults.area);
        fill(&mut self.dependency, &defaults.dependency);
        fill(&mut self.position, &defaults.position);
        fill(&mut self.inline, &defaults.inline);
        fill(&mut self.footer, &defaults.footer);
        fill(&mut self.is_async, &defaults.is_async);
        fill(&mut self.defer, &defaults.defer);
        fill(&mut self.localize, &defaults.localize);
        fill(&mut self.media, &defaults.media);
        fill(&mut self.attribute, &defaults.attribute);
        self
    }

    /// Parse a loosely typed value. A bare string is shorthand for `{"path": ...}`.
    pub fn from_value(value: &Value, policy: UnknownKeys) -> AssetResult<Self> {
        match value {
            Value::String(path) => Ok(AssetConfig::new().path(path.as_str())),
            Value::Object(map) => Self::from_map(map, policy),
            _ => Err(AssetError::InvalidOption {
                key: "path".to_string(),
                expected: "a path string or an option map",
            }),
        }
    }

    /// Parse an option map.
    pub fn from_map(map: &Map<String, Value>, policy: UnknownKeys) -> AssetResult<Self> {
        let mut config = AssetConfig::new();
        for (key, value) in map {
            config.set(key, value, policy)?;
        }
        Ok(config)
    }

    fn set(&mut self, key: &str, value: &Value, policy: UnknownKeys) -> AssetResult<()> {
        match key {
            "path" => self.path = Some(expect_string(key, value)?),
            "base" => self.base = Some(expect_string(key, value)?),
            "version" => self.version = Some(expect_scalar(key, value)?),
            "area" => self.area = Some(expect_string(key, value)?),
            "dependency" => self.dependency = Some(expect_dependencies(key, value)?),
            "position" => {
                let name = expect_string(key, value)?;
                let position = Position::from_name(&name).ok_or(AssetError::InvalidOption {
                    key: key.to_string(),
                    expected: "\"before\" or \"after\"",
                })?;
                self.position = Some(position);
            }
            "inline" => self.inline = Some(Deferred::Literal(expect_string(key, value)?)),
            "footer" => self.footer = Some(expect_bool(key, value)?),
            "async" => self.is_async = Some(expect_bool(key, value)?),
            "defer" => self.defer = Some(expect_bool(key, value)?),
            "localize" => {
                let map = expect_object(key, value)?;
                let localize = map
                    .iter()
                    .map(|(object, data)| (object.clone(), Deferred::Literal(data.clone())))
                    .collect();
                self.localize = Some(localize);
            }
            "media" => self.media = Some(expect_string(key, value)?),
            "attribute" => {
                let map = expect_object(key, value)?;
                let mut attrs = Attributes::default();
                for (name, value) in map {
                    attrs.insert(name.clone(), expect_scalar(key, value)?);
                }
                self.attribute = Some(Deferred::Literal(attrs));
            }
            _ => reject_unknown(key, policy)?,
        }
        Ok(())
    }
}

impl From<&str> for AssetConfig {
    fn from(path: &str) -> Self {
        AssetConfig::new().path(path)
    }
}

impl From<String> for AssetConfig {
    fn from(path: String) -> Self {
        AssetConfig::new().path(path)
    }
}

/// Key of a package child: a positional entry or an explicit asset name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChildKey {
    /// Positional entry; the asset takes the package's own name.
    Index(usize),
    /// Named entry; the asset takes this name.
    Name(String),
}

impl ChildKey {
    /// The asset name this key resolves to inside `package`.
    pub fn resolve<'a>(&'a self, package: &'a str) -> &'a str {
        match self {
            ChildKey::Index(_) => package,
            ChildKey::Name(name) => name,
        }
    }
}

impl From<&str> for ChildKey {
    fn from(name: &str) -> Self {
        ChildKey::Name(name.to_string())
    }
}

impl From<String> for ChildKey {
    fn from(name: String) -> Self {
        ChildKey::Name(name)
    }
}

impl From<usize> for ChildKey {
    fn from(index: usize) -> Self {
        ChildKey::Index(index)
    }
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKey::Index(index) => write!(f, "{}", index),
            ChildKey::Name(name) => f.write_str(name),
        }
    }
}

/// Declarative package: shared defaults plus script and style children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackageConfig {
    /// Every package-level option other than the children.
    pub defaults: AssetConfig,
    pub scripts: IndexMap<ChildKey, AssetConfig>,
    pub styles: IndexMap<ChildKey, AssetConfig>,
}

impl PackageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the shared defaults.
    pub fn defaults(mut self, defaults: AssetConfig) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.defaults.version = Some(version.into());
        self
    }

    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.defaults.base = Some(base.into());
        self
    }

    pub fn area(mut self, area: Area) -> Self {
        self.defaults.area = Some(area.name().to_string());
        self
    }

    /// Add a named script child.
    pub fn script(mut self, name: impl Into<String>, config: impl Into<AssetConfig>) -> Self {
        self.scripts.insert(ChildKey::Name(name.into()), config.into());
        self
    }

    /// Add a positional script child, named after the package.
    pub fn script_path(mut self, config: impl Into<AssetConfig>) -> Self {
        let key = ChildKey::Index(self.scripts.len());
        self.scripts.insert(key, config.into());
        self
    }

    /// Add a named style child.
    pub fn style(mut self, name: impl Into<String>, config: impl Into<AssetConfig>) -> Self {
        self.styles.insert(ChildKey::Name(name.into()), config.into());
        self
    }

    /// Add a positional style child, named after the package.
    pub fn style_path(mut self, config: impl Into<AssetConfig>) -> Self {
        let key = ChildKey::Index(self.styles.len());
        self.styles.insert(key, config.into());
        self
    }

    /// Merge `shared` underneath this configuration. This configuration wins at
    /// every level: defaults field by field, children key by key.
    pub fn with_defaults(mut self, shared: &PackageConfig) -> Self {
        self.defaults = self.defaults.with_defaults(&shared.defaults);
        merge_children(&mut self.scripts, &shared.scripts);
        merge_children(&mut self.styles, &shared.styles);
        self
    }

    /// Parse a loosely typed package map. Every key other than `scripts` and
    /// `styles` is a shared default.
    pub fn from_value(value: &Value, policy: UnknownKeys) -> AssetResult<Self> {
        let map = expect_object("package", value)?;
        let mut config = PackageConfig::new();
        for (key, value) in map {
            match key.as_str() {
                "scripts" => config.scripts = parse_children(key, value, policy)?,
                "styles" => config.styles = parse_children(key, value, policy)?,
                _ => config.defaults.set(key, value, policy)?,
            }
        }
        Ok(config)
    }
}

fn merge_children(children: &mut IndexMap<ChildKey, AssetConfig>, shared: &IndexMap<ChildKey, AssetConfig>) {
    for (key, config) in shared {
        match children.get_mut(key) {
            Some(own) => *own = std::mem::take(own).with_defaults(config),
            None => {
                children.insert(key.clone(), config.clone());
            }
        }
    }
}

fn parse_children(
    key: &str,
    value: &Value,
    policy: UnknownKeys,
) -> AssetResult<IndexMap<ChildKey, AssetConfig>> {
    let mut children = IndexMap::default();
    match value {
        Value::Array(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                children.insert(ChildKey::Index(index), AssetConfig::from_value(entry, policy)?);
            }
        }
        Value::Object(entries) => {
            for (name, entry) in entries {
                children.insert(ChildKey::Name(name.clone()), AssetConfig::from_value(entry, policy)?);
            }
        }
        _ => {
            return Err(AssetError::InvalidOption {
                key: key.to_string(),
                expected: "a list or a map of asset configurations",
            });
        }
    }
    Ok(children)
}

fn reject_unknown(key: &str, policy: UnknownKeys) -> AssetResult<()> {
    match policy {
        UnknownKeys::Warn => {
            tracing::warn!("Ignoring unknown configuration option '{}'", key);
            Ok(())
        }
        UnknownKeys::Reject => Err(AssetError::UnknownOption {
            key: key.to_string(),
        }),
    }
}

fn expect_string(key: &str, value: &Value) -> AssetResult<String> {
    value
        .as_str()
        .map(String::from)
        .ok_or_else(|| AssetError::InvalidOption {
            key: key.to_string(),
            expected: "a string",
        })
}

/// Strings verbatim, numbers and booleans in their JSON spelling.
fn expect_scalar(key: &str, value: &Value) -> AssetResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(AssetError::InvalidOption {
            key: key.to_string(),
            expected: "a string, number or boolean",
        }),
    }
}

fn expect_bool(key: &str, value: &Value) -> AssetResult<bool> {
    value.as_bool().ok_or_else(|| AssetError::InvalidOption {
        key: key.to_string(),
        expected: "a boolean",
    })
}

fn expect_object<'v>(key: &str, value: &'v Value) -> AssetResult<&'v Map<String, Value>> {
    value.as_object().ok_or_else(|| AssetError::InvalidOption {
        key: key.to_string(),
        expected: "a map",
    })
}

fn expect_dependencies(key: &str, value: &Value) -> AssetResult<Vec<String>> {
    match value {
        Value::String(list) => Ok(split_dependencies(list)),
        Value::Array(items) => items.iter().map(|item| expect_string(key, item)).collect(),
        _ => Err(AssetError::InvalidOption {
            key: key.to_string(),
            expected: "a list of names or a comma-delimited string",
        }),
    }
}
