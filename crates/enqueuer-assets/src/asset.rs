//! State shared by every asset kind, and the capability trait the registries
//! dispatch through.

use enqueuer_core::alloc::IndexSet;

use crate::area::{Area, Position};
use crate::config::{AssetConfig, Configurable, Deferred};
use crate::host::{AssetDefinition, AssetType, Host, HostResult, Placement, Tag};
use crate::server::AssetServer;
use crate::settings::Settings;
use crate::storage::Assets;

/// Name, location and placement data common to scripts and styles.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) base: String,
    pub(crate) dependency: IndexSet<String>,
    pub(crate) version: String,
    pub(crate) position: Position,
    pub(crate) area: String,
    pub(crate) inline: Option<String>,
}

impl Asset {
    /// Create an asset carrying the server defaults.
    pub fn new(name: impl Into<String>, settings: &Settings) -> Self {
        Self {
            name: name.into(),
            path: String::new(),
            base: String::new(),
            dependency: IndexSet::default(),
            version: settings.default_version.clone(),
            position: settings.default_position,
            area: settings.default_area.name().to_string(),
            inline: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The raw path, as configured.
    pub fn raw_path(&self) -> &str {
        &self.path
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn dependency(&self) -> impl Iterator<Item = &str> {
        self.dependency.iter().map(String::as_str)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// The configured area name, recognized or not.
    pub fn area_name(&self) -> &str {
        &self.area
    }

    /// The area, if its name is in the area table.
    pub fn area(&self) -> Option<Area> {
        Area::from_name(&self.area)
    }

    pub fn inline(&self) -> Option<&str> {
        self.inline.as_deref()
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Set the prefix for relative paths.
    ///
    /// URLs and `:\` / `://` prefixed values are kept verbatim, anything else is
    /// made root-relative. Empty input is ignored.
    pub fn set_base(&mut self, base: &str) {
        if base.is_empty() {
            return;
        }

        if is_url(base) || base.starts_with(":\\") || base.starts_with("://") || base.starts_with('/') {
            self.base = base.to_string();
        } else {
            self.base = format!("/{}", base);
        }
    }

    /// Replace the dependency list. Duplicates keep their first position.
    pub fn set_dependency<I, S>(&mut self, deps: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependency = deps.into_iter().map(Into::into).collect();
    }

    pub fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_area(&mut self, area: Area) {
        self.area = area.name().to_string();
    }

    /// Store an inline payload, updating the position first when one is given.
    pub fn set_inline(&mut self, data: Deferred<String>, position: Option<Position>) {
        if let Some(position) = position {
            self.position = position;
        }
        self.inline = Some(data.resolve());
    }

    /// The source to hand to the host.
    ///
    /// Absolute URLs and root-relative paths are returned verbatim; relative paths
    /// are joined onto the base with a single `/`.
    pub fn get_path(&self) -> String {
        let path = &self.path;
        if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
            return path.clone();
        }

        if path.starts_with('/') {
            return path.clone();
        }

        if self.base.is_empty() {
            return path.clone();
        }

        format!("{}/{}", self.base.trim_end_matches('/'), path)
    }
}

impl Configurable for Asset {
    fn configure(&mut self, config: &AssetConfig) {
        if let Some(path) = &config.path {
            self.path = path.clone();
        }
        if let Some(base) = &config.base {
            self.set_base(base);
        }
        if let Some(version) = &config.version {
            self.version = version.clone();
        }
        if let Some(area) = &config.area {
            if Area::from_name(area).is_none() {
                tracing::warn!("Asset '{}' configured with unknown area '{}'", self.name, area);
            }
            self.area = area.clone();
        }
        if let Some(deps) = &config.dependency {
            self.set_dependency(deps.iter().cloned());
        }
        if let Some(position) = config.position {
            self.position = position;
        }
        if let Some(inline) = &config.inline {
            self.inline = Some(inline.resolve());
        }
    }
}

/// Absolute URL with a host, e.g. `https://cdn.example.org/lib`.
fn is_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| url.has_host())
        .unwrap_or(false)
}

/// The capability every asset kind provides to the registries.
///
/// Registration, enqueueing, dependency resolution and hook scheduling are written
/// once against this trait; implementors only supply what differs per kind.
pub trait Enqueueable: Configurable + std::fmt::Debug + Send + Sync + Sized + 'static {
    /// The host-side kind.
    const TYPE: AssetType;

    /// Create an instance carrying the server defaults.
    fn create(name: String, settings: &Settings) -> Self;

    fn asset(&self) -> &Asset;

    fn asset_mut(&mut self) -> &mut Asset;

    /// The storage for this kind inside `server`.
    fn storage(server: &AssetServer) -> &Assets<Self>;

    /// Footer flag or media query.
    fn placement(&self) -> Placement;

    /// Attach inline and localized payloads after an enqueue.
    fn attach_payloads(&self, host: &dyn Host) -> HostResult<()>;

    /// Rewrite a tag that belongs to this asset.
    fn rewrite_tag(&self, tag: &Tag<'_>) -> String;

    /// Build the host definition with an already resolved dependency list.
    fn definition(&self, deps: Vec<String>) -> AssetDefinition {
        let asset = self.asset();
        AssetDefinition {
            kind: Self::TYPE,
            name: asset.name.clone(),
            src: asset.get_path(),
            deps,
            version: asset.version.clone(),
            placement: self.placement(),
        }
    }
}
