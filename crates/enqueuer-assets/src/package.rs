//! Packages: named bundles of scripts and styles sharing defaults.
//!
//! A package expands into one asset registration per child. Positional children
//! take the package's own name, named children keep theirs. Styles expand before
//! scripts.

use std::sync::Arc;

use enqueuer_core::alloc::IndexMap;
use enqueuer_core::profiling;
use parking_lot::RwLock;

use crate::asset::Enqueueable;
use crate::config::{AssetConfig, ChildKey, PackageConfig};
use crate::error::{AssetError, AssetResult};
use crate::script::Script;
use crate::server::AssetServer;
use crate::style::Style;

/// A package with its defaults merged into every child.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    config: PackageConfig,
}

impl Package {
    /// Merge the package defaults into each child. Child values win.
    ///
    /// Does not touch the package store; the package becomes visible through
    /// [`Packages::add`] or [`Packages::queue`].
    pub fn new(name: impl Into<String>, config: &PackageConfig) -> AssetResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(AssetError::MissingName { kind: "package" });
        }

        let merge = |children: &IndexMap<ChildKey, AssetConfig>| -> IndexMap<ChildKey, AssetConfig> {
            children
                .iter()
                .map(|(key, child)| (key.clone(), child.clone().with_defaults(&config.defaults)))
                .collect()
        };

        let config = PackageConfig {
            defaults: config.defaults.clone(),
            scripts: merge(&config.scripts),
            styles: merge(&config.styles),
        };
        Ok(Self { name, config })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The merged configuration.
    pub fn config(&self) -> &PackageConfig {
        &self.config
    }

    pub fn defaults(&self) -> &AssetConfig {
        &self.config.defaults
    }

    pub fn scripts(&self) -> &IndexMap<ChildKey, AssetConfig> {
        &self.config.scripts
    }

    pub fn styles(&self) -> &IndexMap<ChildKey, AssetConfig> {
        &self.config.styles
    }

    /// Asset name of a child key.
    pub fn asset_name<'a>(&'a self, key: &'a ChildKey) -> &'a str {
        key.resolve(&self.name)
    }
}

/// Registered and enqueued packages, by name.
#[derive(Default)]
pub struct PackageStore {
    registered: RwLock<IndexMap<String, Arc<Package>>>,
    enqueued: RwLock<IndexMap<String, Arc<Package>>>,
}

impl PackageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.registered.write().clear();
        self.enqueued.write().clear();
    }
}

#[derive(Clone, Copy)]
enum Expand {
    Add,
    Queue,
}

/// Package view of an [`AssetServer`].
#[derive(Clone, Copy)]
pub struct Packages<'s> {
    server: &'s AssetServer,
}

impl<'s> Packages<'s> {
    pub fn new(server: &'s AssetServer) -> Self {
        Self { server }
    }

    fn store(&self) -> &'s PackageStore {
        self.server.package_store()
    }

    /// Build a package and register its children.
    pub fn add(&self, name: &str, config: &PackageConfig) -> AssetResult<Arc<Package>> {
        let package = Package::new(name, config)?;
        self.register(package)
    }

    /// [`Packages::add`] for each entry, in order.
    pub fn add_many<'c, I>(&self, entries: I) -> AssetResult<Vec<Arc<Package>>>
    where
        I: IntoIterator<Item = (&'c str, &'c PackageConfig)>,
    {
        entries
            .into_iter()
            .map(|(name, config)| self.add(name, config))
            .collect()
    }

    /// Build a package and enqueue its children.
    pub fn queue(&self, name: &str, config: &PackageConfig) -> AssetResult<Arc<Package>> {
        let package = Package::new(name, config)?;
        self.enqueue(package)
    }

    /// [`Packages::queue`] for each entry, in order.
    pub fn queue_many<'c, I>(&self, entries: I) -> AssetResult<Vec<Arc<Package>>>
    where
        I: IntoIterator<Item = (&'c str, &'c PackageConfig)>,
    {
        entries
            .into_iter()
            .map(|(name, config)| self.queue(name, config))
            .collect()
    }

    /// Add every child with [`Registry::add`](crate::Registry::add). A package
    /// name is only registered once; later calls return the stored package.
    pub fn register(&self, package: Package) -> AssetResult<Arc<Package>> {
        if let Some(existing) = self.store().registered.read().get(package.name()) {
            return Ok(Arc::clone(existing));
        }

        self.expand(&package, Expand::Add)?;
        let package = Arc::new(package);
        self.store()
            .registered
            .write()
            .insert(package.name().to_string(), Arc::clone(&package));
        tracing::debug!("Registered package '{}'", package.name());
        Ok(package)
    }

    /// Queue every child with [`Registry::queue`](crate::Registry::queue).
    ///
    /// When the name was registered before, the registered package's children are
    /// queued instead of `package`'s.
    pub fn enqueue(&self, package: Package) -> AssetResult<Arc<Package>> {
        if let Some(existing) = self.store().enqueued.read().get(package.name()) {
            return Ok(Arc::clone(existing));
        }

        let registered = self.store().registered.read().get(package.name()).cloned();
        match &registered {
            Some(registered) => self.expand(registered, Expand::Queue)?,
            None => self.expand(&package, Expand::Queue)?,
        }

        let package = Arc::new(package);
        self.store()
            .enqueued
            .write()
            .insert(package.name().to_string(), Arc::clone(&package));
        tracing::debug!("Enqueued package '{}'", package.name());
        Ok(package)
    }

    /// Remove every child asset and forget the package.
    ///
    /// Returns whether the package was known.
    pub fn deregister(&self, name: &str) -> AssetResult<bool> {
        let package = {
            let enqueued = self.store().enqueued.read();
            enqueued
                .get(name)
                .cloned()
                .or_else(|| self.store().registered.read().get(name).cloned())
        };
        let Some(package) = package else {
            return Ok(false);
        };

        for key in package.styles().keys() {
            self.server.styles().remove(package.asset_name(key))?;
        }
        for key in package.scripts().keys() {
            self.server.scripts().remove(package.asset_name(key))?;
        }

        self.store().enqueued.write().shift_remove(name);
        self.store().registered.write().shift_remove(name);
        tracing::debug!("Removed package '{}'", name);
        Ok(true)
    }

    pub fn remove(&self, name: &str) -> AssetResult<bool> {
        self.deregister(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.is_registered(name) || self.is_enqueued(name)
    }

    /// The registered package, or else the enqueued one.
    pub fn get(&self, name: &str) -> Option<Arc<Package>> {
        let registered = self.store().registered.read().get(name).cloned();
        registered.or_else(|| self.store().enqueued.read().get(name).cloned())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.store().registered.read().contains_key(name)
    }

    pub fn is_enqueued(&self, name: &str) -> bool {
        self.store().enqueued.read().contains_key(name)
    }

    /// Known package names, registered ones first.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.store().registered.read().keys().cloned().collect();
        for name in self.store().enqueued.read().keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }

    pub fn len(&self) -> usize {
        self.names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expand(&self, package: &Package, mode: Expand) -> AssetResult<()> {
        profiling::profile_scope!("expand_package", package.name());

        self.expand_kind::<Style>(package, package.styles(), mode)?;
        self.expand_kind::<Script>(package, package.scripts(), mode)?;
        Ok(())
    }

    fn expand_kind<A: Enqueueable>(
        &self,
        package: &Package,
        children: &IndexMap<ChildKey, AssetConfig>,
        mode: Expand,
    ) -> AssetResult<()> {
        let registry = self.server.registry::<A>();
        for (key, config) in children {
            let name = package.asset_name(key);
            match mode {
                Expand::Add => registry.add(name, config)?,
                Expand::Queue => registry.queue(name, config)?,
            };
        }
        Ok(())
    }
}
