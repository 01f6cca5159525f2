//! A catalog of package definitions, registered ahead of use.
//!
//! The catalog is independent of the package store: cataloguing a package does
//! not touch any asset. [`PackageManager::add`] and [`PackageManager::queue`]
//! look the package up and hand it to [`Packages`](crate::Packages).

use std::sync::Arc;

use enqueuer_core::alloc::IndexMap;
use parking_lot::RwLock;

use crate::config::PackageConfig;
use crate::error::AssetResult;
use crate::package::Package;
use crate::server::AssetServer;

/// A package type that knows its own name and configuration.
pub trait PackageDefinition {
    fn name(&self) -> &str;

    fn config(&self) -> PackageConfig;
}

/// A catalogued package.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEntry {
    /// A configuration, expanded when the package is added or queued.
    Config(PackageConfig),
    /// A package built from a [`PackageDefinition`].
    Package(Arc<Package>),
}

impl CatalogEntry {
    /// The configuration to build the package from.
    pub fn config(&self) -> PackageConfig {
        match self {
            CatalogEntry::Config(config) => config.clone(),
            CatalogEntry::Package(package) => package.config().clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    entries: RwLock<IndexMap<String, CatalogEntry>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

/// Catalog view of an [`AssetServer`].
#[derive(Clone, Copy)]
pub struct PackageManager<'s> {
    server: &'s AssetServer,
}

impl<'s> PackageManager<'s> {
    pub fn new(server: &'s AssetServer) -> Self {
        Self { server }
    }

    fn entries(&self) -> &'s RwLock<IndexMap<String, CatalogEntry>> {
        &self.server.catalog().entries
    }

    /// Catalogue `config` under `name`, replacing any previous entry.
    pub fn register(&self, name: &str, config: PackageConfig) {
        tracing::trace!("Cataloguing package '{}'", name);
        self.entries()
            .write()
            .insert(name.to_string(), CatalogEntry::Config(config));
    }

    /// Catalogue each entry with `shared` merged underneath it.
    pub fn register_many<I, S>(&self, entries: I, shared: &PackageConfig)
    where
        I: IntoIterator<Item = (S, PackageConfig)>,
        S: AsRef<str>,
    {
        for (name, config) in entries {
            self.register(name.as_ref(), config.with_defaults(shared));
        }
    }

    /// Build the package of `definition` and catalogue it under its own name.
    pub fn register_definition(&self, definition: &dyn PackageDefinition) -> AssetResult<Arc<Package>> {
        let package = Arc::new(Package::new(definition.name(), &definition.config())?);
        tracing::trace!("Cataloguing package definition '{}'", package.name());
        self.entries()
            .write()
            .insert(package.name().to_string(), CatalogEntry::Package(Arc::clone(&package)));
        Ok(package)
    }

    /// Returns whether the entry existed.
    pub fn unregister(&self, name: &str) -> bool {
        self.entries().write().shift_remove(name).is_some()
    }

    /// Returns how many entries existed.
    pub fn unregister_many<I, S>(&self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter(|name| self.unregister(name.as_ref()))
            .count()
    }

    /// Register the package's children with the host on its area's event.
    ///
    /// A catalogued package is added from its catalogue entry and `config` is
    /// ignored. An unknown name is catalogued with `config` first.
    pub fn add(&self, name: &str, config: PackageConfig) -> AssetResult<Arc<Package>> {
        let config = self.resolve(name, config);
        self.server.packages().add(name, &config)
    }

    /// [`PackageManager::add`] each entry with `shared` merged underneath it.
    pub fn add_many<I, S>(&self, entries: I, shared: &PackageConfig) -> AssetResult<Vec<Arc<Package>>>
    where
        I: IntoIterator<Item = (S, PackageConfig)>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|(name, config)| self.add(name.as_ref(), config.with_defaults(shared)))
            .collect()
    }

    /// As [`PackageManager::add`], enqueueing the children.
    pub fn queue(&self, name: &str, config: PackageConfig) -> AssetResult<Arc<Package>> {
        let config = self.resolve(name, config);
        self.server.packages().queue(name, &config)
    }

    /// [`PackageManager::queue`] each entry with `shared` merged underneath it.
    pub fn queue_many<I, S>(&self, entries: I, shared: &PackageConfig) -> AssetResult<Vec<Arc<Package>>>
    where
        I: IntoIterator<Item = (S, PackageConfig)>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|(name, config)| self.queue(name.as_ref(), config.with_defaults(shared)))
            .collect()
    }

    fn resolve(&self, name: &str, config: PackageConfig) -> PackageConfig {
        match self.get(name) {
            Some(entry) => entry.config(),
            None => {
                self.register(name, config.clone());
                config
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<CatalogEntry> {
        self.entries().read().get(name).cloned()
    }

    /// Every entry, in cataloguing order.
    pub fn all(&self) -> Vec<(String, CatalogEntry)> {
        self.entries()
            .read()
            .iter()
            .map(|(name, entry)| (name.clone(), entry.clone()))
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries().read().contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.entries().read().len()
    }
}
