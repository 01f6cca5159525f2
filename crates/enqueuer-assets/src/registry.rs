//! The per-kind registry surface.
//!
//! Everything that touches the host is written once here, against
//! [`Enqueueable`], and shared by scripts and styles.

use std::sync::Arc;

use enqueuer_core::alloc::HashSet;
use parking_lot::RwLock;

use crate::area::Area;
use crate::asset::Enqueueable;
use crate::config::AssetConfig;
use crate::error::{AssetError, AssetResult};
use crate::handle::{AssetRef, Shared};
use crate::hooks::{Action, HookKey};
use crate::host::{Status, Tag, TagFilter};
use crate::server::AssetServer;
use crate::storage::Assets;

/// View of one asset kind inside an [`AssetServer`].
///
/// Obtained through [`AssetServer::scripts`] / [`AssetServer::styles`].
pub struct Registry<'s, A: Enqueueable> {
    server: &'s AssetServer,
    assets: &'s Assets<A>,
}

impl<A: Enqueueable> Clone for Registry<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Enqueueable> Copy for Registry<'_, A> {}

impl<A: Enqueueable> std::fmt::Debug for Registry<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &A::TYPE)
            .field("registered", &self.assets.names())
            .field("enqueued", &self.assets.enqueued_names())
            .finish()
    }
}

impl<'s, A: Enqueueable> Registry<'s, A> {
    pub fn new(server: &'s AssetServer) -> Self {
        Self {
            server,
            assets: A::storage(server),
        }
    }

    pub fn server(&self) -> &'s AssetServer {
        self.server
    }

    /// Create an asset and store it under `name`, replacing any previous one.
    ///
    /// Nothing reaches the host until the asset is scheduled.
    pub fn construct(&self, name: &str, config: &AssetConfig) -> AssetResult<AssetRef<'s, A>> {
        if name.is_empty() {
            return Err(AssetError::MissingName {
                kind: A::TYPE.name(),
            });
        }

        let mut asset = A::create(name.to_string(), self.server.settings());
        asset.configure(config);

        let shared = Arc::new(RwLock::new(asset));
        self.assets.insert(name, Arc::clone(&shared));
        tracing::trace!("Constructed {} '{}'", A::TYPE, name);

        Ok(AssetRef::new(*self, shared))
    }

    /// Construct, then schedule registration of every registered asset.
    pub fn add(&self, name: &str, config: &AssetConfig) -> AssetResult<AssetRef<'s, A>> {
        let asset = self.construct(name, config)?;
        self.do_register(None)?;
        Ok(asset)
    }

    /// Construct, then schedule an enqueue of every asset not yet enqueued.
    pub fn queue(&self, name: &str, config: &AssetConfig) -> AssetResult<AssetRef<'s, A>> {
        let asset = self.construct(name, config)?;
        self.do_enqueue(None)?;
        Ok(asset)
    }

    /// Construct with defaults only and schedule its enqueue.
    pub fn load(&self, name: &str) -> AssetResult<AssetRef<'s, A>> {
        let asset = self.construct(name, &AssetConfig::default())?;
        asset.do_enqueue(Some(name))?;
        Ok(asset)
    }

    /// Dequeue and deregister `name`, dropping its pending hooks.
    ///
    /// Returns whether the asset was known.
    pub fn remove(&self, name: &str) -> AssetResult<bool> {
        let Some(asset) = self.assets.get(name) else {
            return Ok(false);
        };

        self.server.hooks().cancel(A::TYPE, name);
        self.dequeue_asset(&asset)?;
        self.deregister_asset(&asset)?;
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<AssetRef<'s, A>> {
        self.assets.get(name).map(|asset| AssetRef::new(*self, asset))
    }

    pub fn has(&self, name: &str) -> bool {
        self.assets.contains(name)
    }

    /// Whether `name` went through an enqueue request.
    pub fn is_enqueued(&self, name: &str) -> bool {
        self.assets.is_enqueued(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.assets.names()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Host status of `name`. An empty name is never known to the host.
    pub fn is(&self, name: &str, status: Status) -> bool {
        !name.is_empty() && self.server.host().status(A::TYPE, name, status)
    }

    /// Schedule registration on the event of each asset's area.
    ///
    /// Without a name every registered asset is scheduled and assets in unknown
    /// areas are skipped. With a name, an unknown area is an error.
    pub fn do_register(&self, name: Option<&str>) -> AssetResult<()> {
        match name {
            None => {
                for (_, asset) in self.assets.snapshot() {
                    if let Some(area) = self.known_area(&asset) {
                        self.schedule(&asset, area, Action::Register);
                    }
                }
            }
            Some(name) => {
                if let Some(asset) = self.assets.get(name) {
                    let area = self.require_area(&asset)?;
                    self.schedule(&asset, area, Action::Register);
                }
            }
        }
        Ok(())
    }

    /// Schedule an enqueue on the event of each asset's area.
    ///
    /// Without a name every registered asset that is not enqueued yet is
    /// scheduled, skipping unknown areas. Scheduled assets count as enqueued.
    pub fn do_enqueue(&self, name: Option<&str>) -> AssetResult<()> {
        self.do_enqueue_with(name, None)
    }

    /// As [`Registry::do_enqueue`]; a name that is not registered falls back to
    /// `this`.
    pub(crate) fn do_enqueue_with(&self, name: Option<&str>, this: Option<&Shared<A>>) -> AssetResult<()> {
        match name {
            None => {
                for (name, asset) in self.assets.snapshot() {
                    if self.assets.is_enqueued(&name) {
                        continue;
                    }
                    if let Some(area) = self.known_area(&asset) {
                        self.schedule(&asset, area, Action::Enqueue);
                        self.assets.mark_enqueued(&name, asset);
                    }
                }
            }
            Some(name) => {
                let Some(asset) = self.assets.get(name).or_else(|| this.cloned()) else {
                    return Ok(());
                };
                let area = self.require_area(&asset)?;
                self.schedule(&asset, area, Action::Enqueue);
                let name = asset.read().asset().name.clone();
                self.assets.mark_enqueued(&name, asset);
            }
        }
        Ok(())
    }

    fn known_area(&self, asset: &Shared<A>) -> Option<Area> {
        let asset = asset.read();
        let area = asset.asset().area();
        if area.is_none() {
            tracing::debug!(
                "Skipping {} '{}' in unknown area '{}'",
                A::TYPE,
                asset.asset().name,
                asset.asset().area
            );
        }
        area
    }

    fn require_area(&self, asset: &Shared<A>) -> AssetResult<Area> {
        let asset = asset.read();
        asset.asset().area().ok_or_else(|| AssetError::UnknownArea {
            name: asset.asset().name.clone(),
            area: asset.asset().area.clone(),
        })
    }

    fn schedule(&self, asset: &Shared<A>, area: Area, action: Action) {
        let name = asset.read().asset().name.clone();
        let key = HookKey::new(A::TYPE, name, action);
        let asset = Arc::clone(asset);

        self.server
            .hooks()
            .subscribe(area.event(), key, move |server: &AssetServer| {
                let registry = server.registry::<A>();
                match action {
                    Action::Register => registry.register_asset(&asset),
                    Action::Enqueue => registry.enqueue_asset(&asset),
                }
            });
    }

    /// Register with the host, dependencies first.
    pub(crate) fn register_asset(&self, asset: &Shared<A>) -> AssetResult<()> {
        self.register_visiting(asset, &mut HashSet::new())
    }

    fn register_visiting(&self, asset: &Shared<A>, visited: &mut HashSet<String>) -> AssetResult<()> {
        let host = self.server.host();
        let name = asset.read().asset().name.clone();
        visited.insert(name.clone());
        if host.status(A::TYPE, &name, Status::Registered) {
            return Ok(());
        }

        let deps = self.resolve_dependencies(asset, Action::Register, visited)?;
        let definition = asset.read().definition(deps);
        tracing::debug!("Registering {} '{}' from {}", A::TYPE, name, definition.src);
        host.register(&definition)?;
        Ok(())
    }

    /// Enqueue with the host, then attach payloads and the tag filter.
    pub(crate) fn enqueue_asset(&self, asset: &Shared<A>) -> AssetResult<()> {
        self.enqueue_visiting(asset, &mut HashSet::new())
    }

    fn enqueue_visiting(&self, asset: &Shared<A>, visited: &mut HashSet<String>) -> AssetResult<()> {
        let host = self.server.host();
        let name = asset.read().asset().name.clone();
        visited.insert(name.clone());

        if !host.status(A::TYPE, &name, Status::Enqueued) {
            if host.status(A::TYPE, &name, Status::Registered) {
                tracing::debug!("Enqueueing registered {} '{}'", A::TYPE, name);
                host.enqueue_registered(A::TYPE, &name)?;
            } else {
                let deps = self.resolve_dependencies(asset, Action::Enqueue, visited)?;
                let definition = asset.read().definition(deps);
                tracing::debug!("Enqueueing {} '{}' from {}", A::TYPE, name, definition.src);
                host.enqueue(&definition)?;
            }
        }

        if self.assets.claim_payloads(&name) {
            if let Err(err) = asset.read().attach_payloads(host) {
                self.assets.release_payloads(&name);
                return Err(err.into());
            }
        }
        self.attach_filter(&name, asset)?;
        self.assets.mark_enqueued(&name, Arc::clone(asset));
        Ok(())
    }

    /// Remove the host registration and evict from the registered map.
    pub(crate) fn deregister_asset(&self, asset: &Shared<A>) -> AssetResult<()> {
        let host = self.server.host();
        let name = asset.read().asset().name.clone();
        if host.status(A::TYPE, &name, Status::Registered) {
            tracing::debug!("Deregistering {} '{}'", A::TYPE, name);
            host.deregister(A::TYPE, &name)?;
        }
        self.assets.remove(&name);
        self.assets.release_payloads(&name);
        Ok(())
    }

    /// Remove the host enqueue and evict from the enqueued map.
    pub(crate) fn dequeue_asset(&self, asset: &Shared<A>) -> AssetResult<()> {
        let host = self.server.host();
        let name = asset.read().asset().name.clone();
        if host.status(A::TYPE, &name, Status::Enqueued) {
            tracing::debug!("Dequeueing {} '{}'", A::TYPE, name);
            host.dequeue(A::TYPE, &name)?;
        }
        self.assets.unmark_enqueued(&name);
        Ok(())
    }

    /// Run `action` on every dependency this registry knows and return their
    /// names. Unknown names are dropped. Names already in `visited` are kept but
    /// not walked again.
    fn resolve_dependencies(
        &self,
        asset: &Shared<A>,
        action: Action,
        visited: &mut HashSet<String>,
    ) -> AssetResult<Vec<String>> {
        let (owner, deps): (String, Vec<String>) = {
            let asset = asset.read();
            let asset = asset.asset();
            (asset.name.clone(), asset.dependency().map(String::from).collect())
        };

        let mut resolved = Vec::with_capacity(deps.len());
        for dep in deps {
            let Some(shared) = self.assets.get(&dep) else {
                tracing::debug!("Dropping unknown dependency '{}' of {} '{}'", dep, A::TYPE, owner);
                continue;
            };
            if !visited.contains(&dep) {
                match action {
                    Action::Register => self.register_visiting(&shared, visited)?,
                    Action::Enqueue => self.enqueue_visiting(&shared, visited)?,
                }
            }
            resolved.push(dep);
        }
        Ok(resolved)
    }

    /// Attach the tag filter of `name` once. Later instances under the same name
    /// take over the existing filter.
    fn attach_filter(&self, name: &str, asset: &Shared<A>) -> AssetResult<()> {
        let Some(slot) = self.assets.filter_slot(name, asset) else {
            return Ok(());
        };

        let filter: TagFilter = Arc::new(move |tag: &Tag<'_>| {
            let asset = Arc::clone(&*slot.read());
            let asset = asset.read();
            if tag.handle != asset.asset().name {
                return tag.html.to_string();
            }
            asset.rewrite_tag(tag)
        });
        self.server.host().add_tag_filter(A::TYPE, filter)?;
        Ok(())
    }

    /// Move `asset` and, recursively, its registered dependencies to `area`.
    pub(crate) fn set_area(&self, asset: &Shared<A>, area: Area) {
        let mut visited = HashSet::new();
        self.cascade_area(asset, area, &mut visited);
    }

    fn cascade_area(&self, asset: &Shared<A>, area: Area, visited: &mut HashSet<String>) {
        let (name, deps): (String, Vec<String>) = {
            let mut asset = asset.write();
            let asset = asset.asset_mut();
            if !visited.insert(asset.name.clone()) {
                return;
            }
            asset.set_area(area);
            (asset.name.clone(), asset.dependency().map(String::from).collect())
        };

        self.assets.insert(&name, Arc::clone(asset));
        for dep in deps {
            if let Some(dep) = self.assets.get(&dep) {
                self.cascade_area(&dep, area, visited);
            }
        }
    }
}
