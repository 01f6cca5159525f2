//! Asset handles - fluent references to stored assets.
//!
//! An asset is shared between its registry entry, the lifecycle hooks scheduled
//! for it and its tag filter. Handles mutate it in place, so changes made after
//! scheduling are seen when the hook fires.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::area::{Area, Position};
use crate::asset::Enqueueable;
use crate::config::Deferred;
use crate::error::AssetResult;
use crate::host::Status;
use crate::registry::Registry;

/// Shared ownership of a mutable asset.
pub type Shared<A> = Arc<RwLock<A>>;

/// A handle to a stored asset.
///
/// Setters take `&self` and return `&Self`, so calls chain:
///
/// ```ignore
/// server.styles()
///     .get("bar")
///     .unwrap()
///     .media("orientation: portrait")
///     .inline("div { border: 10px solid; }")
///     .path("/fixtures/bar/bar.css")
///     .area("login")
///     .do_enqueue(None)?;
/// ```
pub struct AssetRef<'s, A: Enqueueable> {
    pub(crate) registry: Registry<'s, A>,
    pub(crate) asset: Shared<A>,
}

impl<A: Enqueueable> Clone for AssetRef<'_, A> {
    fn clone(&self) -> Self {
        Self {
            registry: self.registry,
            asset: Arc::clone(&self.asset),
        }
    }
}

impl<A: Enqueueable> std::fmt::Debug for AssetRef<'_, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetRef")
            .field("kind", &A::TYPE)
            .field("asset", &*self.asset.read())
            .finish()
    }
}

impl<'s, A: Enqueueable> AssetRef<'s, A> {
    pub(crate) fn new(registry: Registry<'s, A>, asset: Shared<A>) -> Self {
        Self { registry, asset }
    }

    /// Read access to the asset.
    pub fn read(&self) -> RwLockReadGuard<'_, A> {
        self.asset.read()
    }

    /// The shared asset behind this handle.
    pub fn shared(&self) -> &Shared<A> {
        &self.asset
    }

    pub fn name(&self) -> String {
        self.asset.read().asset().name.clone()
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut A)) -> &Self {
        f(&mut self.asset.write());
        self
    }

    pub fn path(&self, path: impl Into<String>) -> &Self {
        let path = path.into();
        self.update(|a| a.asset_mut().set_path(path))
    }

    pub fn base(&self, base: &str) -> &Self {
        self.update(|a| a.asset_mut().set_base(base))
    }

    pub fn version(&self, version: impl Into<String>) -> &Self {
        let version = version.into();
        self.update(|a| a.asset_mut().set_version(version))
    }

    /// Replace the dependency list.
    pub fn dependences<I, S>(&self, deps: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update(|a| a.asset_mut().set_dependency(deps))
    }

    /// Replace the dependency list from a comma-delimited string.
    pub fn dependences_list(&self, list: &str) -> &Self {
        self.dependences(crate::config::split_dependencies(list))
    }

    pub fn inline(&self, data: impl Into<Deferred<String>>) -> &Self {
        let data = data.into();
        self.update(|a| a.asset_mut().set_inline(data, None))
    }

    /// Set the inline payload and its position together.
    pub fn inline_at(&self, data: impl Into<Deferred<String>>, position: Position) -> &Self {
        let data = data.into();
        self.update(|a| a.asset_mut().set_inline(data, Some(position)))
    }

    pub fn position(&self, position: Position) -> &Self {
        self.update(|a| a.asset_mut().set_position(position))
    }

    /// Move the asset, and every registered dependency, to `area`.
    ///
    /// Names outside the area table are ignored.
    pub fn area(&self, area: &str) -> &Self {
        match Area::from_name(area) {
            Some(area) => self.registry.set_area(&self.asset, area),
            None => tracing::warn!("Ignoring unknown area '{}' for {} '{}'", area, A::TYPE, self.name()),
        }
        self
    }

    pub fn get_path(&self) -> String {
        self.asset.read().asset().get_path()
    }

    pub fn get_base(&self) -> String {
        self.asset.read().asset().base.clone()
    }

    /// Register with the host now.
    pub fn register(&self) -> AssetResult<&Self> {
        self.registry.register_asset(&self.asset)?;
        Ok(self)
    }

    /// Enqueue with the host now.
    pub fn enqueue(&self) -> AssetResult<&Self> {
        self.registry.enqueue_asset(&self.asset)?;
        Ok(self)
    }

    /// Remove the host registration.
    pub fn deregister(&self) -> AssetResult<&Self> {
        self.registry.deregister_asset(&self.asset)?;
        Ok(self)
    }

    /// Remove the host enqueue.
    pub fn dequeue(&self) -> AssetResult<&Self> {
        self.registry.dequeue_asset(&self.asset)?;
        Ok(self)
    }

    /// Schedule registration on the area's lifecycle event.
    ///
    /// Without a name every registered asset of this kind is scheduled.
    pub fn do_register(&self, name: Option<&str>) -> AssetResult<&Self> {
        self.registry.do_register(name)?;
        Ok(self)
    }

    /// Schedule an enqueue on the area's lifecycle event.
    ///
    /// Without a name every registered, not yet enqueued asset of this kind is
    /// scheduled. A name that is not registered schedules this asset instead.
    pub fn do_enqueue(&self, name: Option<&str>) -> AssetResult<&Self> {
        self.registry.do_enqueue_with(name, Some(&self.asset))?;
        Ok(self)
    }

    /// Host status of this asset.
    pub fn is(&self, status: Status) -> bool {
        self.registry.is(&self.name(), status)
    }

    /// Host status of another asset of the same kind. An empty name refers to
    /// this asset.
    pub fn is_named(&self, status: Status, name: &str) -> bool {
        if name.is_empty() {
            return self.is(status);
        }
        self.registry.is(name, status)
    }
}
