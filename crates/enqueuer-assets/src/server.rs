//! Asset server - the registry service every operation goes through.

use std::sync::Arc;

use enqueuer_core::profiling;

use crate::area::Area;
use crate::asset::Enqueueable;
use crate::error::AssetResult;
use crate::hooks::Hooks;
use crate::host::Host;
use crate::manager::{Catalog, PackageManager};
use crate::package::{PackageStore, Packages};
use crate::registry::Registry;
use crate::script::Script;
use crate::settings::Settings;
use crate::storage::Assets;
use crate::style::Style;

/// Owns every registry of a request: scripts, styles, packages, the package
/// catalog and the pending lifecycle hooks.
///
/// # Example
///
/// ```ignore
/// let server = AssetServer::new(host);
///
/// server.styles().queue("bar", &AssetConfig::new().path("/fixtures/bar.css"))?;
/// server.scripts().add("app", &AssetConfig::new().path("app.js").footer(true))?;
///
/// // The host reached the point where visitor assets are due.
/// server.fire(Area::Front)?;
///
/// // End of request.
/// server.reset();
/// ```
pub struct AssetServer {
    host: Arc<dyn Host>,
    settings: Settings,
    hooks: Hooks,
    scripts: Assets<Script>,
    styles: Assets<Style>,
    packages: PackageStore,
    catalog: Catalog,
}

impl AssetServer {
    /// Create a server with default settings.
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_settings(host, Settings::default())
    }

    pub fn with_settings(host: Arc<dyn Host>, settings: Settings) -> Self {
        Self {
            host,
            settings,
            hooks: Hooks::new(),
            scripts: Assets::new(),
            styles: Assets::new(),
            packages: PackageStore::new(),
            catalog: Catalog::new(),
        }
    }

    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn scripts(&self) -> Registry<'_, Script> {
        Registry::new(self)
    }

    pub fn styles(&self) -> Registry<'_, Style> {
        Registry::new(self)
    }

    /// The registry of any asset kind.
    pub fn registry<A: Enqueueable>(&self) -> Registry<'_, A> {
        Registry::new(self)
    }

    pub fn packages(&self) -> Packages<'_> {
        Packages::new(self)
    }

    pub fn package_manager(&self) -> PackageManager<'_> {
        PackageManager::new(self)
    }

    pub(crate) fn script_storage(&self) -> &Assets<Script> {
        &self.scripts
    }

    pub(crate) fn style_storage(&self) -> &Assets<Style> {
        &self.styles
    }

    pub(crate) fn package_store(&self) -> &PackageStore {
        &self.packages
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run every hook subscribed to `event`, in subscription order.
    ///
    /// Stops at the first failing hook. Subscriptions stay in place.
    pub fn publish(&self, event: &str) -> AssetResult<()> {
        profiling::profile_function!(event);

        let hooks = self.hooks.snapshot(event);
        tracing::trace!("Publishing '{}' to {} hooks", event, hooks.len());
        for (key, hook) in hooks {
            tracing::trace!("Running {}", key);
            hook.run(self)?;
        }
        Ok(())
    }

    /// Publish the lifecycle event of `area`.
    pub fn fire(&self, area: Area) -> AssetResult<()> {
        self.publish(area.event())
    }

    /// Forget every asset, package, catalog entry and pending hook.
    ///
    /// Call at the end of a request. Host-side state is left alone.
    pub fn reset(&self) {
        self.hooks.clear();
        self.scripts.clear();
        self.styles.clear();
        self.packages.clear();
        self.catalog.clear();
        profiling::end_request();
        tracing::debug!("Asset server reset");
    }
}

impl std::fmt::Debug for AssetServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetServer")
            .field("settings", &self.settings)
            .field("scripts", &self.scripts.names())
            .field("styles", &self.styles.names())
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetError;
    use crate::hooks::{Action, HookKey};
    use crate::host::AssetType;
    use crate::test_support::NullHost;
    use parking_lot::Mutex;

    fn server() -> AssetServer {
        AssetServer::new(Arc::new(NullHost))
    }

    fn key(name: &str) -> HookKey {
        HookKey::new(AssetType::Script, name, Action::Enqueue)
    }

    #[test]
    fn test_publish_runs_in_order_and_persists() {
        let server = server();
        let log = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second"] {
            let log = Arc::clone(&log);
            server.hooks().subscribe("assets-for-admin", key(name), move |_: &AssetServer| -> AssetResult<()> {
                log.lock().push(name);
                Ok(())
            });
        }

        server.fire(Area::Admin).unwrap();
        server.fire(Area::Front).unwrap();
        server.publish("assets-for-admin").unwrap();
        assert_eq!(*log.lock(), vec!["first", "second", "first", "second"]);
    }

    #[test]
    fn test_publish_stops_at_first_error() {
        let server = server();
        let ran = Arc::new(Mutex::new(false));

        server.hooks().subscribe("assets-for-login", key("broken"), |_: &AssetServer| -> AssetResult<()> {
            Err(AssetError::UnknownOption {
                key: "broken".to_string(),
            })
        });
        let flag = Arc::clone(&ran);
        server.hooks().subscribe("assets-for-login", key("after"), move |_: &AssetServer| -> AssetResult<()> {
            *flag.lock() = true;
            Ok(())
        });

        assert!(server.fire(Area::Login).is_err());
        assert!(!*ran.lock());
    }

    #[test]
    fn test_hook_may_subscribe_while_running() {
        let server = server();
        server.hooks().subscribe("assets-for-blocks", key("outer"), |server: &AssetServer| -> AssetResult<()> {
            server
                .hooks()
                .subscribe("assets-for-blocks", key("inner"), |_: &AssetServer| -> AssetResult<()> { Ok(()) });
            Ok(())
        });

        server.fire(Area::Block).unwrap();
        assert_eq!(server.hooks().subscribers("assets-for-blocks").len(), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let server = server();
        server.scripts().construct("app", &"app.js".into()).unwrap();
        server.styles().construct("app", &"app.css".into()).unwrap();
        server.hooks().subscribe("assets-for-visitors", key("app"), |_: &AssetServer| -> AssetResult<()> { Ok(()) });

        server.reset();
        assert!(server.scripts().is_empty());
        assert!(server.styles().is_empty());
        assert!(server.hooks().is_empty());
    }
}
