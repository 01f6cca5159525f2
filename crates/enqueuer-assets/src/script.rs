//! Scripts: footer placement, localized data and `async`/`defer` tags.

use enqueuer_core::alloc::IndexMap;
use serde_json::Value;

use crate::asset::{Asset, Enqueueable};
use crate::config::{AssetConfig, Configurable, Deferred};
use crate::handle::AssetRef;
use crate::host::{AssetType, Host, HostResult, Placement, Tag};
use crate::server::AssetServer;
use crate::settings::Settings;
use crate::storage::Assets;

/// A named script.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    asset: Asset,
    footer: bool,
    localize: IndexMap<String, Value>,
    is_async: bool,
    defer: bool,
}

impl Script {
    pub fn new(name: impl Into<String>, settings: &Settings) -> Self {
        Self {
            asset: Asset::new(name, settings),
            footer: false,
            localize: IndexMap::default(),
            is_async: false,
            defer: false,
        }
    }

    /// Whether the script prints in the footer.
    pub fn footer(&self) -> bool {
        self.footer
    }

    /// Localized objects, by object name.
    pub fn localized(&self) -> &IndexMap<String, Value> {
        &self.localize
    }

    pub fn is_async(&self) -> bool {
        self.is_async
    }

    pub fn is_defer(&self) -> bool {
        self.defer
    }

    pub fn set_footer(&mut self, footer: bool) {
        self.footer = footer;
    }

    pub fn set_async(&mut self, is_async: bool) {
        self.is_async = is_async;
    }

    pub fn set_defer(&mut self, defer: bool) {
        self.defer = defer;
    }

    /// Expose `data` as the global `object`. A later call for the same object
    /// replaces its data.
    pub fn set_localize(&mut self, object: impl Into<String>, data: Deferred<Value>) {
        self.localize.insert(object.into(), data.resolve());
    }
}

impl Configurable for Script {
    fn configure(&mut self, config: &AssetConfig) {
        self.asset.configure(config);
        if let Some(footer) = config.footer {
            self.footer = footer;
        }
        if let Some(is_async) = config.is_async {
            self.is_async = is_async;
        }
        if let Some(defer) = config.defer {
            self.defer = defer;
        }
        if let Some(localize) = &config.localize {
            for (object, data) in localize {
                self.localize.insert(object.clone(), data.resolve());
            }
        }
    }
}

impl Enqueueable for Script {
    const TYPE: AssetType = AssetType::Script;

    fn create(name: String, settings: &Settings) -> Self {
        Self::new(name, settings)
    }

    fn asset(&self) -> &Asset {
        &self.asset
    }

    fn asset_mut(&mut self) -> &mut Asset {
        &mut self.asset
    }

    fn storage(server: &AssetServer) -> &Assets<Self> {
        server.script_storage()
    }

    fn placement(&self) -> Placement {
        Placement::Footer(self.footer)
    }

    fn attach_payloads(&self, host: &dyn Host) -> HostResult<()> {
        if let Some(inline) = self.asset.inline().filter(|code| !code.is_empty()) {
            host.add_inline(Self::TYPE, &self.asset.name, inline, self.asset.position)?;
        }
        for (object, data) in &self.localize {
            host.localize(&self.asset.name, object, data)?;
        }
        Ok(())
    }

    /// `defer` wins over `async` when both are set.
    fn rewrite_tag(&self, tag: &Tag<'_>) -> String {
        if self.defer {
            return tag.html.replace(" src", " defer=\"defer\" src");
        }
        if self.is_async {
            return tag.html.replace(" src", " async=\"async\" src");
        }
        tag.html.to_string()
    }
}

impl AssetRef<'_, Script> {
    /// Print in the footer.
    pub fn footer(&self) -> &Self {
        self.update(|script| script.set_footer(true))
    }

    /// Add the `async` attribute to the tag.
    pub fn asynchronous(&self) -> &Self {
        self.update(|script| script.set_async(true))
    }

    /// Add the `defer` attribute to the tag.
    pub fn defer(&self) -> &Self {
        self.update(|script| script.set_defer(true))
    }

    /// Expose data to the script as the global `object`.
    pub fn localize(&self, object: &str, data: impl Into<Deferred<Value>>) -> &Self {
        let data = data.into();
        self.update(|script| script.set_localize(object, data))
    }
}
