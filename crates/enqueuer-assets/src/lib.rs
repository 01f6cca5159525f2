//! Enqueuer Assets - fluent script and style registration over a host platform
//!
//! This crate lets plugin code declare named assets and bundles of assets, then
//! defers the real work to the host's lifecycle events:
//! - Scripts and styles with dependencies, inline payloads and localized data
//! - Load areas (front, admin, login, customizer, block, block editor), each bound
//!   to one host event
//! - Packages that expand into individual assets sharing defaults
//! - A package catalog for definitions registered ahead of use
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use enqueuer_assets::prelude::*;
//!
//! let server = AssetServer::new(host);
//!
//! server
//!     .styles()
//!     .queue("bar", &AssetConfig::new().path("/fixtures/bar.css"))?;
//!
//! server
//!     .scripts()
//!     .add("app", &AssetConfig::new().path("app.js").dependency(["jquery"]))?
//!     .footer()
//!     .defer()
//!     .localize("appData", serde_json::json!({ "nonce": "abc" }));
//!
//! server.packages().queue(
//!     "jquery-ui",
//!     &PackageConfig::new()
//!         .version("1.12.1")
//!         .script_path("/fixtures/jquery-ui.js")
//!         .style_path("/fixtures/jquery-ui.css"),
//! )?;
//!
//! // The host is about to print visitor assets.
//! server.fire(Area::Front)?;
//! ```
//!
//! Nothing reaches the host before its event fires; until then `remove` cancels
//! a pending registration.

pub mod area;
pub mod asset;
pub mod config;
pub mod error;
pub mod handle;
pub mod hooks;
pub mod host;
pub mod manager;
pub mod package;
pub mod registry;
pub mod script;
pub mod server;
pub mod settings;
pub mod storage;
pub mod style;

#[cfg(test)]
mod test_support;

pub use area::{Area, Position};
pub use asset::{Asset, Enqueueable};
pub use config::{AssetConfig, Attributes, ChildKey, Configurable, Deferred, PackageConfig, attributes};
pub use error::{AssetError, AssetResult};
pub use handle::{AssetRef, Shared};
pub use hooks::{Action, Hook, HookKey, Hooks};
pub use host::{AssetDefinition, AssetType, Host, HostError, HostResult, Placement, Status, Tag, TagFilter};
pub use manager::{CatalogEntry, PackageDefinition, PackageManager};
pub use package::{Package, Packages};
pub use registry::Registry;
pub use script::Script;
pub use server::AssetServer;
pub use settings::{Settings, UnknownKeys};
pub use storage::Assets;
pub use style::Style;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Area, AssetConfig, AssetError, AssetResult, AssetServer, Deferred, Enqueueable, Host,
        PackageConfig, Position, Script, Status, Style, attributes,
    };
}
