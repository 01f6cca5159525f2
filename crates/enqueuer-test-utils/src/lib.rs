//! Test utilities for Enqueuer.
//!
//! This crate provides an in-memory host platform for exercising the asset layer
//! without a real content-management system.
//!
//! # Overview
//!
//! - `MockHost` - Recording implementation of [`Host`](enqueuer_assets::Host)
//!   (requires `mock` feature). It keeps registration state per asset kind,
//!   records every call and renders `<link>`/`<script>` tags the way the host
//!   prints them, with tag filters and inline payloads applied.
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use std::sync::Arc;
//!
//! use enqueuer_assets::{Area, AssetConfig, AssetServer, Status};
//! use enqueuer_test_utils::MockHost;
//!
//! let host = Arc::new(MockHost::new());
//! let server = AssetServer::new(host.clone());
//!
//! server
//!     .styles()
//!     .queue("bar", &AssetConfig::new().path("/fixtures/bar.css"))
//!     .unwrap();
//! server.fire(Area::Front).unwrap();
//!
//! assert!(server.styles().is("bar", Status::Enqueued));
//! assert!(host.print_styles().contains("href='http://example.org/fixtures/bar.css?ver=1.0.0'"));
//! # }
//! ```

#[cfg(feature = "mock")]
pub mod mock_host;

#[cfg(feature = "mock")]
pub use mock_host::*;
