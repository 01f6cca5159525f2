//! Enqueuer Core
//!
//! This crate contains the ambient functionality shared by the enqueuer crates:
//! collections, logging bootstrap and request profiling.

pub mod alloc;
pub mod logging;
pub mod profiling;
